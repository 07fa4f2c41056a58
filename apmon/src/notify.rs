pub(crate) const FAILURE_TITLE: &str = "Failed to fetch AP data";

/// Where user-visible failure notifications go
pub(crate) trait Notifier {
    fn failure(&mut self, message: &str);
}

/// Notifies by logging at error level, which `env_logger` writes to stderr
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    fn failure(&mut self, message: &str) {
        log::error!("{FAILURE_TITLE}: {message}");
    }
}

use crate::notify::Notifier;
use crate::status::refresh_status;
use config::Config;
use data_model::{Credentials, FetchResult, StatusSummary};
use std::sync::mpsc::{Receiver, RecvTimeoutError};

/// What is shown to the user. A failed refresh does not replace the last good summary.
#[derive(Debug, Default)]
pub(crate) struct StatusBoard {
    last_good: Option<StatusSummary>,
}

impl StatusBoard {
    pub(crate) fn update(&mut self, result: &FetchResult) -> Option<StatusSummary> {
        if result.is_ok() {
            self.last_good = Some(result.data);
        }
        self.last_good
    }
}

pub(crate) fn monitor_loop(
    config: &Config,
    credentials: &Credentials,
    term_receiver: Receiver<()>,
    notifier: &mut dyn Notifier,
) {
    let mut board = StatusBoard::default();

    loop {
        let result = refresh_status(credentials, &config.api_settings, notifier);
        match (board.update(&result), result.is_ok()) {
            (Some(summary), true) => println!("{summary}"),
            (Some(summary), false) => println!("{summary}\t(last known)"),
            (None, _) => println!("{result}"),
        }

        // A "sleep", interruptible by receiving a message to exit. Normal looping will produce
        // a timeout error, in which case refresh the status again.
        match term_receiver.recv_timeout(config.period_duration) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::info!("Exiting");
}

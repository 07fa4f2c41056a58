use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::channel;

use clap::Parser;
use config::{default_credentials_path, load_config, load_credentials};
use notify::LogNotifier;

mod monitor;
mod notify;
mod status;

#[derive(Parser, Debug)]
#[command(name = "apmon", version, about)]
struct Cli {
    /// Config file to use instead of searching for 'apmon.toml'
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Credentials file to use instead of the one in the user config directory
    #[arg(long, env = "APMON_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Fetch the status once and exit
    #[arg(long)]
    once: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_config(cli.config.as_deref())?;
    let credentials_path = match cli.credentials {
        Some(path) => path,
        None => default_credentials_path()?,
    };
    let credentials = load_credentials(&credentials_path)?;

    if !credentials.is_configured() {
        log::warn!(
            "API credentials are not configured in '{}'. \
             Set them with: configr set --customer-id <ID> --token <TOKEN>",
            credentials_path.display()
        );
        return Ok(ExitCode::FAILURE);
    }

    log::info!("Using API at: {}", credentials.operative_base_url());
    let mut notifier = LogNotifier;

    if cli.once {
        let result = status::refresh_status(&credentials, &config.api_settings, &mut notifier);
        println!("{result}");
        return Ok(if result.is_ok() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    log::info!("Refreshing every {}s, Ctrl-C to stop", config.period_duration.as_secs());
    let (tx, rx) = channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })?;

    monitor::monitor_loop(&config, &credentials, rx, &mut notifier);

    Ok(ExitCode::SUCCESS)
}

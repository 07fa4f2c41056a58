use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use config::{
    clear_credentials, default_credentials_path, load_credentials, update_credentials,
    CredentialsUpdate,
};
use data_model::{find_region, Credentials, REGIONS};

#[derive(Parser, Debug)]
#[command(name = "configr", version, about = "Edit the API credentials used by apmon")]
struct Cli {
    /// Credentials file to edit instead of the one in the user config directory
    #[arg(long, env = "APMON_CREDENTIALS")]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Update one or more of the stored credentials
    Set(SetArgs),
    /// Show the stored credentials, with secrets masked
    Show,
    /// Remove the stored credentials
    Clear,
    /// List the known regional API gateways
    Regions,
}

#[derive(Args, Debug, Default)]
struct SetArgs {
    #[arg(long)]
    customer_id: Option<String>,
    #[arg(long)]
    client_id: Option<String>,
    #[arg(long)]
    client_secret: Option<String>,
    #[arg(long)]
    token: Option<String>,
    /// Base url of the API gateway to use
    #[arg(long, conflicts_with = "region")]
    base_url: Option<String>,
    /// Region label or url, see 'configr regions'
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    group_name: Option<String>,
    /// Use the private cluster url instead of the base url
    #[arg(long)]
    private_cluster: Option<bool>,
    #[arg(long)]
    private_cluster_url: Option<String>,
}

impl SetArgs {
    fn into_update(self) -> Result<CredentialsUpdate, String> {
        let base_url = match self.region {
            Some(region) => Some(
                find_region(&region)
                    .ok_or(format!("Unknown region '{region}'"))?
                    .url
                    .to_string(),
            ),
            None => self.base_url,
        };

        Ok(CredentialsUpdate {
            customer_id: self.customer_id,
            client_id: self.client_id,
            client_secret: self.client_secret,
            token: self.token,
            base_url,
            group_name: self.group_name,
            is_private_cluster: self.private_cluster,
            private_cluster_url: self.private_cluster_url,
        })
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let credentials_path = match cli.credentials {
        Some(path) => path,
        None => default_credentials_path()?,
    };

    match cli.command {
        Command::Set(args) => {
            let update = args.into_update()?;
            if update.is_empty() {
                println!("Nothing to update");
            }
            let credentials = update_credentials(&credentials_path, update)?;
            print_credentials(&credentials);
        }
        Command::Show => {
            println!("Credentials file: '{}'", credentials_path.display());
            print_credentials(&load_credentials(&credentials_path)?);
        }
        Command::Clear => {
            if !clear_credentials(&credentials_path)? {
                println!("No credentials stored in '{}'", credentials_path.display());
            }
        }
        Command::Regions => {
            for region in &REGIONS {
                println!("{:<30}{}", region.label, region.url);
            }
        }
    }

    Ok(())
}

fn mask(secret: &str) -> String {
    match secret.char_indices().nth(4) {
        Some((index, _)) => format!("{}****", &secret[..index]),
        None if secret.is_empty() => String::new(),
        None => "****".to_string(),
    }
}

fn print_credentials(credentials: &Credentials) {
    println!("customer_id:         {}", credentials.customer_id);
    println!("client_id:           {}", credentials.client_id);
    println!("client_secret:       {}", mask(&credentials.client_secret));
    println!("token:               {}", mask(&credentials.token));
    println!("base_url:            {}", credentials.base_url);
    println!("group_name:          {}", credentials.group_name);
    println!("private_cluster:     {}", credentials.is_private_cluster);
    println!("private_cluster_url: {}", credentials.private_cluster_url);
    println!(
        "{}",
        if credentials.is_configured() {
            "Configured, using API at: ".to_string() + credentials.operative_base_url()
        } else {
            "Not configured: customer_id and token are required".to_string()
        }
    );
}

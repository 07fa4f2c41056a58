use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use data_model::Credentials;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "apmon.toml";
pub const CREDENTIALS_FILE_NAME: &str = "credentials.toml";

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_CUSTOMER_HEADER: &str = "X-Aruba-Central-Customer-Id";
const DEFAULT_PERIOD_SECONDS: u64 = 60;
const MIN_PERIOD_SECONDS: u64 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("could not parse toml file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize to toml: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// How requests to the device listing API are formed
#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct ApiSpec {
    /// Value of the `limit` query parameter
    pub page_size: Option<u32>,
    /// Name of the header that carries the customer id
    pub customer_header: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct MonitorSpec {
    pub period_seconds: Option<u64>,
}

/// [ApiSpec] with all defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub page_size: u32,
    pub customer_header: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            page_size: DEFAULT_PAGE_SIZE,
            customer_header: DEFAULT_CUSTOMER_HEADER.to_string(),
        }
    }
}

#[derive(Default, Serialize, Deserialize, Debug)]
pub struct Config {
    pub api: Option<ApiSpec>,
    pub monitor: Option<MonitorSpec>,
    #[serde(skip)]
    pub api_settings: ApiSettings,
    #[serde(skip)]
    pub period_duration: Duration,
}

impl Config {
    // Fill in the derived fields from what was (or was not) found in the file
    fn resolve(mut self) -> Self {
        let period = self
            .monitor
            .as_ref()
            .and_then(|spec| spec.period_seconds)
            .unwrap_or(DEFAULT_PERIOD_SECONDS);
        if period < MIN_PERIOD_SECONDS {
            log::warn!("period_seconds = {period} is too short, using {MIN_PERIOD_SECONDS}s");
        }
        let period = period.max(MIN_PERIOD_SECONDS);
        self.period_duration = Duration::from_secs(period);

        let mut settings = ApiSettings::default();
        if let Some(spec) = &self.api {
            if let Some(page_size) = spec.page_size {
                settings.page_size = page_size;
            }
            if let Some(header) = &spec.customer_header {
                settings.customer_header = header.clone();
            }
        }
        self.api_settings = settings;

        self
    }
}

pub fn find_config_file(file_name: &str) -> Result<PathBuf> {
    let mut dir = env::current_dir().ok();

    // Loop until no parent director exists. (i.e. stop at "/")
    while let Some(directory) = dir {
        let config_path = directory.join(file_name);

        if config_path.exists() {
            return Ok(config_path);
        }

        dir = directory.parent().map(|p| p.to_path_buf());
    }

    Err(ConfigError::NotFound(format!("'{file_name}' config file not found")))
}

pub fn read_config(config_file_path: &Path) -> Result<Config> {
    let config_string = fs::read_to_string(config_file_path)?;
    let config: Config = toml::from_str(&config_string)?;
    Ok(config.resolve())
}

/// Read the config file at `path` if given, else search for one, else use the defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(config_path) => read_config(config_path),
        None => match find_config_file(CONFIG_FILE_NAME) {
            Ok(config_path) => {
                log::info!("Config file loaded from: \"{}\"", config_path.display());
                read_config(&config_path)
            }
            Err(_) => {
                log::debug!("No '{CONFIG_FILE_NAME}' found, using default config");
                Ok(Config::default().resolve())
            }
        },
    }
}

pub fn default_credentials_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("apmon").join(CREDENTIALS_FILE_NAME))
        .ok_or_else(|| ConfigError::NotFound("user config directory not found".into()))
}

/// Load stored credentials. Nothing stored yet is not an error, defaults are returned.
pub fn load_credentials(credentials_path: &Path) -> Result<Credentials> {
    if !credentials_path.exists() {
        return Ok(Credentials::default());
    }
    let credentials_string = fs::read_to_string(credentials_path)?;
    Ok(toml::from_str(&credentials_string)?)
}

pub fn save_credentials(credentials_path: &Path, credentials: &Credentials) -> Result<()> {
    if let Some(parent) = credentials_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(credentials_path, toml::to_string_pretty(credentials)?)?;
    Ok(())
}

/// A partial set of credentials. Fields that are `None` are left unchanged.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CredentialsUpdate {
    pub customer_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub group_name: Option<String>,
    pub is_private_cluster: Option<bool>,
    pub private_cluster_url: Option<String>,
}

impl CredentialsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == CredentialsUpdate::default()
    }

    pub fn apply(self, credentials: &mut Credentials) {
        let fields = [
            (self.customer_id, &mut credentials.customer_id),
            (self.client_id, &mut credentials.client_id),
            (self.client_secret, &mut credentials.client_secret),
            (self.token, &mut credentials.token),
            (self.base_url, &mut credentials.base_url),
            (self.group_name, &mut credentials.group_name),
            (self.private_cluster_url, &mut credentials.private_cluster_url),
        ];
        for (new_value, field) in fields {
            if let Some(value) = new_value {
                *field = value;
            }
        }
        if let Some(private) = self.is_private_cluster {
            credentials.is_private_cluster = private;
        }
    }
}

/// Merge `update` over the stored credentials and store the result
pub fn update_credentials(
    credentials_path: &Path,
    update: CredentialsUpdate,
) -> Result<Credentials> {
    let mut credentials = load_credentials(credentials_path)?;
    if update.is_empty() {
        return Ok(credentials);
    }
    update.apply(&mut credentials);
    save_credentials(credentials_path, &credentials)?;
    log::info!("Credentials updated in '{}'", credentials_path.display());
    Ok(credentials)
}

/// Remove stored credentials. Returns whether there was anything to remove.
pub fn clear_credentials(credentials_path: &Path) -> Result<bool> {
    match fs::remove_file(credentials_path) {
        Ok(()) => {
            log::info!("Credentials cleared from '{}'", credentials_path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

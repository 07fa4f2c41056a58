use crate::notify::Notifier;
use config::ApiSettings;
use curl::easy::{Easy, List};
use data_model::{Credentials, DeviceRecord, FetchResult, StatusSummary};
use serde_derive::Deserialize;
use thiserror::Error;
use url::Url;

const DEVICES_PATH: &str = "/central/v2/devices";
const MAX_REDIRECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq)]
pub(crate) enum FetchError {
    #[error("invalid request url: {0}")]
    Url(String),

    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status. The message is the API's own description when it gave one.
    #[error("{message}")]
    Http { status: u32, message: String },

    #[error("could not parse response: {0}")]
    Parse(String),
}

impl From<curl::Error> for FetchError {
    fn from(error: curl::Error) -> Self {
        FetchError::Network(error.to_string())
    }
}

/// Body of a device listing response. Different API versions use different names for the
/// count and for the list, so all are optional here and resolved in [DevicesResponse::into_summary]
#[derive(Deserialize, Debug, Default)]
pub(crate) struct DevicesResponse {
    total: Option<u64>,
    count: Option<u64>,
    devices: Option<Vec<DeviceRecord>>,
    aps: Option<Vec<DeviceRecord>>,
}

impl DevicesResponse {
    pub(crate) fn into_summary(self) -> StatusSummary {
        let mut summary = StatusSummary {
            total: self.total.or(self.count).unwrap_or(0),
            ..Default::default()
        };

        for device in self.devices.or(self.aps).unwrap_or_default() {
            match device.status.as_deref() {
                Some("Up") => summary.online += 1,
                Some("Down") => summary.offline += 1,
                _ => summary.warning += 1,
            }
        }

        // No per-device status at all: assume everything counted is online
        if summary.total > 0 && summary.online + summary.offline + summary.warning == 0 {
            summary.online = summary.total;
        }

        summary
    }
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    description: Option<String>,
}

pub(crate) fn request_url(
    credentials: &Credentials,
    settings: &ApiSettings,
) -> Result<Url, FetchError> {
    let target = format!(
        "{}{DEVICES_PATH}?sku_type=IAP&limit={}&calculate_total=true",
        credentials.operative_base_url(),
        settings.page_size
    );
    Url::parse(&target).map_err(|e| FetchError::Url(format!("'{target}': {e}")))
}

pub(crate) fn request_headers(credentials: &Credentials, settings: &ApiSettings) -> Vec<String> {
    vec![
        "Accept: application/json".to_string(),
        "Content-Type: application/json".to_string(),
        format!("Authorization: Bearer {}", credentials.token),
        format!("{}: {}", settings.customer_header, credentials.customer_id),
    ]
}

/// Reduce an HTTP response from the device listing endpoint to a [StatusSummary]
pub(crate) fn summarize(status_code: u32, body: &[u8]) -> Result<StatusSummary, FetchError> {
    if !(200..300).contains(&status_code) {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|error_body| error_body.description)
            .filter(|description| !description.is_empty())
            .unwrap_or_else(|| format!("API error: {status_code}"));
        return Err(FetchError::Http {
            status: status_code,
            message,
        });
    }

    let response: DevicesResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    Ok(response.into_summary())
}

fn get(url: &Url, headers: &[String]) -> Result<(u32, Vec<u8>), FetchError> {
    let mut easy = Easy::new();
    easy.url(url.as_str())?;
    easy.get(true)?;
    // Authorization is not re-sent when a redirect leads to another host, as curl's default
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTIONS)?;

    let mut list = List::new();
    for header in headers {
        list.append(header)?;
    }
    easy.http_headers(list)?;

    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|new_data| {
            body.extend_from_slice(new_data);
            Ok(new_data.len())
        })?;
        transfer.perform()?;
    }

    let status_code = easy.response_code()?;
    log::debug!("GET {} -> {status_code} ({} bytes)", url, body.len());
    Ok((status_code, body))
}

fn try_fetch_status(
    credentials: &Credentials,
    settings: &ApiSettings,
) -> Result<StatusSummary, FetchError> {
    let url = request_url(credentials, settings)?;
    let (status_code, body) = get(&url, &request_headers(credentials, settings))?;
    summarize(status_code, &body)
}

/// Fetch the device list and count devices by status. Failures never escape, they are
/// returned as a zero summary with an error message.
pub(crate) fn fetch_status(credentials: &Credentials, settings: &ApiSettings) -> FetchResult {
    match try_fetch_status(credentials, settings) {
        Ok(summary) => FetchResult::ok(summary),
        Err(e) => {
            if let FetchError::Http { status, .. } = &e {
                log::debug!("Device list request returned HTTP status {status}");
            }
            FetchResult::failed(e.to_string())
        }
    }
}

/// [fetch_status], emitting one failure notification when it fails
pub(crate) fn refresh_status(
    credentials: &Credentials,
    settings: &ApiSettings,
    notifier: &mut dyn Notifier,
) -> FetchResult {
    let result = fetch_status(credentials, settings);
    if let Some(message) = &result.error {
        notifier.failure(message);
    }
    result
}

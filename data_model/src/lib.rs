use std::fmt::{Display, Formatter};

use serde::{Deserialize as _, Deserializer};
use serde_derive::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://apigw-uswest4.central.arubanetworks.com";

/// A regional API gateway that can be selected as the base url
#[derive(Debug, PartialEq)]
pub struct Region {
    pub label: &'static str,
    pub url: &'static str,
}

pub static REGIONS: [Region; 8] = [
    Region {
        label: "WiFi Down Under (Australia)",
        url: "https://central.wifidownunder.com",
    },
    Region {
        label: "US West 4 (Global)",
        url: DEFAULT_BASE_URL,
    },
    Region {
        label: "US West (USA)",
        url: "https://apigw-prod2.central.arubanetworks.com",
    },
    Region {
        label: "US East (USA)",
        url: "https://apigw-prod1.central.arubanetworks.com",
    },
    Region {
        label: "EU Central (Germany)",
        url: "https://apigw-eucentral3.central.arubanetworks.com",
    },
    Region {
        label: "Asia Pacific (Sydney)",
        url: "https://apigw-apac1.central.arubanetworks.com",
    },
    Region {
        label: "Asia Pacific (India)",
        url: "https://apigw-apac2.central.arubanetworks.com",
    },
    Region {
        label: "China",
        url: "https://apigw-china1.central.arubanetworks.com",
    },
];

/// Find a region by its label (case-insensitive) or by its url
pub fn find_region(label_or_url: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|region| {
        region.label.eq_ignore_ascii_case(label_or_url)
            || region.url == label_or_url.trim_end_matches('/')
    })
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Credentials {
    pub customer_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub token: String,
    pub base_url: String,
    pub group_name: String,
    pub is_private_cluster: bool,
    pub private_cluster_url: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Credentials {
            customer_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            group_name: String::new(),
            is_private_cluster: false,
            private_cluster_url: String::new(),
        }
    }
}

impl Credentials {
    /// Both a customer id and a token are needed before any request is made
    pub fn is_configured(&self) -> bool {
        !self.customer_id.is_empty() && !self.token.is_empty()
    }

    /// The base url requests are built from, with any single trailing '/' removed
    pub fn operative_base_url(&self) -> &str {
        let url = if self.is_private_cluster {
            &self.private_cluster_url
        } else {
            &self.base_url
        };
        url.strip_suffix('/').unwrap_or(url)
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusSummary {
    pub total: u64,
    pub online: u64,
    pub offline: u64,
    pub warning: u64,
}

impl Display for StatusSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total: {}\tOnline: {}\tOffline: {}\tWarning: {}",
            self.total, self.online, self.offline, self.warning
        )
    }
}

/// One entry of the device list returned by the API. Only the status is used.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct DeviceRecord {
    #[serde(default, deserialize_with = "status_text")]
    pub status: Option<String>,
}

// A status that is not a string (null, number, ...) is kept as None rather than failing the
// whole response
fn status_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Status::deserialize(deserializer)? {
        Status::Text(text) => Some(text),
        Status::Other(_) => None,
    })
}

/// The outcome of a status fetch. When `error` is set, `data` is the zero summary.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct FetchResult {
    pub data: StatusSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchResult {
    pub fn ok(data: StatusSummary) -> Self {
        FetchResult { data, error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        FetchResult {
            data: StatusSummary::default(),
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl Display for FetchResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.error {
            None => write!(f, "{}", self.data),
            Some(message) => write!(f, "Error: {message}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{
        find_region, Credentials, DeviceRecord, FetchResult, StatusSummary, DEFAULT_BASE_URL,
    };

    fn credentials(base_url: &str, private_cluster_url: &str, private: bool) -> Credentials {
        Credentials {
            base_url: base_url.to_owned(),
            private_cluster_url: private_cluster_url.to_owned(),
            is_private_cluster: private,
            ..Default::default()
        }
    }

    #[test]
    fn default_credentials_not_configured() {
        let creds = Credentials::default();
        assert!(!creds.is_configured());
        assert_eq!(creds.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn configured_needs_customer_and_token() {
        let mut creds = Credentials {
            customer_id: "abc".into(),
            ..Default::default()
        };
        assert!(!creds.is_configured());
        creds.token = "t0k3n".into();
        assert!(creds.is_configured());
    }

    #[test]
    fn private_cluster_selects_private_url() {
        let creds = credentials("https://public.example", "https://private.example", true);
        assert_eq!(creds.operative_base_url(), "https://private.example");
    }

    #[test]
    fn public_selects_base_url() {
        let creds = credentials("https://public.example", "https://private.example", false);
        assert_eq!(creds.operative_base_url(), "https://public.example");
    }

    #[test]
    fn single_trailing_slash_removed() {
        let creds = credentials("https://public.example/", "", false);
        assert_eq!(creds.operative_base_url(), "https://public.example");
        let creds = credentials("https://public.example//", "", false);
        assert_eq!(creds.operative_base_url(), "https://public.example/");
    }

    #[test]
    fn credentials_partial_toml() {
        let creds: Credentials = toml::from_str("customer_id = \"c1\"\ntoken = \"t\"\n").unwrap();
        assert!(creds.is_configured());
        assert_eq!(creds.base_url, DEFAULT_BASE_URL);
        assert!(!creds.is_private_cluster);
    }

    #[test]
    fn device_status_kinds() {
        let device: DeviceRecord = toml::from_str("status = \"Up\"\nname = \"AP-1\"\n").unwrap();
        assert_eq!(device.status.as_deref(), Some("Up"));
        let device: DeviceRecord = toml::from_str("status = 3\n").unwrap();
        assert_eq!(device.status, None);
        let device: DeviceRecord = toml::from_str("").unwrap();
        assert_eq!(device.status, None);
    }

    #[test]
    fn failed_result_is_zeroed() {
        let result = FetchResult::failed("boom");
        assert_eq!(result.data, StatusSummary::default());
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert!(!result.is_ok());
    }

    #[test]
    fn region_lookup() {
        assert_eq!(
            find_region("china").map(|r| r.url),
            Some("https://apigw-china1.central.arubanetworks.com")
        );
        assert_eq!(
            find_region(&format!("{DEFAULT_BASE_URL}/")).map(|r| r.label),
            Some("US West 4 (Global)")
        );
        assert!(find_region("Mars").is_none());
    }
}

//! Configuration types for export2word

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Record store access settings (paging, timeouts, headers)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Page-size ceiling sent with the first item request (default: 5000)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound on pages followed in one export (default: 10000)
    ///
    /// Guards against a store that never stops handing out continuation tokens.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Opaque `Authorization` header value (None = anonymous)
    #[serde(default)]
    pub auth_header: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            auth_header: None,
        }
    }
}

/// Value formatting settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormatConfig {
    /// chrono format pattern for date/time fields (default: `%-m/%-d/%Y, %-I:%M:%S %p`)
    #[serde(default = "default_datetime_pattern")]
    pub datetime_pattern: String,

    /// Offset from UTC, in minutes, date/time fields are rendered in (default: 0)
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            datetime_pattern: default_datetime_pattern(),
            utc_offset_minutes: 0,
        }
    }
}

/// Which layout to use when the view qualifies for question/answer layout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPreference {
    /// Question/answer layout when eligible, table otherwise (default)
    #[default]
    Auto,
    /// Always table layout
    Table,
}

/// Main configuration for [`ListExporter`](crate::ListExporter)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Absolute URL of the site hosting the list (e.g. "https://contoso.sharepoint.com/sites/hr")
    pub site_url: String,

    /// Title of the list to export
    pub list_title: String,

    /// Explicit view id; the list's default view is used when None
    #[serde(default)]
    pub view_id: Option<String>,

    /// Record store access settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Value formatting settings
    #[serde(default)]
    pub format: FormatConfig,

    /// Layout selection
    #[serde(default)]
    pub layout: LayoutPreference,

    /// Directory [`FileSink`](crate::sink::FileSink) writes documents into (default: ".")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            list_title: String::new(),
            view_id: None,
            store: StoreConfig::default(),
            format: FormatConfig::default(),
            layout: LayoutPreference::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Create a config for a list with every other setting at its default
    pub fn new(site_url: impl Into<String>, list_title: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            list_title: list_title.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the settings an export cannot run without
    pub fn validate(&self) -> Result<()> {
        let site = url::Url::parse(&self.site_url).map_err(|e| Error::Config {
            message: format!("invalid site url '{}': {}", self.site_url, e),
            key: Some("site_url".to_string()),
        })?;
        if !matches!(site.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("site url must be http or https, got '{}'", site.scheme()),
                key: Some("site_url".to_string()),
            });
        }

        if self.list_title.trim().is_empty() {
            return Err(Error::Config {
                message: "list title must not be empty".to_string(),
                key: Some("list_title".to_string()),
            });
        }

        if self.store.page_size == 0 {
            return Err(Error::Config {
                message: "page size must be at least 1".to_string(),
                key: Some("store.page_size".to_string()),
            });
        }

        if self.store.max_pages == 0 {
            return Err(Error::Config {
                message: "max pages must be at least 1".to_string(),
                key: Some("store.max_pages".to_string()),
            });
        }

        if chrono::format::StrftimeItems::new(&self.format.datetime_pattern)
            .any(|item| matches!(item, chrono::format::Item::Error))
        {
            return Err(Error::Config {
                message: format!(
                    "invalid date/time pattern '{}'",
                    self.format.datetime_pattern
                ),
                key: Some("format.datetime_pattern".to_string()),
            });
        }

        // chrono's FixedOffset accepts strictly less than one day
        if self.format.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(Error::Config {
                message: format!(
                    "utc offset must be within +/-1439 minutes, got {}",
                    self.format.utc_offset_minutes
                ),
                key: Some("format.utc_offset_minutes".to_string()),
            });
        }

        Ok(())
    }
}

fn default_page_size() -> u32 {
    crate::pager::DEFAULT_PAGE_SIZE
}

fn default_max_pages() -> usize {
    crate::pager::DEFAULT_MAX_PAGES
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("export2word/{}", env!("CARGO_PKG_VERSION"))
}

fn default_datetime_pattern() -> String {
    "%-m/%-d/%Y, %-I:%M:%S %p".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

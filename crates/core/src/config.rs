//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the API client. Library
//! code never reads environment variables itself; the binary reads them and hands the raw values to
//! the helpers here.

use crate::constants::DEFAULT_API_BASE_URL;
use crate::{PatientorError, PatientorResult};

/// Client configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    api_base_url: String,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// The base URL must use `http://` or `https://`. A trailing slash is dropped so request paths
    /// can be appended verbatim.
    ///
    /// # Errors
    ///
    /// Returns `PatientorError::InvalidInput` if the URL is blank or has an unsupported scheme.
    pub fn new(api_base_url: impl AsRef<str>) -> PatientorResult<Self> {
        let trimmed = api_base_url.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PatientorError::InvalidInput(
                "api_base_url cannot be empty".into(),
            ));
        }

        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(PatientorError::InvalidInput(format!(
                "api_base_url must start with http:// or https://, got '{trimmed}'"
            )));
        }

        Ok(Self {
            api_base_url: trimmed.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Join a request path (starting with `/`) onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Build a `ClientConfig` from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, the default base URL is used.
pub fn api_base_url_from_env_value(value: Option<String>) -> PatientorResult<ClientConfig> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        Some(url) => ClientConfig::new(url),
        None => Ok(ClientConfig::default()),
    }
}

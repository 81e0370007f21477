use std::time::Duration;

/// Default HTTP request timeout for admin-ajax calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Editor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// `admin-ajax.php` endpoint. Network calls are skipped when unset.
    pub ajax_url: Option<String>,
    /// WordPress nonce sent with every admin-ajax call.
    pub ajax_nonce: String,
    pub request_timeout_secs: u64,
    /// JSON file holding the page snapshot to edit.
    pub snapshot_path: String,
    /// Category ids to activate after loading, in order.
    pub activate: Vec<String>,
}

impl EditorConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `WPPFM_SNAPSHOT_PATH`        | --      |
    /// | `WPPFM_AJAX_URL`             | unset   |
    /// | `WPPFM_AJAX_NONCE`           | empty   |
    /// | `WPPFM_REQUEST_TIMEOUT_SECS` | `30`    |
    /// | `WPPFM_ACTIVATE`             | empty   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let snapshot_path = std::env::var("WPPFM_SNAPSHOT_PATH")
            .map_err(|_| ConfigError::Missing("WPPFM_SNAPSHOT_PATH"))?;

        let ajax_url = std::env::var("WPPFM_AJAX_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        if let Some(url) = &ajax_url {
            wppfm_core::validation::validate_url(url).map_err(|_| ConfigError::Invalid {
                name: "WPPFM_AJAX_URL",
                expected: "an http(s) URL",
                value: url.clone(),
            })?;
        }

        let ajax_nonce = std::env::var("WPPFM_AJAX_NONCE").unwrap_or_default();

        let request_timeout_secs = match std::env::var("WPPFM_REQUEST_TIMEOUT_SECS") {
            Ok(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "WPPFM_REQUEST_TIMEOUT_SECS",
                expected: "a whole number of seconds",
                value: v,
            })?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let activate = parse_id_list(&std::env::var("WPPFM_ACTIVATE").unwrap_or_default());

        Ok(Self {
            ajax_url,
            ajax_nonce,
            request_timeout_secs,
            snapshot_path,
            activate,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Split a comma-separated id list, dropping blanks.
pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

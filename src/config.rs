//! Extension configuration.
//!
//! Carries the hosting web application origins, the auto-submit policy for
//! filled login forms, and the inactivity lock timeout. Use the builder
//! methods to customize behavior, or [`ExtensionConfig::from_env`] to pick
//! up the build-time environment the packaging step injects.

use std::time::Duration;

/// Default quiet period before the vault locks itself.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Configuration for the extension background process and popup.
#[derive(Debug, Clone)]
pub struct ExtensionConfig {
    /// Origin of the Ctrlpanel API the vault core talks to.
    pub api_host: String,
    /// Origin of the hosting web application. Used for the sync-token
    /// lookup tab and as the trusted origin for window messages.
    pub app_host: String,
    /// Whether `performLogin` submits the form after filling it.
    pub auto_submit: bool,
    /// Inactivity period after which the vault locks itself.
    pub lock_timeout: Duration,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            api_host: "https://api.ctrlpanel.io".to_string(),
            app_host: "https://app.ctrlpanel.io".to_string(),
            auto_submit: true,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

impl ExtensionConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API host origin.
    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    /// Set the hosting web application origin.
    pub fn with_app_host(mut self, app_host: impl Into<String>) -> Self {
        self.app_host = app_host.into();
        self
    }

    /// Set whether filled login forms are submitted automatically.
    pub fn with_auto_submit(mut self, auto_submit: bool) -> Self {
        self.auto_submit = auto_submit;
        self
    }

    /// Set the inactivity lock timeout.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Create a config from the `API_HOST`, `APP_HOST` and `AUTO_SUBMIT`
    /// environment variables, falling back to defaults for any that are
    /// missing.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(api_host) = std::env::var("API_HOST") {
            config.api_host = api_host;
        }
        if let Ok(app_host) = std::env::var("APP_HOST") {
            config.app_host = app_host;
        }
        if let Ok(auto_submit) = std::env::var("AUTO_SUBMIT") {
            config.auto_submit = auto_submit == "true" || auto_submit == "1";
        }

        config
    }
}

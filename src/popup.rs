//! Popup screen controller.
//!
//! Drives the finite set of popup screens from bridge calls and tab
//! automation. Rendering is the embedder's job; this module only decides
//! which screen to show.

use tracing::warn;
use url::Url;

use crate::bridge::ExtensionClient;
use crate::config::ExtensionConfig;
use crate::filler::{fill_field_script, has_login_script, perform_login_script};
use crate::hostname::strip_common_prefixes;
use crate::models::{AccountResult, LoginField};
use crate::traits::{BrowserTabs, MessageTransport, TabInfo};

pub const MSG_LOG_IN: &str = "Please log in to Ctrlpanel";
pub const MSG_NOT_ON_SIGN_IN_PAGE: &str = "Not on sign in page";
pub const MSG_NO_ACCOUNT_FOUND: &str = "No account found";
pub const MSG_FAILED_TO_FILL: &str = "Failed to fill";
pub const MSG_WRONG_MASTER_PASSWORD: &str = "Wrong master password";

/// What the popup is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupScreen {
    Empty,
    Locked {
        hostname: String,
        error_message: Option<String>,
    },
    Loading,
    Accounts {
        hostname: String,
        accounts: Vec<AccountResult>,
    },
    Error {
        message: String,
    },
}

/// Popup flow controller: a consumer of the bridge client and the tab
/// seam.
pub struct PopupController<T, B> {
    client: ExtensionClient<T>,
    browser: B,
    config: ExtensionConfig,
    screen: PopupScreen,
    /// Raw hostname of the page the popup opened on.
    page_hostname: Option<String>,
}

impl<T: MessageTransport, B: BrowserTabs> PopupController<T, B> {
    pub fn new(client: ExtensionClient<T>, browser: B, config: ExtensionConfig) -> Self {
        Self {
            client,
            browser,
            config,
            screen: PopupScreen::Empty,
            page_hostname: None,
        }
    }

    pub fn screen(&self) -> &PopupScreen {
        &self.screen
    }

    fn show_error(&mut self, message: &str) {
        self.screen = PopupScreen::Error {
            message: message.to_string(),
        };
    }

    /// The popup was opened: decide the first screen.
    pub async fn on_open(&mut self) {
        self.screen = PopupScreen::Empty;

        match self.client.need_credentials().await {
            Ok(true) => return self.show_error(MSG_LOG_IN),
            Ok(false) => {}
            Err(err) => return self.show_error(&err.message),
        }

        let Some(tab) = self.usable_active_tab().await else {
            return self.show_error(MSG_NOT_ON_SIGN_IN_PAGE);
        };
        let Some(hostname) = hostname_of(&tab.url) else {
            return self.show_error(MSG_NOT_ON_SIGN_IN_PAGE);
        };
        self.page_hostname = Some(hostname.clone());
        let display_hostname = strip_common_prefixes(&hostname).to_string();

        if self.browser.inject_file(tab.id, "/filler.js").await.is_err() {
            return self.show_error(MSG_NOT_ON_SIGN_IN_PAGE);
        }
        let has_login = self
            .browser
            .execute_script(tab.id, &has_login_script())
            .await
            .map(|value| value.as_bool().unwrap_or(false))
            .unwrap_or(false);
        if !has_login {
            return self.show_error(MSG_NOT_ON_SIGN_IN_PAGE);
        }

        match self.client.need_master_password().await {
            Ok(true) => {
                self.screen = PopupScreen::Locked {
                    hostname: display_hostname,
                    error_message: None,
                };
            }
            Ok(false) => self.load_accounts(display_hostname).await,
            Err(err) => self.show_error(&err.message),
        }
    }

    /// The unlock form was submitted with a master password attempt.
    pub async fn on_unlock_submit(&mut self, master_password: &str) {
        let PopupScreen::Locked { hostname, .. } = &self.screen else {
            warn!("unlock submitted outside the locked screen, ignoring");
            return;
        };
        let display_hostname = hostname.clone();

        self.screen = PopupScreen::Loading;

        if let Err(err) = self.client.unlock(master_password).await {
            if err.is_wrong_master_password() {
                self.screen = PopupScreen::Locked {
                    hostname: display_hostname,
                    error_message: Some(MSG_WRONG_MASTER_PASSWORD.to_string()),
                };
            } else {
                self.show_error(&err.message);
            }
            return;
        }

        self.load_accounts(display_hostname).await;
    }

    async fn load_accounts(&mut self, display_hostname: String) {
        self.screen = PopupScreen::Loading;

        if let Err(err) = self.client.sync().await {
            return self.show_error(&err.message);
        }

        let Some(page_hostname) = self.page_hostname.clone() else {
            return self.show_error(MSG_NOT_ON_SIGN_IN_PAGE);
        };

        match self.client.get_accounts_for_hostname(&page_hostname).await {
            Ok(accounts) if accounts.is_empty() => self.show_error(MSG_NO_ACCOUNT_FOUND),
            Ok(accounts) => {
                self.screen = PopupScreen::Accounts {
                    hostname: display_hostname,
                    accounts,
                };
            }
            Err(err) => self.show_error(&err.message),
        }
    }

    /// Fill the page's login form with one of the listed results.
    /// Best-effort: every failure collapses into a single generic error
    /// screen.
    pub async fn fill(&mut self, result: &AccountResult) {
        let Some(tab) = self.usable_active_tab().await else {
            return self.show_error(MSG_FAILED_TO_FILL);
        };

        let script = match result.password() {
            Some(password) => {
                perform_login_script(result.fill_handle(), password, self.config.auto_submit)
            }
            // No password yet for inbox/new sources; fill the handle
            // only.
            None => fill_field_script(LoginField::Handle, result.fill_handle()),
        };

        if self.browser.execute_script(tab.id, &script).await.is_err() {
            self.show_error(MSG_FAILED_TO_FILL);
        }
    }

    async fn usable_active_tab(&self) -> Option<TabInfo> {
        let tab = self.browser.active_tab().await.ok()??;
        if tab.url.starts_with("about:") {
            return None;
        }
        Some(tab)
    }
}

fn hostname_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
}

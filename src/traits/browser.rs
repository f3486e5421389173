//! Browser tab automation seam.
//!
//! Models the slice of the tabs API the background process and popup
//! need: spawning a transient tab to fetch the sync token, injecting the
//! filler, and executing page scripts.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Identifier of a browser tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub u32);

/// The active tab as seen by the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
}

/// Tab automation failures. Opaque to the bridge; the UI shows a generic
/// error state.
#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    #[error("Tab not found")]
    TabNotFound,

    #[error("Script execution failed: {0}")]
    ScriptFailed(String),

    #[error("Browser error: {0}")]
    Other(String),
}

/// Async surface over the browser's tab APIs.
#[async_trait]
pub trait BrowserTabs: Send + Sync {
    /// Open a tab at `url`, foregrounded iff `active`.
    async fn create_tab(&self, url: &str, active: bool) -> Result<TabId, BrowserError>;

    /// Resolve once the tab reaches the `complete` load status. No
    /// timeout: a tab that never finishes loading pends forever.
    async fn wait_for_complete(&self, tab: TabId) -> Result<(), BrowserError>;

    /// Evaluate `code` in the page and return its JSON result.
    async fn execute_script(&self, tab: TabId, code: &str) -> Result<Value, BrowserError>;

    /// Inject a packaged content script file into the page.
    async fn inject_file(&self, tab: TabId, file: &str) -> Result<(), BrowserError>;

    /// Bring the tab to the foreground.
    async fn focus_tab(&self, tab: TabId) -> Result<(), BrowserError>;

    /// Close the tab.
    async fn remove_tab(&self, tab: TabId) -> Result<(), BrowserError>;

    /// The active tab of the current window, if any.
    async fn active_tab(&self) -> Result<Option<TabInfo>, BrowserError>;
}

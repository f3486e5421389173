//! Scripted browser tab automation for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::traits::{BrowserError, BrowserTabs, TabId, TabInfo};

#[derive(Debug, Default)]
struct BrowserData {
    next_tab: u32,
    /// What a sync-token localStorage read returns, when present.
    sync_token: Option<String>,
    active_tab: Option<TabInfo>,
    /// Queued results for script executions that are not token reads.
    script_results: VecDeque<Value>,
    created_tabs: Vec<(TabId, String, bool)>,
    removed_tabs: Vec<TabId>,
    focused_tabs: Vec<TabId>,
    executed_scripts: Vec<(TabId, String)>,
    injected_files: Vec<(TabId, String)>,
    execute_should_fail: bool,
}

/// Scripted [`BrowserTabs`] implementation. Clones share state, so a
/// test can keep a handle for assertions after moving one into the
/// actor.
#[derive(Debug, Clone, Default)]
pub struct MockBrowser {
    inner: Arc<Mutex<BrowserData>>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sync-token reads find `token` in the app's local storage.
    pub fn with_sync_token(self, token: impl Into<String>) -> Self {
        self.inner.lock().unwrap().sync_token = Some(token.into());
        self
    }

    /// Set the active tab the popup will see.
    pub fn with_active_tab(self, id: u32, url: impl Into<String>) -> Self {
        self.inner.lock().unwrap().active_tab = Some(TabInfo {
            id: TabId(id),
            url: url.into(),
        });
        self
    }

    /// Queue a result for the next non-token script execution.
    pub fn push_script_result(&self, value: Value) {
        self.inner.lock().unwrap().script_results.push_back(value);
    }

    /// Configure whether script execution should fail.
    pub fn set_execute_should_fail(&self, should_fail: bool) {
        self.inner.lock().unwrap().execute_should_fail = should_fail;
    }

    pub fn created_tabs(&self) -> Vec<(TabId, String, bool)> {
        self.inner.lock().unwrap().created_tabs.clone()
    }

    pub fn removed_tabs(&self) -> Vec<TabId> {
        self.inner.lock().unwrap().removed_tabs.clone()
    }

    pub fn focused_tabs(&self) -> Vec<TabId> {
        self.inner.lock().unwrap().focused_tabs.clone()
    }

    pub fn executed_scripts(&self) -> Vec<(TabId, String)> {
        self.inner.lock().unwrap().executed_scripts.clone()
    }

    pub fn injected_files(&self) -> Vec<(TabId, String)> {
        self.inner.lock().unwrap().injected_files.clone()
    }
}

#[async_trait]
impl BrowserTabs for MockBrowser {
    async fn create_tab(&self, url: &str, active: bool) -> Result<TabId, BrowserError> {
        let mut data = self.inner.lock().unwrap();
        data.next_tab += 1;
        let tab = TabId(data.next_tab);
        data.created_tabs.push((tab, url.to_string(), active));
        Ok(tab)
    }

    async fn wait_for_complete(&self, _tab: TabId) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn execute_script(&self, tab: TabId, code: &str) -> Result<Value, BrowserError> {
        let mut data = self.inner.lock().unwrap();
        if data.execute_should_fail {
            return Err(BrowserError::ScriptFailed("mock failure".to_string()));
        }
        data.executed_scripts.push((tab, code.to_string()));

        if code.contains("localStorage.getItem(\"credentials\")") {
            return Ok(data
                .sync_token
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null));
        }

        Ok(data.script_results.pop_front().unwrap_or(Value::Null))
    }

    async fn inject_file(&self, tab: TabId, file: &str) -> Result<(), BrowserError> {
        self.inner
            .lock()
            .unwrap()
            .injected_files
            .push((tab, file.to_string()));
        Ok(())
    }

    async fn focus_tab(&self, tab: TabId) -> Result<(), BrowserError> {
        self.inner.lock().unwrap().focused_tabs.push(tab);
        Ok(())
    }

    async fn remove_tab(&self, tab: TabId) -> Result<(), BrowserError> {
        self.inner.lock().unwrap().removed_tabs.push(tab);
        Ok(())
    }

    async fn active_tab(&self) -> Result<Option<TabInfo>, BrowserError> {
        Ok(self.inner.lock().unwrap().active_tab.clone())
    }
}

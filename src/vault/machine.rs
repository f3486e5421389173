//! The vault operation state machine.
//!
//! One instance lives inside the background actor and owns the single
//! mutable [`VaultState`] cell. Every operation validates the current
//! phase before doing anything; invalid phases fail with
//! [`ExtensionError::UnexpectedState`].

use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ExtensionConfig;
use crate::core::VaultCore;
use crate::error::ExtensionError;
use crate::hostname::{filter_matching, hostnames_match};
use crate::models::{Account, AccountResult, NewAccountCandidate};
use crate::traits::BrowserTabs;
use crate::vault::state::{StateKind, VaultState};

/// Script evaluated in the transient app tab to recover a stored sync
/// token.
pub const READ_SYNC_TOKEN_SCRIPT: &str = r#"window.localStorage.getItem("credentials")"#;

/// The vault lifecycle state machine.
pub struct VaultMachine<C, B> {
    config: ExtensionConfig,
    core: C,
    browser: B,
    state: VaultState,
    /// Freshly-typed credentials captured by the filler, keyed by
    /// normalized hostname (last write wins).
    candidates: Vec<NewAccountCandidate>,
    /// Inactivity deadline; `None` while disarmed.
    lock_deadline: Option<Instant>,
}

impl<C: VaultCore, B: BrowserTabs> VaultMachine<C, B> {
    pub fn new(config: ExtensionConfig, core: C, browser: B) -> Self {
        Self {
            config,
            core,
            browser,
            state: VaultState::Empty,
            candidates: Vec::new(),
            lock_deadline: None,
        }
    }

    /// Current lifecycle phase.
    pub fn state_kind(&self) -> StateKind {
        self.state.kind()
    }

    /// Current inactivity deadline, if armed.
    pub fn lock_deadline(&self) -> Option<Instant> {
        self.lock_deadline
    }

    fn extend_lock_deadline(&mut self) {
        self.lock_deadline = Some(Instant::now() + self.config.lock_timeout);
    }

    fn unexpected(&self) -> ExtensionError {
        ExtensionError::UnexpectedState(self.state.kind())
    }

    /// Whether the user still has to log in to the hosting application.
    ///
    /// From Empty, looks for a sync token in the application's page-local
    /// storage through a transient background tab. Finding one moves the
    /// vault to Locked as a side effect and returns false; otherwise the
    /// tab is foregrounded so the user can log in, and the answer is
    /// true.
    pub async fn need_credentials(&mut self) -> Result<bool, ExtensionError> {
        if !matches!(self.state, VaultState::Empty) {
            return Ok(false);
        }

        let url = format!("{}/", self.config.app_host);
        let tab = self.browser.create_tab(&url, false).await?;
        self.browser.wait_for_complete(tab).await?;

        let value = self.browser.execute_script(tab, READ_SYNC_TOKEN_SCRIPT).await?;
        let sync_token = value.as_str().map(str::to_owned);

        let Some(sync_token) = sync_token else {
            self.browser.focus_tab(tab).await?;
            return Ok(true);
        };

        self.browser.remove_tab(tab).await?;

        let locked = self.core.init_with_token(&sync_token)?;
        info!(handle = %locked.handle, "recovered sync token, vault locked");
        self.state = VaultState::Locked(locked);

        Ok(false)
    }

    /// Whether the vault still needs the master password. Arms the
    /// inactivity timer when answering from Locked.
    pub fn need_master_password(&mut self) -> Result<bool, ExtensionError> {
        match self.state.kind() {
            StateKind::Unlocked | StateKind::Connected => Ok(false),
            StateKind::Locked => {
                self.extend_lock_deadline();
                Ok(true)
            }
            StateKind::Empty => Err(self.unexpected()),
        }
    }

    /// Decrypt the vault. A rejected password leaves the state Locked.
    pub async fn unlock(&mut self, master_password: &str) -> Result<(), ExtensionError> {
        let locked = match &self.state {
            VaultState::Locked(v) => v.clone(),
            _ => return Err(self.unexpected()),
        };

        self.extend_lock_deadline();
        let unlocked = self.core.unlock(&locked, master_password).await?;
        info!(handle = %unlocked.handle, "vault unlocked");
        self.state = VaultState::Unlocked(unlocked);

        Ok(())
    }

    /// Promote Unlocked to Connected; no-op from any other state.
    async fn promote(&mut self) -> Result<(), ExtensionError> {
        let unlocked = match &self.state {
            VaultState::Unlocked(v) => v.clone(),
            _ => return Ok(()),
        };

        self.extend_lock_deadline();
        let connected = self.core.connect(&unlocked).await?;
        debug!(session = %connected.session.id(), "connected to remote storage");
        self.state = VaultState::Connected(connected);

        Ok(())
    }

    /// Fetch and merge remote changes. Valid from Unlocked (promoting to
    /// Connected first) or Connected.
    pub async fn sync(&mut self) -> Result<(), ExtensionError> {
        self.promote().await?;

        let connected = match &self.state {
            VaultState::Connected(v) => v.clone(),
            _ => return Err(self.unexpected()),
        };

        self.extend_lock_deadline();
        let refreshed = self.core.sync(&connected).await?;
        self.state = VaultState::Connected(refreshed);

        Ok(())
    }

    /// Drive the vault to Connected in one call from full credentials,
    /// clearing all stored data first when a different handle was
    /// previously active.
    pub async fn seed(
        &mut self,
        handle: &str,
        secret_key: &str,
        master_password: &str,
    ) -> Result<(), ExtensionError> {
        let handle_mismatch = self.state.handle().is_some_and(|current| current != handle);
        if handle_mismatch {
            info!("seeding with a different handle, clearing stored data");
            self.core.clear_stored_data().await?;
            self.state = VaultState::Empty;
            self.candidates.clear();
        }

        self.extend_lock_deadline();
        let connected = self.core.login(handle, secret_key, master_password, true).await?;
        let refreshed = self.core.sync(&connected).await?;
        info!(handle = %refreshed.handle, "vault seeded and connected");
        self.state = VaultState::Connected(refreshed);

        Ok(())
    }

    /// Discard decrypted material and return to Locked. No-op from Empty
    /// or Locked; never fails.
    pub fn lock(&mut self) {
        match self.state.kind() {
            StateKind::Empty | StateKind::Locked => {}
            _ => {
                self.state = std::mem::take(&mut self.state).lock();
                info!("vault locked");
            }
        }
        self.lock_deadline = None;
    }

    /// Re-arm the inactivity timer. No-op unless decrypted; never fails.
    pub fn signal_activity(&mut self) {
        if matches!(self.state.kind(), StateKind::Unlocked | StateKind::Connected) {
            self.extend_lock_deadline();
        }
    }

    /// Ranked matches for `hostname` across saved accounts, inbox
    /// entries and recorded new-account candidates, in that source
    /// order, stable within each source.
    pub fn accounts_for_hostname(
        &self,
        hostname: &str,
    ) -> Result<Vec<AccountResult>, ExtensionError> {
        let entries = self.state.entries().ok_or_else(|| self.unexpected())?;

        let mut results = Vec::new();

        for account in filter_matching(&entries.accounts, hostname, |a| a.hostname.as_str()) {
            results.push(AccountResult::Account {
                id: account.id.clone(),
                hostname: account.hostname.clone(),
                handle: account.handle.clone(),
                password: account.password.clone(),
            });
        }

        for entry in filter_matching(&entries.inbox, hostname, |e| e.hostname.as_str()) {
            results.push(AccountResult::Inbox {
                id: entry.id.clone(),
                email: entry.email.clone(),
                hostname: entry.hostname.clone(),
            });
        }

        for candidate in filter_matching(&self.candidates, hostname, |c| c.hostname.as_str()) {
            results.push(AccountResult::New {
                hostname: candidate.hostname.clone(),
                handle: candidate.handle.clone(),
            });
        }

        Ok(results)
    }

    /// Save a new account with a generated password, then re-sync. Valid
    /// when Connected (promoting from Unlocked first).
    pub async fn create_account(
        &mut self,
        handle: &str,
        hostname: &str,
    ) -> Result<(), ExtensionError> {
        self.promote().await?;

        let connected = match &self.state {
            VaultState::Connected(v) => v.clone(),
            _ => return Err(self.unexpected()),
        };

        self.extend_lock_deadline();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            hostname: hostname.to_string(),
            handle: handle.to_string(),
            password: self.core.random_account_password(),
        };
        let connected = self.core.create_account(&connected, account).await?;
        let refreshed = self.core.sync(&connected).await?;
        self.state = VaultState::Connected(refreshed);

        // The typed candidate is a saved account now.
        self.candidates
            .retain(|c| !(hostnames_match(&c.hostname, hostname) && c.handle == handle));

        Ok(())
    }

    /// Turn a pending inbox entry into a saved account with a generated
    /// password, delete the consumed entry, then re-sync. Valid when
    /// Connected (promoting from Unlocked first).
    pub async fn import_inbox_entry(
        &mut self,
        id: &str,
        handle: &str,
        hostname: &str,
    ) -> Result<(), ExtensionError> {
        self.promote().await?;

        let connected = match &self.state {
            VaultState::Connected(v) => v.clone(),
            _ => return Err(self.unexpected()),
        };

        self.extend_lock_deadline();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            hostname: hostname.to_string(),
            handle: handle.to_string(),
            password: self.core.random_account_password(),
        };
        let connected = self.core.create_account(&connected, account).await?;
        let connected = self.core.delete_inbox_entry(&connected, id).await?;
        let refreshed = self.core.sync(&connected).await?;
        self.state = VaultState::Connected(refreshed);

        Ok(())
    }

    /// Record a freshly-typed credential observed by the filler. Valid
    /// in any state; one candidate per normalized hostname, last write
    /// wins.
    pub fn record_candidate(&mut self, hostname: String, handle: String) {
        self.candidates
            .retain(|c| !hostnames_match(&c.hostname, &hostname));
        debug!(hostname = %hostname, "recorded new-account candidate");
        self.candidates.push(NewAccountCandidate { hostname, handle });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryCore, MockBrowser};
    use crate::models::InboxEntry;

    const HANDLE: &str = "linus@example.com";
    const MASTER_PASSWORD: &str = "correct horse battery staple";
    const SECRET_KEY: &str = "secret-key";
    const TOKEN: &str = "sync-token";

    fn seeded_core() -> InMemoryCore {
        InMemoryCore::new()
            .with_user(HANDLE, SECRET_KEY, MASTER_PASSWORD)
            .with_token(TOKEN, HANDLE)
            .with_account(
                HANDLE,
                Account {
                    id: "acc-1".to_string(),
                    hostname: "login.example.com".to_string(),
                    handle: HANDLE.to_string(),
                    password: "hunter2".to_string(),
                },
            )
    }

    fn machine(core: InMemoryCore, browser: MockBrowser) -> VaultMachine<InMemoryCore, MockBrowser> {
        VaultMachine::new(ExtensionConfig::default(), core, browser)
    }

    #[tokio::test]
    async fn test_need_credentials_without_token_focuses_tab_and_stays_empty() {
        let browser = MockBrowser::new();
        let mut machine = machine(seeded_core(), browser.clone());

        assert!(machine.need_credentials().await.unwrap());
        assert_eq!(machine.state_kind(), StateKind::Empty);
        assert_eq!(browser.focused_tabs().len(), 1);

        // Twice in a row: still true, never an error.
        assert!(machine.need_credentials().await.unwrap());
        assert_eq!(browser.created_tabs().len(), 2);
    }

    #[tokio::test]
    async fn test_need_credentials_with_token_locks_and_closes_tab() {
        let browser = MockBrowser::new().with_sync_token(TOKEN);
        let mut machine = machine(seeded_core(), browser.clone());

        assert!(!machine.need_credentials().await.unwrap());
        assert_eq!(machine.state_kind(), StateKind::Locked);
        assert_eq!(browser.removed_tabs().len(), 1);
        assert!(browser.focused_tabs().is_empty());
    }

    #[tokio::test]
    async fn test_need_master_password_from_empty_is_unexpected() {
        let mut machine = machine(seeded_core(), MockBrowser::new());
        let err = machine.need_master_password().unwrap_err();
        assert!(matches!(
            err,
            ExtensionError::UnexpectedState(StateKind::Empty)
        ));
    }

    #[tokio::test]
    async fn test_wrong_master_password_leaves_vault_locked() {
        let browser = MockBrowser::new().with_sync_token(TOKEN);
        let mut machine = machine(seeded_core(), browser);
        machine.need_credentials().await.unwrap();

        let err = machine.unlock("wrong").await.unwrap_err();
        assert!(matches!(err, ExtensionError::WrongMasterPassword));
        assert_eq!(machine.state_kind(), StateKind::Locked);

        machine.unlock(MASTER_PASSWORD).await.unwrap();
        assert_eq!(machine.state_kind(), StateKind::Unlocked);
    }

    #[tokio::test]
    async fn test_sync_from_unlocked_promotes_exactly_once() {
        let core = seeded_core();
        let browser = MockBrowser::new().with_sync_token(TOKEN);
        let mut machine = machine(core.clone(), browser);
        machine.need_credentials().await.unwrap();
        machine.unlock(MASTER_PASSWORD).await.unwrap();

        machine.sync().await.unwrap();
        assert_eq!(machine.state_kind(), StateKind::Connected);
        assert_eq!(core.connect_count(), 1);

        machine.sync().await.unwrap();
        assert_eq!(machine.state_kind(), StateKind::Connected);
        assert_eq!(core.connect_count(), 1, "already connected, no re-promotion");
    }

    #[tokio::test]
    async fn test_sync_from_locked_is_unexpected() {
        let browser = MockBrowser::new().with_sync_token(TOKEN);
        let mut machine = machine(seeded_core(), browser);
        machine.need_credentials().await.unwrap();

        let err = machine.sync().await.unwrap_err();
        assert!(matches!(
            err,
            ExtensionError::UnexpectedState(StateKind::Locked)
        ));
    }

    #[tokio::test]
    async fn test_seed_reaches_connected_from_empty() {
        let mut machine = machine(seeded_core(), MockBrowser::new());

        machine.seed(HANDLE, SECRET_KEY, MASTER_PASSWORD).await.unwrap();
        assert_eq!(machine.state_kind(), StateKind::Connected);
    }

    #[tokio::test]
    async fn test_seed_with_different_handle_clears_stored_data() {
        let core = seeded_core().with_user("other@example.com", "other-key", "other-password");
        let mut machine = machine(core.clone(), MockBrowser::new());

        machine.seed(HANDLE, SECRET_KEY, MASTER_PASSWORD).await.unwrap();
        machine.record_candidate("example.org".to_string(), "linus".to_string());

        machine
            .seed("other@example.com", "other-key", "other-password")
            .await
            .unwrap();
        assert_eq!(machine.state_kind(), StateKind::Connected);
        assert_eq!(core.clear_count(), 1);
        assert!(machine.accounts_for_hostname("example.org").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_registers_unknown_handle() {
        let mut machine = machine(InMemoryCore::new(), MockBrowser::new());

        machine
            .seed("fresh@example.com", "fresh-key", "fresh-password")
            .await
            .unwrap();
        assert_eq!(machine.state_kind(), StateKind::Connected);
    }

    #[tokio::test]
    async fn test_lock_and_signal_activity_are_noops_when_not_decrypted() {
        let mut machine = machine(seeded_core(), MockBrowser::new());
        machine.lock();
        machine.signal_activity();
        assert_eq!(machine.state_kind(), StateKind::Empty);
        assert!(machine.lock_deadline().is_none());
    }

    #[tokio::test]
    async fn test_accounts_for_hostname_matches_across_prefixes() {
        let core = seeded_core().with_inbox_entry(
            HANDLE,
            InboxEntry {
                id: "inbox-1".to_string(),
                email: "linus@example.com".to_string(),
                hostname: "example.com".to_string(),
            },
        );
        let browser = MockBrowser::new().with_sync_token(TOKEN);
        let mut machine = machine(core, browser);
        machine.need_credentials().await.unwrap();
        machine.unlock(MASTER_PASSWORD).await.unwrap();
        machine.record_candidate("app.example.com".to_string(), "typed".to_string());

        let results = machine.accounts_for_hostname("app.example.com").unwrap();
        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], AccountResult::Account { .. }));
        assert!(matches!(results[1], AccountResult::Inbox { .. }));
        assert!(matches!(results[2], AccountResult::New { .. }));
    }

    #[tokio::test]
    async fn test_accounts_for_hostname_requires_decrypted_vault() {
        let browser = MockBrowser::new().with_sync_token(TOKEN);
        let mut machine = machine(seeded_core(), browser);
        machine.need_credentials().await.unwrap();

        let err = machine.accounts_for_hostname("example.com").unwrap_err();
        assert!(matches!(
            err,
            ExtensionError::UnexpectedState(StateKind::Locked)
        ));
    }

    #[tokio::test]
    async fn test_create_account_generates_password_and_resyncs() {
        let core = seeded_core();
        let browser = MockBrowser::new().with_sync_token(TOKEN);
        let mut machine = machine(core.clone(), browser);
        machine.need_credentials().await.unwrap();
        machine.unlock(MASTER_PASSWORD).await.unwrap();

        machine.create_account(HANDLE, "news.ycombinator.com").await.unwrap();
        assert_eq!(machine.state_kind(), StateKind::Connected);

        let results = machine.accounts_for_hostname("news.ycombinator.com").unwrap();
        assert_eq!(results.len(), 1);
        let AccountResult::Account { password, .. } = &results[0] else {
            panic!("expected a saved account");
        };
        assert!(!password.is_empty());
    }

    #[tokio::test]
    async fn test_import_inbox_entry_consumes_the_entry() {
        let core = seeded_core().with_inbox_entry(
            HANDLE,
            InboxEntry {
                id: "inbox-1".to_string(),
                email: "linus@example.com".to_string(),
                hostname: "news.ycombinator.com".to_string(),
            },
        );
        let browser = MockBrowser::new().with_sync_token(TOKEN);
        let mut machine = machine(core, browser);
        machine.need_credentials().await.unwrap();
        machine.unlock(MASTER_PASSWORD).await.unwrap();

        machine
            .import_inbox_entry("inbox-1", HANDLE, "news.ycombinator.com")
            .await
            .unwrap();

        let results = machine.accounts_for_hostname("news.ycombinator.com").unwrap();
        assert_eq!(results.len(), 1, "inbox entry replaced by the account");
        assert!(matches!(results[0], AccountResult::Account { .. }));
    }

    #[tokio::test]
    async fn test_create_account_consumes_candidate_across_prefixes() {
        let mut machine = machine(seeded_core(), MockBrowser::new());
        machine.seed(HANDLE, SECRET_KEY, MASTER_PASSWORD).await.unwrap();
        machine.record_candidate("www.github.com".to_string(), HANDLE.to_string());

        machine.create_account(HANDLE, "github.com").await.unwrap();

        let results = machine.accounts_for_hostname("github.com").unwrap();
        assert_eq!(results.len(), 1, "candidate replaced by the saved account");
        assert!(matches!(results[0], AccountResult::Account { .. }));
    }

    #[tokio::test]
    async fn test_record_candidate_last_write_wins_per_hostname() {
        let mut machine = machine(seeded_core(), MockBrowser::new());
        machine.seed(HANDLE, SECRET_KEY, MASTER_PASSWORD).await.unwrap();

        machine.record_candidate("example.org".to_string(), "first".to_string());
        machine.record_candidate("www.example.org".to_string(), "second".to_string());

        let results = machine.accounts_for_hostname("example.org").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].fill_handle(), "second");
    }
}

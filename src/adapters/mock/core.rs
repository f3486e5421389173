//! In-memory vault core for testing.
//!
//! Stores registered users, sync tokens and per-user entry sets behind a
//! shared cell, so cloned handles observe the same data. Failure
//! injection switches cover the remote paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::core::{CoreError, VaultCore};
use crate::models::{Account, InboxEntry, ParsedEntries};
use crate::vault::{ConnectedVault, LockedVault, MasterKeys, Session, SyncToken, UnlockedVault};

#[derive(Debug, Clone)]
struct StoredUser {
    secret_key: String,
    master_password: String,
}

#[derive(Debug, Default)]
struct CoreData {
    users: HashMap<String, StoredUser>,
    /// sync token -> handle
    tokens: HashMap<String, String>,
    /// handle -> entry set
    entries: HashMap<String, ParsedEntries>,
    connect_should_fail: bool,
    sync_should_fail: bool,
    connect_count: usize,
    clear_count: usize,
}

/// In-memory [`VaultCore`] implementation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCore {
    inner: Arc<Mutex<CoreData>>,
}

impl InMemoryCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with full credentials.
    pub fn with_user(
        self,
        handle: impl Into<String>,
        secret_key: impl Into<String>,
        master_password: impl Into<String>,
    ) -> Self {
        let handle = handle.into();
        {
            let mut data = self.inner.lock().unwrap();
            data.users.insert(
                handle.clone(),
                StoredUser {
                    secret_key: secret_key.into(),
                    master_password: master_password.into(),
                },
            );
            data.entries.entry(handle).or_default();
        }
        self
    }

    /// Associate a sync token with a registered handle.
    pub fn with_token(self, token: impl Into<String>, handle: impl Into<String>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .tokens
            .insert(token.into(), handle.into());
        self
    }

    /// Add a saved account to a user's vault.
    pub fn with_account(self, handle: &str, account: Account) -> Self {
        self.inner
            .lock()
            .unwrap()
            .entries
            .entry(handle.to_string())
            .or_default()
            .accounts
            .push(account);
        self
    }

    /// Add a pending inbox entry to a user's vault.
    pub fn with_inbox_entry(self, handle: &str, entry: InboxEntry) -> Self {
        self.inner
            .lock()
            .unwrap()
            .entries
            .entry(handle.to_string())
            .or_default()
            .inbox
            .push(entry);
        self
    }

    /// Configure whether `connect` should fail.
    pub fn set_connect_should_fail(&self, should_fail: bool) {
        self.inner.lock().unwrap().connect_should_fail = should_fail;
    }

    /// Configure whether `sync` should fail.
    pub fn set_sync_should_fail(&self, should_fail: bool) {
        self.inner.lock().unwrap().sync_should_fail = should_fail;
    }

    /// How many times `connect` succeeded.
    pub fn connect_count(&self) -> usize {
        self.inner.lock().unwrap().connect_count
    }

    /// How many times `clear_stored_data` was called.
    pub fn clear_count(&self) -> usize {
        self.inner.lock().unwrap().clear_count
    }

    /// Saved accounts of a user, for assertions.
    pub fn accounts_for(&self, handle: &str) -> Vec<Account> {
        self.inner
            .lock()
            .unwrap()
            .entries
            .get(handle)
            .map(|e| e.accounts.clone())
            .unwrap_or_default()
    }

    fn entries_of(&self, handle: &str) -> ParsedEntries {
        self.inner
            .lock()
            .unwrap()
            .entries
            .get(handle)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl VaultCore for InMemoryCore {
    fn init_with_token(&self, sync_token: &str) -> Result<LockedVault, CoreError> {
        let data = self.inner.lock().unwrap();
        let handle = data
            .tokens
            .get(sync_token)
            .cloned()
            .ok_or_else(|| CoreError::InvalidSyncToken("unknown token".to_string()))?;

        Ok(LockedVault {
            handle,
            sync_token: SyncToken::new(sync_token),
        })
    }

    async fn unlock(
        &self,
        vault: &LockedVault,
        master_password: &str,
    ) -> Result<UnlockedVault, CoreError> {
        {
            let data = self.inner.lock().unwrap();
            let user = data
                .users
                .get(&vault.handle)
                .ok_or(CoreError::WrongMasterPassword)?;
            if user.master_password != master_password {
                return Err(CoreError::WrongMasterPassword);
            }
        }

        Ok(UnlockedVault {
            handle: vault.handle.clone(),
            sync_token: vault.sync_token.clone(),
            keys: MasterKeys::new(master_password.as_bytes().to_vec()),
            entries: self.entries_of(&vault.handle),
        })
    }

    async fn connect(&self, vault: &UnlockedVault) -> Result<ConnectedVault, CoreError> {
        {
            let mut data = self.inner.lock().unwrap();
            if data.connect_should_fail {
                return Err(CoreError::Remote("connect failed".to_string()));
            }
            data.connect_count += 1;
        }

        Ok(ConnectedVault {
            handle: vault.handle.clone(),
            sync_token: vault.sync_token.clone(),
            keys: vault.keys.clone(),
            session: Session::new(Uuid::new_v4().to_string()),
            entries: vault.entries.clone(),
        })
    }

    async fn sync(&self, vault: &ConnectedVault) -> Result<ConnectedVault, CoreError> {
        if self.inner.lock().unwrap().sync_should_fail {
            return Err(CoreError::Remote("sync failed".to_string()));
        }

        let mut refreshed = vault.clone();
        refreshed.entries = self.entries_of(&vault.handle);
        Ok(refreshed)
    }

    async fn login(
        &self,
        handle: &str,
        secret_key: &str,
        master_password: &str,
        register_if_missing: bool,
    ) -> Result<ConnectedVault, CoreError> {
        let sync_token = {
            let mut data = self.inner.lock().unwrap();
            match data.users.get(handle) {
                Some(user) => {
                    if user.secret_key != secret_key {
                        return Err(CoreError::Remote("unknown secret key".to_string()));
                    }
                    if user.master_password != master_password {
                        return Err(CoreError::WrongMasterPassword);
                    }
                }
                None if register_if_missing => {
                    data.users.insert(
                        handle.to_string(),
                        StoredUser {
                            secret_key: secret_key.to_string(),
                            master_password: master_password.to_string(),
                        },
                    );
                    data.entries.entry(handle.to_string()).or_default();
                }
                None => return Err(CoreError::Remote("unknown handle".to_string())),
            }

            let token = Uuid::new_v4().to_string();
            data.tokens.insert(token.clone(), handle.to_string());
            token
        };

        Ok(ConnectedVault {
            handle: handle.to_string(),
            sync_token: SyncToken::new(sync_token),
            keys: MasterKeys::new(master_password.as_bytes().to_vec()),
            session: Session::new(Uuid::new_v4().to_string()),
            entries: self.entries_of(handle),
        })
    }

    async fn clear_stored_data(&self) -> Result<(), CoreError> {
        self.inner.lock().unwrap().clear_count += 1;
        Ok(())
    }

    async fn create_account(
        &self,
        vault: &ConnectedVault,
        account: Account,
    ) -> Result<ConnectedVault, CoreError> {
        self.inner
            .lock()
            .unwrap()
            .entries
            .entry(vault.handle.clone())
            .or_default()
            .accounts
            .push(account);

        let mut refreshed = vault.clone();
        refreshed.entries = self.entries_of(&vault.handle);
        Ok(refreshed)
    }

    async fn delete_inbox_entry(
        &self,
        vault: &ConnectedVault,
        id: &str,
    ) -> Result<ConnectedVault, CoreError> {
        self.inner
            .lock()
            .unwrap()
            .entries
            .entry(vault.handle.clone())
            .or_default()
            .inbox
            .retain(|entry| entry.id != id);

        let mut refreshed = vault.clone();
        refreshed.entries = self.entries_of(&vault.handle);
        Ok(refreshed)
    }

    fn random_account_password(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_token_is_rejected() {
        let core = InMemoryCore::new();
        let err = core.init_with_token("nope").unwrap_err();
        assert!(matches!(err, CoreError::InvalidSyncToken(_)));
    }

    #[tokio::test]
    async fn test_unlock_checks_master_password() {
        let core = InMemoryCore::new()
            .with_user("a@b.c", "key", "right")
            .with_token("tok", "a@b.c");
        let locked = core.init_with_token("tok").unwrap();

        assert!(matches!(
            core.unlock(&locked, "wrong").await.unwrap_err(),
            CoreError::WrongMasterPassword
        ));
        assert!(core.unlock(&locked, "right").await.is_ok());
    }

    #[test]
    fn test_random_passwords_are_long_and_distinct() {
        let core = InMemoryCore::new();
        let a = core.random_account_password();
        let b = core.random_account_password();
        assert_eq!(a.len(), 24);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let core = InMemoryCore::new();
        let clone = core.clone();
        let vault = clone
            .login("a@b.c", "key", "password", true)
            .await
            .unwrap();

        let account = Account {
            id: "acc-1".to_string(),
            hostname: "example.com".to_string(),
            handle: "a@b.c".to_string(),
            password: "p".to_string(),
        };
        clone.create_account(&vault, account).await.unwrap();
        assert_eq!(core.accounts_for("a@b.c").len(), 1);
    }
}

//! Seam to the external vault core library.
//!
//! The core owns cryptography, account storage and the sync protocol;
//! this crate only drives it. The trait mirrors the collaborator's
//! surface so the background logic can be exercised against an in-memory
//! implementation in tests (see [`crate::adapters::mock::InMemoryCore`]).

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Account;
use crate::vault::{ConnectedVault, LockedVault, UnlockedVault};

/// Errors reported by the vault core collaborator.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// The master password did not decrypt the vault.
    #[error("Wrong master password")]
    WrongMasterPassword,

    /// The stored sync token could not be used to initialize the vault.
    #[error("Invalid sync token: {0}")]
    InvalidSyncToken(String),

    /// The remote API rejected or failed a request. Opaque to callers.
    #[error("Remote error: {0}")]
    Remote(String),
}

/// The external vault engine.
///
/// State-carrying methods borrow the current vault payload and return a
/// fresh one; the caller only replaces its state on success, so a failed
/// call leaves the state machine where it was.
#[async_trait]
pub trait VaultCore: Send + Sync {
    /// Restore a locked vault from a stored sync token.
    fn init_with_token(&self, sync_token: &str) -> Result<LockedVault, CoreError>;

    /// Decrypt the vault with the master password.
    async fn unlock(
        &self,
        vault: &LockedVault,
        master_password: &str,
    ) -> Result<UnlockedVault, CoreError>;

    /// Establish a session with remote storage.
    async fn connect(&self, vault: &UnlockedVault) -> Result<ConnectedVault, CoreError>;

    /// Fetch and merge remote changes, returning the refreshed vault.
    async fn sync(&self, vault: &ConnectedVault) -> Result<ConnectedVault, CoreError>;

    /// Log in with full credentials, registering the handle as a new
    /// user when `register_if_missing` is set, and return a connected
    /// vault.
    async fn login(
        &self,
        handle: &str,
        secret_key: &str,
        master_password: &str,
        register_if_missing: bool,
    ) -> Result<ConnectedVault, CoreError>;

    /// Remove everything the core persisted locally for the current
    /// user.
    async fn clear_stored_data(&self) -> Result<(), CoreError>;

    /// Save a new account into the vault.
    async fn create_account(
        &self,
        vault: &ConnectedVault,
        account: Account,
    ) -> Result<ConnectedVault, CoreError>;

    /// Delete a consumed inbox entry.
    async fn delete_inbox_entry(
        &self,
        vault: &ConnectedVault,
        id: &str,
    ) -> Result<ConnectedVault, CoreError>;

    /// Generate a password for a newly created account.
    fn random_account_password(&self) -> String;
}

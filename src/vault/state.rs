//! The vault state sum type.
//!
//! `VaultState` is owned exclusively by the background actor; it is
//! moved, never shared by reference across contexts. Transitions only
//! move forward (Empty → Locked → Unlocked → Connected), backward to
//! Locked, or to Empty on an explicit credential clear.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::models::ParsedEntries;

/// Opaque sync token obtained from the hosting web application. Redacted
/// from debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncToken(String);

impl SyncToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SyncToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SyncToken(..)")
    }
}

/// Master-key-derived material held while the vault is decrypted.
/// Zeroized on drop; redacted from debug output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKeys(Vec<u8>);

impl MasterKeys {
    pub fn new(material: Vec<u8>) -> Self {
        Self(material)
    }
}

impl fmt::Debug for MasterKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKeys(..)")
    }
}

/// Remote storage session held while connected.
#[derive(Debug, Clone)]
pub struct Session(String);

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Sync token present, vault still encrypted.
#[derive(Debug, Clone)]
pub struct LockedVault {
    pub handle: String,
    pub sync_token: SyncToken,
}

/// Decrypted but not yet connected to remote storage.
#[derive(Debug, Clone)]
pub struct UnlockedVault {
    pub handle: String,
    pub sync_token: SyncToken,
    pub keys: MasterKeys,
    pub entries: ParsedEntries,
}

/// Decrypted and actively synced.
#[derive(Debug, Clone)]
pub struct ConnectedVault {
    pub handle: String,
    pub sync_token: SyncToken,
    pub keys: MasterKeys,
    pub session: Session,
    pub entries: ParsedEntries,
}

/// Lifecycle state of the vault.
#[derive(Debug, Clone, Default)]
pub enum VaultState {
    #[default]
    Empty,
    Locked(LockedVault),
    Unlocked(UnlockedVault),
    Connected(ConnectedVault),
}

impl VaultState {
    pub fn kind(&self) -> StateKind {
        match self {
            VaultState::Empty => StateKind::Empty,
            VaultState::Locked(_) => StateKind::Locked,
            VaultState::Unlocked(_) => StateKind::Unlocked,
            VaultState::Connected(_) => StateKind::Connected,
        }
    }

    /// Handle of the owning user, known in every state but Empty.
    pub fn handle(&self) -> Option<&str> {
        match self {
            VaultState::Empty => None,
            VaultState::Locked(v) => Some(&v.handle),
            VaultState::Unlocked(v) => Some(&v.handle),
            VaultState::Connected(v) => Some(&v.handle),
        }
    }

    /// Parsed entry snapshot, available while decrypted.
    pub fn entries(&self) -> Option<&ParsedEntries> {
        match self {
            VaultState::Unlocked(v) => Some(&v.entries),
            VaultState::Connected(v) => Some(&v.entries),
            _ => None,
        }
    }

    /// Discard decrypted material and return to Locked. Empty and Locked
    /// pass through unchanged; key material is zeroized on drop.
    pub fn lock(self) -> VaultState {
        match self {
            VaultState::Empty => VaultState::Empty,
            VaultState::Locked(v) => VaultState::Locked(v),
            VaultState::Unlocked(v) => VaultState::Locked(LockedVault {
                handle: v.handle.clone(),
                sync_token: v.sync_token.clone(),
            }),
            VaultState::Connected(v) => VaultState::Locked(LockedVault {
                handle: v.handle.clone(),
                sync_token: v.sync_token.clone(),
            }),
        }
    }
}

/// Discriminant of [`VaultState`], used in errors and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Empty,
    Locked,
    Unlocked,
    Connected,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            StateKind::Empty => "empty",
            StateKind::Locked => "locked",
            StateKind::Unlocked => "unlocked",
            StateKind::Connected => "connected",
        };
        f.write_str(kind)
    }
}

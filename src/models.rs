//! Data model shared between the background process, the bridge and the
//! popup.
//!
//! Account data is a read-only snapshot of the synced vault: it is
//! recomputed wholesale on every sync or lookup and never mutated in
//! place.

use serde::{Deserialize, Serialize};

/// A saved login from the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub hostname: String,
    pub handle: String,
    pub password: String,
}

/// A pending signup capture the user has not yet saved as a managed
/// account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxEntry {
    pub id: String,
    pub email: String,
    pub hostname: String,
}

/// A freshly-typed credential observed on a page, not yet saved anywhere.
/// Carries no password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccountCandidate {
    pub hostname: String,
    pub handle: String,
}

/// Union of the three account sources returned by
/// `getAccountsForHostname`, tagged by `source` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum AccountResult {
    Account {
        id: String,
        hostname: String,
        handle: String,
        password: String,
    },
    Inbox {
        id: String,
        email: String,
        hostname: String,
    },
    New {
        hostname: String,
        handle: String,
    },
}

impl AccountResult {
    /// Hostname this result was matched on.
    pub fn hostname(&self) -> &str {
        match self {
            AccountResult::Account { hostname, .. }
            | AccountResult::Inbox { hostname, .. }
            | AccountResult::New { hostname, .. } => hostname,
        }
    }

    /// The identifier to fill into a username field. Inbox entries carry
    /// an email instead of a handle.
    pub fn fill_handle(&self) -> &str {
        match self {
            AccountResult::Account { handle, .. } | AccountResult::New { handle, .. } => handle,
            AccountResult::Inbox { email, .. } => email,
        }
    }

    /// The password to fill, when this source has one.
    pub fn password(&self) -> Option<&str> {
        match self {
            AccountResult::Account { password, .. } => Some(password),
            AccountResult::Inbox { .. } | AccountResult::New { .. } => None,
        }
    }
}

/// Parsed entry set of an unlocked vault. Vectors preserve the vault's
/// insertion order, which the matcher relies on for stable ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEntries {
    pub accounts: Vec<Account>,
    pub inbox: Vec<InboxEntry>,
}

/// Which inputs the detected login target exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableFields {
    pub handle: bool,
    pub password: bool,
}

/// A fillable field on the login target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginField {
    Handle,
    Password,
}

//! Vault lifecycle: state sum type, operation state machine, and the
//! single-writer actor that owns them in the background process.

mod actor;
mod machine;
mod state;

pub use actor::{spawn, VaultHandle, VaultRequest};
pub use machine::VaultMachine;
pub use state::{
    ConnectedVault, LockedVault, MasterKeys, Session, StateKind, SyncToken, UnlockedVault,
    VaultState,
};

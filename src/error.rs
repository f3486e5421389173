//! Error taxonomy for the extension.
//!
//! Every error that crosses the bridge boundary is serialized to
//! `{ message, code? }`. Only the stable `code` is matched
//! programmatically downstream; the message is for display and logging.

use thiserror::Error;

use crate::core::CoreError;
use crate::traits::BrowserError;
use crate::vault::StateKind;

/// Errors surfaced by the background vault operations and the bridge.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// An operation was invoked while the vault was in an invalid phase.
    /// Protocol misuse; fatal to the current call, never retried.
    #[error("Unexpected state: {0}")]
    UnexpectedState(StateKind),

    /// The master password did not decrypt the vault. Recoverable; the
    /// UI re-prompts.
    #[error("Wrong master password")]
    WrongMasterPassword,

    /// A bridge request named a method outside the catalog.
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// A bridge request carried a missing or malformed positional
    /// argument.
    #[error("Invalid argument {index} for {method}")]
    BadArguments { method: String, index: usize },

    /// Tab automation failed. Propagates opaquely; the UI shows a
    /// generic error state.
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The vault core collaborator failed for a reason other than a
    /// wrong master password.
    #[error("{0}")]
    Core(CoreError),

    /// A result could not be serialized onto the wire.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The background actor is gone; no further calls can be served.
    #[error("Background process unavailable")]
    BackgroundGone,
}

impl ExtensionError {
    /// Stable code for programmatic matching across the bridge, if any.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ExtensionError::UnexpectedState(_) => Some("UNEXPECTED_STATE"),
            ExtensionError::WrongMasterPassword => Some("WRONG_MASTER_PASSWORD"),
            ExtensionError::UnknownMethod(_) => Some("UNKNOWN_METHOD"),
            ExtensionError::BadArguments { .. } => Some("BAD_ARGUMENTS"),
            ExtensionError::Browser(_)
            | ExtensionError::Core(_)
            | ExtensionError::Serialization(_)
            | ExtensionError::BackgroundGone => None,
        }
    }

    /// Error name used in the `name: message` wire serialization.
    pub fn name(&self) -> &'static str {
        match self {
            ExtensionError::UnexpectedState(_) => "UnexpectedStateError",
            ExtensionError::WrongMasterPassword => "WrongMasterPasswordError",
            ExtensionError::UnknownMethod(_) => "UnknownMethodError",
            ExtensionError::BadArguments { .. } => "BadArgumentsError",
            ExtensionError::Browser(_) => "BrowserError",
            ExtensionError::Core(_) => "CoreError",
            ExtensionError::Serialization(_) => "SerializationError",
            ExtensionError::BackgroundGone => "BackgroundGoneError",
        }
    }
}

impl From<CoreError> for ExtensionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::WrongMasterPassword => ExtensionError::WrongMasterPassword,
            other => ExtensionError::Core(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            ExtensionError::WrongMasterPassword.code(),
            Some("WRONG_MASTER_PASSWORD")
        );
        assert_eq!(
            ExtensionError::UnexpectedState(StateKind::Empty).code(),
            Some("UNEXPECTED_STATE")
        );
        assert_eq!(
            ExtensionError::UnknownMethod("nope".to_string()).code(),
            Some("UNKNOWN_METHOD")
        );
        assert_eq!(
            ExtensionError::BadArguments {
                method: "unlock".to_string(),
                index: 0
            }
            .code(),
            Some("BAD_ARGUMENTS")
        );
    }

    #[test]
    fn test_opaque_errors_have_no_code() {
        assert_eq!(ExtensionError::BackgroundGone.code(), None);
        assert_eq!(
            ExtensionError::Core(CoreError::Remote("offline".to_string())).code(),
            None
        );
    }

    #[test]
    fn test_wrong_master_password_folds_from_core() {
        let err = ExtensionError::from(CoreError::WrongMasterPassword);
        assert!(matches!(err, ExtensionError::WrongMasterPassword));
    }

    #[test]
    fn test_display_names_state() {
        let err = ExtensionError::UnexpectedState(StateKind::Empty);
        assert_eq!(err.to_string(), "Unexpected state: empty");
        assert_eq!(err.name(), "UnexpectedStateError");
    }
}

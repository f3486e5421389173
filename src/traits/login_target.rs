//! Seam over the page's detected login form.
//!
//! The actual form detection is a third-party library; this trait is the
//! stable capability surface the filler exposes over whatever it found.

use thiserror::Error;

use crate::models::{AvailableFields, LoginField};

/// Fill and submit failures. Page-side only, never serialized across
/// the bridge; the UI reports "Failed to fill" or "Not on sign in
/// page".
#[derive(Debug, Clone, Error)]
pub enum FillError {
    /// No login form was detected on the current page.
    #[error("No login target on this page")]
    NoTarget,

    /// The target does not expose the requested field.
    #[error("Field is not available: {0:?}")]
    FieldUnavailable(LoginField),

    /// Form submission failed.
    #[error("Submit failed: {0}")]
    SubmitFailed(String),
}

/// A detected login form on the current page.
pub trait LoginTarget: Send {
    /// Which inputs the form exposes.
    fn available_fields(&self) -> AvailableFields;

    /// Fill a single field without submitting.
    fn fill_field(&mut self, field: LoginField, value: &str) -> Result<(), FillError>;

    /// Current value of the username field, if the user typed one.
    fn filled_handle(&self) -> Option<String>;

    /// Trigger form submission.
    fn submit(&mut self) -> Result<(), FillError>;
}

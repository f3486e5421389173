//! Login-target adapter.
//!
//! Wraps whatever login form the current page exposes (or none) behind a
//! stable capability surface, and forwards typed-credential observations
//! to the background as fire-and-forget capture events. Also hosts the
//! page-global function names and the script builders the popup injects.

use serde_json::json;
use tokio::sync::mpsc;
use tracing::debug;

use crate::models::{AvailableFields, LoginField};
use crate::traits::{FillError, LoginTarget};

/// Page-global attached by the filler layer: `() -> bool`.
pub const PAGE_FN_HAS_LOGIN: &str = "__ctrlpanel_extension_has_login__";
/// Page-global: `() -> { handle: bool, password: bool }`.
pub const PAGE_FN_AVAILABLE_FIELDS: &str = "__ctrlpanel_extension_available_fields__";
/// Page-global: `(field, value) -> void`.
pub const PAGE_FN_FILL_FIELD: &str = "__ctrlpanel_extension_fill_field__";
/// Page-global: `() -> string | null`.
pub const PAGE_FN_GET_FILLED_HANDLE: &str = "__ctrlpanel_extension_get_filled_handle__";
/// Page-global: `(handle, password, submit) -> void`.
pub const PAGE_FN_PERFORM_LOGIN: &str = "__ctrlpanel_extension_perform_login__";

/// A typed credential observed on a page, offered to the background for
/// later import as an inbox entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEvent {
    pub hostname: String,
    pub handle: String,
}

/// Capability surface over the page's detected login form.
pub struct Filler {
    hostname: String,
    target: Option<Box<dyn LoginTarget>>,
    captures: Option<mpsc::UnboundedSender<CaptureEvent>>,
}

impl Filler {
    pub fn new(hostname: impl Into<String>, target: Option<Box<dyn LoginTarget>>) -> Self {
        Self {
            hostname: hostname.into(),
            target,
            captures: None,
        }
    }

    /// Wire the capture side-channel to the background.
    pub fn with_capture_channel(mut self, captures: mpsc::UnboundedSender<CaptureEvent>) -> Self {
        self.captures = Some(captures);
        self
    }

    /// True iff a login form was detected on the current page.
    pub fn has_login_target(&self) -> bool {
        self.target.is_some()
    }

    /// Which inputs the detected form exposes; both false when no form
    /// was detected.
    pub fn available_fields(&self) -> AvailableFields {
        self.target
            .as_ref()
            .map(|target| target.available_fields())
            .unwrap_or_default()
    }

    /// Fill a single field without submitting.
    pub fn fill_field(&mut self, field: LoginField, value: &str) -> Result<(), FillError> {
        let target = self.target.as_mut().ok_or(FillError::NoTarget)?;
        target.fill_field(field, value)
    }

    /// Current value of the username field, if any.
    pub fn filled_handle(&self) -> Option<String> {
        self.target.as_ref().and_then(|target| target.filled_handle())
    }

    /// Fill the available fields and, when `submit` is set, trigger form
    /// submission; otherwise the form is left populated for a manual
    /// submit.
    pub fn perform_login(
        &mut self,
        handle: &str,
        password: &str,
        submit: bool,
    ) -> Result<(), FillError> {
        let target = self.target.as_mut().ok_or(FillError::NoTarget)?;

        let fields = target.available_fields();
        if fields.handle {
            target.fill_field(LoginField::Handle, handle)?;
        }
        if fields.password {
            target.fill_field(LoginField::Password, password)?;
        }
        if submit {
            target.submit()?;
        }

        Ok(())
    }

    /// The page reported a value change on the username field. Offers
    /// the typed handle to the background; failures are intentionally
    /// unobserved.
    pub fn notify_handle_change(&self) {
        self.offer_capture();
    }

    /// The page reported a submit event. Same capture semantics as a
    /// handle change.
    pub fn notify_submit(&self) {
        self.offer_capture();
    }

    fn offer_capture(&self) {
        let Some(captures) = &self.captures else {
            return;
        };
        let Some(handle) = self.filled_handle() else {
            return;
        };
        if handle.is_empty() {
            return;
        }

        debug!(hostname = %self.hostname, "offering typed handle to background");
        let _ = captures.send(CaptureEvent {
            hostname: self.hostname.clone(),
            handle,
        });
    }
}

/// Snippet checking for a detected login form.
pub fn has_login_script() -> String {
    format!("window.{PAGE_FN_HAS_LOGIN}()")
}

/// Snippet reading the detected form's available fields.
pub fn available_fields_script() -> String {
    format!("window.{PAGE_FN_AVAILABLE_FIELDS}()")
}

/// Snippet filling one field, with JSON-escaped arguments.
pub fn fill_field_script(field: LoginField, value: &str) -> String {
    format!(
        "window.{PAGE_FN_FILL_FIELD}({}, {})",
        json!(field),
        json!(value)
    )
}

/// Snippet reading the typed username value.
pub fn get_filled_handle_script() -> String {
    format!("window.{PAGE_FN_GET_FILLED_HANDLE}()")
}

/// Snippet filling both fields and optionally submitting, with
/// JSON-escaped arguments.
pub fn perform_login_script(handle: &str, password: &str, submit: bool) -> String {
    format!(
        "window.{PAGE_FN_PERFORM_LOGIN}({}, {}, {})",
        json!(handle),
        json!(password),
        json!(submit)
    )
}

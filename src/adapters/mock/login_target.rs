//! Scripted login target for testing the filler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::{AvailableFields, LoginField};
use crate::traits::{FillError, LoginTarget};

#[derive(Debug)]
struct TargetData {
    fields: AvailableFields,
    filled: HashMap<LoginField, String>,
    submitted: bool,
    submit_should_fail: bool,
}

/// Scripted [`LoginTarget`]. Clones share state, so a test can keep a
/// handle for assertions after boxing one into a
/// [`crate::filler::Filler`].
#[derive(Debug, Clone)]
pub struct MockLoginTarget {
    inner: Arc<Mutex<TargetData>>,
}

impl Default for MockLoginTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLoginTarget {
    /// A target exposing both username and password fields.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TargetData {
                fields: AvailableFields {
                    handle: true,
                    password: true,
                },
                filled: HashMap::new(),
                submitted: false,
                submit_should_fail: false,
            })),
        }
    }

    /// Restrict which fields the target exposes.
    pub fn with_fields(self, fields: AvailableFields) -> Self {
        self.inner.lock().unwrap().fields = fields;
        self
    }

    /// Pre-fill the username field, as if the user typed it.
    pub fn with_typed_handle(self, handle: impl Into<String>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .filled
            .insert(LoginField::Handle, handle.into());
        self
    }

    /// Configure whether submit should fail.
    pub fn set_submit_should_fail(&self, should_fail: bool) {
        self.inner.lock().unwrap().submit_should_fail = should_fail;
    }

    pub fn filled_value(&self, field: LoginField) -> Option<String> {
        self.inner.lock().unwrap().filled.get(&field).cloned()
    }

    pub fn was_submitted(&self) -> bool {
        self.inner.lock().unwrap().submitted
    }
}

impl LoginTarget for MockLoginTarget {
    fn available_fields(&self) -> AvailableFields {
        self.inner.lock().unwrap().fields
    }

    fn fill_field(&mut self, field: LoginField, value: &str) -> Result<(), FillError> {
        let mut data = self.inner.lock().unwrap();
        let available = match field {
            LoginField::Handle => data.fields.handle,
            LoginField::Password => data.fields.password,
        };
        if !available {
            return Err(FillError::FieldUnavailable(field));
        }
        data.filled.insert(field, value.to_string());
        Ok(())
    }

    fn filled_handle(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .filled
            .get(&LoginField::Handle)
            .cloned()
    }

    fn submit(&mut self) -> Result<(), FillError> {
        let mut data = self.inner.lock().unwrap();
        if data.submit_should_fail {
            return Err(FillError::SubmitFailed("mock failure".to_string()));
        }
        data.submitted = true;
        Ok(())
    }
}

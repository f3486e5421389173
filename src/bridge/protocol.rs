//! Wire format of the bridge.
//!
//! Requests carry a method name plus positional arguments; responses
//! resolve to exactly one of `{ result }` or `{ error }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExtensionError;

/// A bridge request: `{ method, args }`. `args` may be omitted on the
/// wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Request {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

/// Serialized error: display message plus an optional stable code the
/// caller may pattern-match on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A bridge response. Exactly one of the two shapes is sent per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Success { result: Value },
    Failure { error: ErrorBody },
}

impl Response {
    pub fn success(result: Value) -> Self {
        Response::Success { result }
    }

    pub fn failure(err: &ExtensionError) -> Self {
        Response::Failure {
            error: ErrorBody {
                message: format!("{}: {}", err.name(), err),
                code: err.code().map(str::to_string),
            },
        }
    }

    pub fn into_result(self) -> Result<Value, ErrorBody> {
        match self {
            Response::Success { result } => Ok(result),
            Response::Failure { error } => Err(error),
        }
    }
}

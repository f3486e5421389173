//! Typed client side of the bridge.
//!
//! Wraps a [`MessageTransport`] with one method per catalog entry.
//! Failures come back as [`RemoteError`]; only its `code` is meant for
//! programmatic matching, the message is for display.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::bridge::protocol::{Request, Response};
use crate::models::AccountResult;
use crate::traits::{MessageTransport, TransportError};

/// A failure reported across the bridge.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    pub code: Option<String>,
}

impl RemoteError {
    pub fn is_wrong_master_password(&self) -> bool {
        self.code.as_deref() == Some("WRONG_MASTER_PASSWORD")
    }
}

impl From<TransportError> for RemoteError {
    fn from(err: TransportError) -> Self {
        Self {
            message: err.to_string(),
            code: None,
        }
    }
}

/// Client for the background vault over some message transport.
#[derive(Debug)]
pub struct ExtensionClient<T> {
    transport: Arc<T>,
}

impl<T> Clone for ExtensionClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: MessageTransport> ExtensionClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    async fn remote_call<R: DeserializeOwned>(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> Result<R, RemoteError> {
        let response = self.transport.send(Request::new(method, args)).await?;

        match response {
            Response::Success { result } => {
                serde_json::from_value(result).map_err(|e| RemoteError {
                    message: format!("Malformed response for {method}: {e}"),
                    code: None,
                })
            }
            Response::Failure { error } => Err(RemoteError {
                message: error.message,
                code: error.code,
            }),
        }
    }

    pub async fn need_credentials(&self) -> Result<bool, RemoteError> {
        self.remote_call("needCredentials", vec![]).await
    }

    pub async fn need_master_password(&self) -> Result<bool, RemoteError> {
        self.remote_call("needMasterPassword", vec![]).await
    }

    pub async fn unlock(&self, master_password: &str) -> Result<(), RemoteError> {
        self.remote_call("unlock", vec![json!(master_password)]).await
    }

    pub async fn sync(&self) -> Result<(), RemoteError> {
        self.remote_call("sync", vec![]).await
    }

    pub async fn get_accounts_for_hostname(
        &self,
        hostname: &str,
    ) -> Result<Vec<AccountResult>, RemoteError> {
        self.remote_call("getAccountsForHostname", vec![json!(hostname)])
            .await
    }

    pub async fn seed(
        &self,
        handle: &str,
        secret_key: &str,
        master_password: &str,
    ) -> Result<(), RemoteError> {
        self.remote_call(
            "seed",
            vec![json!(handle), json!(secret_key), json!(master_password)],
        )
        .await
    }

    pub async fn signal_activity(&self) -> Result<(), RemoteError> {
        self.remote_call("signalActivity", vec![]).await
    }

    pub async fn lock(&self) -> Result<(), RemoteError> {
        self.remote_call("lock", vec![]).await
    }

    pub async fn create_account(&self, handle: &str, hostname: &str) -> Result<(), RemoteError> {
        self.remote_call("createAccount", vec![json!(handle), json!(hostname)])
            .await
    }

    pub async fn import_inbox_entry(
        &self,
        id: &str,
        handle: &str,
        hostname: &str,
    ) -> Result<(), RemoteError> {
        self.remote_call(
            "importInboxEntry",
            vec![json!(id), json!(handle), json!(hostname)],
        )
        .await
    }
}

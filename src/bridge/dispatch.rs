//! Background-side method dispatcher.
//!
//! Maps the wire method catalog onto vault actor calls. Unknown methods
//! and malformed positional arguments fail that call only; every error
//! is serialized to `{ message, code? }`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::bridge::protocol::{Request, Response};
use crate::error::ExtensionError;
use crate::vault::VaultHandle;

/// Dispatches bridge requests to the vault actor.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    vault: VaultHandle,
}

impl Dispatcher {
    pub fn new(vault: VaultHandle) -> Self {
        Self { vault }
    }

    /// Handle one request, producing exactly one response.
    pub async fn dispatch(&self, request: Request) -> Response {
        match self.call(&request).await {
            Ok(result) => Response::success(result),
            Err(err) => {
                debug!(method = %request.method, error = %err, "bridge call failed");
                Response::failure(&err)
            }
        }
    }

    async fn call(&self, request: &Request) -> Result<Value, ExtensionError> {
        match request.method.as_str() {
            "needCredentials" => self.vault.need_credentials().await.map(Value::Bool),
            "needMasterPassword" => self.vault.need_master_password().await.map(Value::Bool),
            "unlock" => {
                let master_password = arg(request, 0)?;
                self.vault.unlock(master_password).await.map(|()| Value::Null)
            }
            "sync" => self.vault.sync().await.map(|()| Value::Null),
            "getAccountsForHostname" => {
                let hostname: String = arg(request, 0)?;
                let accounts = self.vault.accounts_for_hostname(hostname).await?;
                serde_json::to_value(accounts)
                    .map_err(|e| ExtensionError::Serialization(e.to_string()))
            }
            "seed" => {
                let handle = arg(request, 0)?;
                let secret_key = arg(request, 1)?;
                let master_password = arg(request, 2)?;
                self.vault
                    .seed(handle, secret_key, master_password)
                    .await
                    .map(|()| Value::Null)
            }
            "signalActivity" => self.vault.signal_activity().await.map(|()| Value::Null),
            "lock" => self.vault.lock().await.map(|()| Value::Null),
            "importInboxEntry" => {
                let id = arg(request, 0)?;
                let handle = arg(request, 1)?;
                let hostname = arg(request, 2)?;
                self.vault
                    .import_inbox_entry(id, handle, hostname)
                    .await
                    .map(|()| Value::Null)
            }
            "createAccount" => {
                let handle = arg(request, 0)?;
                let hostname = arg(request, 1)?;
                self.vault
                    .create_account(handle, hostname)
                    .await
                    .map(|()| Value::Null)
            }
            other => Err(ExtensionError::UnknownMethod(other.to_string())),
        }
    }
}

fn arg<T: DeserializeOwned>(request: &Request, index: usize) -> Result<T, ExtensionError> {
    request
        .args
        .get(index)
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
        .ok_or_else(|| ExtensionError::BadArguments {
            method: request.method.clone(),
            index,
        })
}

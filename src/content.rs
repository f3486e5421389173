//! Window-scoped content-script bridge.
//!
//! The hosting web application talks to the extension by posting
//! messages on its own window. The filter is security-relevant: a
//! message is handled only when its source is the same window AND its
//! origin equals both the window's own origin and the configured trusted
//! application origin. Both origin comparisons are kept separate on
//! purpose; do not collapse them into one check.

use serde_json::{json, Value};
use tracing::debug;

use crate::bridge::ExtensionClient;
use crate::traits::MessageTransport;

/// Prefix of every window message method the extension accepts.
pub const MESSAGE_PREFIX: &str = "ctrlpanel-extension-";

/// Where a window message came from, relative to the receiving window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    SameWindow,
    OtherWindow,
}

/// A message received on the page's window.
#[derive(Debug, Clone)]
pub struct WindowMessage {
    pub source: MessageSource,
    pub origin: String,
    pub data: Value,
}

/// Content-script side of the window bridge.
pub struct ContentBridge<T> {
    client: ExtensionClient<T>,
    window_origin: String,
    app_origin: String,
}

impl<T: MessageTransport + 'static> ContentBridge<T> {
    pub fn new(
        client: ExtensionClient<T>,
        window_origin: impl Into<String>,
        app_origin: impl Into<String>,
    ) -> Self {
        Self {
            client,
            window_origin: window_origin.into(),
            app_origin: app_origin.into(),
        }
    }

    /// Handle one window message. Returns the reply to post back, if
    /// any; messages failing the source/origin filter are silently
    /// ignored.
    pub fn handle_message(&self, message: &WindowMessage) -> Option<Value> {
        if message.source != MessageSource::SameWindow {
            return None;
        }
        if message.origin != self.app_origin {
            return None;
        }
        if message.origin != self.window_origin {
            return None;
        }

        let method = message.data.get("method")?.as_str()?;
        let name = method.strip_prefix(MESSAGE_PREFIX)?;
        let args = message.data.get("args").cloned().unwrap_or(json!([]));

        match name {
            "seed" => {
                let Some([handle, secret_key, master_password]) = string_args(&args) else {
                    debug!("malformed seed message, ignoring");
                    return None;
                };
                // Fire-and-forget: failures are intentionally unobserved.
                let client = self.client.clone();
                tokio::spawn(async move {
                    let _ = client.seed(&handle, &secret_key, &master_password).await;
                });
                None
            }
            "signal-activity" => {
                let client = self.client.clone();
                tokio::spawn(async move {
                    let _ = client.signal_activity().await;
                });
                None
            }
            "lock" => {
                let client = self.client.clone();
                tokio::spawn(async move {
                    let _ = client.lock().await;
                });
                None
            }
            "ping" => Some(json!("pong")),
            other => {
                debug!(method = other, "unknown window message, ignoring");
                None
            }
        }
    }
}

fn string_args<const N: usize>(args: &Value) -> Option<[String; N]> {
    let array = args.as_array()?;
    if array.len() < N {
        return None;
    }

    let mut out = Vec::with_capacity(N);
    for value in &array[..N] {
        out.push(value.as_str()?.to_string());
    }
    out.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_args_extracts_fixed_arity() {
        let args = json!(["a", "b", "c"]);
        let [a, b, c] = string_args::<3>(&args).unwrap();
        assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("a", "b", "c"));

        assert!(string_args::<3>(&json!(["a", "b"])).is_none());
        assert!(string_args::<3>(&json!(["a", "b", 3])).is_none());
        assert!(string_args::<3>(&json!("nope")).is_none());
    }
}

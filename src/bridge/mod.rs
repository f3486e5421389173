//! Remote procedure bridge between untrusted contexts and the
//! background process: wire types, the method dispatcher, and the typed
//! client.

mod client;
mod dispatch;
mod protocol;

pub use client::{ExtensionClient, RemoteError};
pub use dispatch::Dispatcher;
pub use protocol::{ErrorBody, Request, Response};

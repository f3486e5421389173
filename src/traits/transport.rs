//! Message channel seam between untrusted contexts and the background
//! process.
//!
//! In the browser this is runtime messaging; in tests and headless use
//! it is [`crate::adapters::LocalTransport`] wired straight to the
//! dispatcher.

use async_trait::async_trait;
use thiserror::Error;

use crate::bridge::{Request, Response};

/// Transport failures, distinct from errors the receiver itself
/// returned.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Transport closed")]
    Closed,

    #[error("Transport error: {0}")]
    Other(String),
}

/// Request/response channel to the background dispatcher.
///
/// The transport guarantees at most one response per request.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

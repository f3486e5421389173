//! In-process message transport.

use async_trait::async_trait;

use crate::bridge::{Dispatcher, Request, Response};
use crate::traits::{MessageTransport, TransportError};

/// Transport that hands requests straight to a background dispatcher in
/// the same process. Stands in for the browser's runtime messaging in
/// tests and headless use.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    dispatcher: Dispatcher,
}

impl LocalTransport {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl MessageTransport for LocalTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        Ok(self.dispatcher.dispatch(request).await)
    }
}

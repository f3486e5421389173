//! Concrete bindings for the trait seams.
//!
//! `LocalTransport` wires a client straight to the dispatcher inside one
//! process; the `mock` module holds scripted implementations for tests.

mod local_transport;
pub mod mock;

pub use local_transport::LocalTransport;

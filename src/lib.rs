//! Ctrlpanel browser-extension core.
//!
//! Background vault lifecycle, the message bridge between untrusted
//! contexts and the background process, hostname matching, and the
//! login-form filler. Vault cryptography, storage and sync live in the
//! external core engine behind [`core::VaultCore`]; browser APIs live
//! behind the seams in [`traits`].

pub mod adapters;
pub mod bridge;
pub mod config;
pub mod content;
pub mod core;
pub mod error;
pub mod filler;
pub mod hostname;
pub mod models;
pub mod popup;
pub mod traits;
pub mod vault;

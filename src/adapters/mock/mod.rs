//! Scripted adapters for testing without a browser or a real vault
//! core.

mod browser;
mod core;
mod login_target;

pub use browser::MockBrowser;
pub use core::InMemoryCore;
pub use login_target::MockLoginTarget;

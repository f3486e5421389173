//! Trait seams for everything the extension borrows from its host:
//! browser tab automation, the detected login form, and the runtime
//! message channel. Production code binds these to the real browser
//! APIs; tests use the adapters in [`crate::adapters::mock`].

mod browser;
mod login_target;
mod transport;

pub use browser::{BrowserError, BrowserTabs, TabId, TabInfo};
pub use login_target::{FillError, LoginTarget};
pub use transport::{MessageTransport, TransportError};

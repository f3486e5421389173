//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use ctrlpanel_extension::adapters::mock::{InMemoryCore, MockBrowser};
use ctrlpanel_extension::adapters::LocalTransport;
use ctrlpanel_extension::bridge::{Dispatcher, ExtensionClient};
use ctrlpanel_extension::config::ExtensionConfig;
use ctrlpanel_extension::models::{Account, InboxEntry};
use ctrlpanel_extension::vault::{spawn, VaultHandle};

/// Route tracing output through the test harness; `RUST_LOG` filters
/// apply. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const HANDLE: &str = "linus@example.com";
pub const MASTER_PASSWORD: &str = "correct horse battery staple";
pub const SECRET_KEY: &str = "secret-key";
pub const TOKEN: &str = "sync-token";

/// Config pointing at a test app origin.
pub fn test_config() -> ExtensionConfig {
    ExtensionConfig::default()
        .with_api_host("https://api.example.test")
        .with_app_host("https://app.example.test")
}

/// A core with one registered user, a sync token, one saved account on
/// `login.example.com` and one inbox entry on `news.ycombinator.com`.
pub fn seeded_core() -> InMemoryCore {
    InMemoryCore::new()
        .with_user(HANDLE, SECRET_KEY, MASTER_PASSWORD)
        .with_token(TOKEN, HANDLE)
        .with_account(
            HANDLE,
            Account {
                id: "acc-1".to_string(),
                hostname: "login.example.com".to_string(),
                handle: HANDLE.to_string(),
                password: "hunter2".to_string(),
            },
        )
        .with_inbox_entry(
            HANDLE,
            InboxEntry {
                id: "inbox-1".to_string(),
                email: "linus@ycombinator.com".to_string(),
                hostname: "news.ycombinator.com".to_string(),
            },
        )
}

/// Spawn the background actor with the given adapters.
pub fn spawn_vault(
    config: ExtensionConfig,
    core: InMemoryCore,
    browser: MockBrowser,
) -> VaultHandle {
    spawn(config, core, browser)
}

/// A typed client wired to the vault over the in-process transport.
pub fn client_for(vault: VaultHandle) -> ExtensionClient<LocalTransport> {
    ExtensionClient::new(LocalTransport::new(Dispatcher::new(vault)))
}

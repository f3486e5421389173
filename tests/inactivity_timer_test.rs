//! Inactivity auto-lock, driven with paused virtual time.

mod common;

use std::time::Duration;

use common::*;
use ctrlpanel_extension::adapters::mock::MockBrowser;
use ctrlpanel_extension::vault::{StateKind, VaultHandle};

/// Let the actor observe an expired timer before asserting.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn unlocked_vault(timeout: Duration) -> VaultHandle {
    let config = test_config().with_lock_timeout(timeout);
    let vault = spawn_vault(
        config,
        seeded_core(),
        MockBrowser::new().with_sync_token(TOKEN),
    );
    vault.need_credentials().await.unwrap();
    vault.unlock(MASTER_PASSWORD.to_string()).await.unwrap();
    vault
}

#[tokio::test(start_paused = true)]
async fn test_vault_locks_after_the_timeout() {
    let vault = unlocked_vault(Duration::from_secs(300)).await;
    assert_eq!(vault.state_kind().await.unwrap(), StateKind::Unlocked);

    tokio::time::advance(Duration::from_secs(301)).await;
    settle().await;

    assert_eq!(vault.state_kind().await.unwrap(), StateKind::Locked);
}

#[tokio::test(start_paused = true)]
async fn test_activity_pushes_the_deadline_out() {
    let vault = unlocked_vault(Duration::from_secs(300)).await;

    tokio::time::advance(Duration::from_secs(240)).await;
    vault.signal_activity().await.unwrap();

    // Past the original deadline but within the extended one.
    tokio::time::advance(Duration::from_secs(240)).await;
    settle().await;
    assert_eq!(vault.state_kind().await.unwrap(), StateKind::Unlocked);

    tokio::time::advance(Duration::from_secs(61)).await;
    settle().await;
    assert_eq!(vault.state_kind().await.unwrap(), StateKind::Locked);
}

#[tokio::test(start_paused = true)]
async fn test_bridge_calls_count_as_activity() {
    let vault = unlocked_vault(Duration::from_secs(300)).await;
    vault.sync().await.unwrap();

    tokio::time::advance(Duration::from_secs(240)).await;
    vault.sync().await.unwrap();

    tokio::time::advance(Duration::from_secs(240)).await;
    settle().await;
    assert_eq!(vault.state_kind().await.unwrap(), StateKind::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_lock_disarms_the_timer() {
    let vault = unlocked_vault(Duration::from_secs(300)).await;
    vault.lock().await.unwrap();
    assert_eq!(vault.state_kind().await.unwrap(), StateKind::Locked);

    // A long stretch of silence causes no further transitions and the
    // actor stays responsive.
    tokio::time::advance(Duration::from_secs(3600)).await;
    settle().await;
    assert_eq!(vault.state_kind().await.unwrap(), StateKind::Locked);
    assert!(vault.need_master_password().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_from_connected_drops_to_locked() {
    let vault = unlocked_vault(Duration::from_secs(300)).await;
    vault.sync().await.unwrap();
    assert_eq!(vault.state_kind().await.unwrap(), StateKind::Connected);

    tokio::time::advance(Duration::from_secs(301)).await;
    settle().await;

    assert_eq!(vault.state_kind().await.unwrap(), StateKind::Locked);
    // Unlocking again works without re-reading the token.
    vault.unlock(MASTER_PASSWORD.to_string()).await.unwrap();
    assert_eq!(vault.state_kind().await.unwrap(), StateKind::Unlocked);
}

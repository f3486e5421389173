//! Popup controller flows over a live vault actor and scripted browser.

mod common;

use common::*;
use ctrlpanel_extension::adapters::mock::MockBrowser;
use ctrlpanel_extension::adapters::LocalTransport;
use ctrlpanel_extension::models::AccountResult;
use ctrlpanel_extension::popup::{
    PopupController, PopupScreen, MSG_FAILED_TO_FILL, MSG_LOG_IN, MSG_NOT_ON_SIGN_IN_PAGE,
    MSG_NO_ACCOUNT_FOUND, MSG_WRONG_MASTER_PASSWORD,
};
use serde_json::json;

fn popup(browser: MockBrowser) -> PopupController<LocalTransport, MockBrowser> {
    let vault = spawn_vault(test_config(), seeded_core(), browser.clone());
    PopupController::new(client_for(vault), browser, test_config())
}

fn error_screen(message: &str) -> PopupScreen {
    PopupScreen::Error {
        message: message.to_string(),
    }
}

#[tokio::test]
async fn test_open_unlock_and_fill_happy_path() {
    let browser = MockBrowser::new()
        .with_sync_token(TOKEN)
        .with_active_tab(7, "https://login.example.com/signin");
    browser.push_script_result(json!(true)); // login form detected
    let mut popup = popup(browser.clone());

    popup.on_open().await;
    assert_eq!(
        popup.screen(),
        &PopupScreen::Locked {
            hostname: "example.com".to_string(),
            error_message: None,
        }
    );

    popup.on_unlock_submit(MASTER_PASSWORD).await;
    let PopupScreen::Accounts { hostname, accounts } = popup.screen().clone() else {
        panic!("expected the accounts screen, got {:?}", popup.screen());
    };
    assert_eq!(hostname, "example.com");
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].fill_handle(), HANDLE);

    popup.fill(&accounts[0]).await;
    let scripts = browser.executed_scripts();
    let fill_script = &scripts.last().unwrap().1;
    assert!(fill_script.contains("__ctrlpanel_extension_perform_login__"));
    assert!(fill_script.contains("\"hunter2\""));
    assert!(fill_script.ends_with("true)"), "auto-submit is on by default");
}

#[tokio::test]
async fn test_wrong_master_password_returns_to_locked_with_message() {
    let browser = MockBrowser::new()
        .with_sync_token(TOKEN)
        .with_active_tab(7, "https://login.example.com/signin");
    browser.push_script_result(json!(true));
    let mut popup = popup(browser);

    popup.on_open().await;
    popup.on_unlock_submit("wrong").await;
    assert_eq!(
        popup.screen(),
        &PopupScreen::Locked {
            hostname: "example.com".to_string(),
            error_message: Some(MSG_WRONG_MASTER_PASSWORD.to_string()),
        }
    );

    // Retrying with the right password still works.
    popup.on_unlock_submit(MASTER_PASSWORD).await;
    assert!(matches!(popup.screen(), PopupScreen::Accounts { .. }));
}

#[tokio::test]
async fn test_logged_out_user_is_told_to_log_in() {
    // No sync token anywhere.
    let browser = MockBrowser::new().with_active_tab(7, "https://login.example.com/signin");
    let mut popup = popup(browser);

    popup.on_open().await;
    assert_eq!(popup.screen(), &error_screen(MSG_LOG_IN));
}

#[tokio::test]
async fn test_browser_pages_are_not_sign_in_pages() {
    let browser = MockBrowser::new()
        .with_sync_token(TOKEN)
        .with_active_tab(7, "about:newtab");
    let mut popup = popup(browser);

    popup.on_open().await;
    assert_eq!(popup.screen(), &error_screen(MSG_NOT_ON_SIGN_IN_PAGE));
}

#[tokio::test]
async fn test_page_without_login_form_is_rejected() {
    let browser = MockBrowser::new()
        .with_sync_token(TOKEN)
        .with_active_tab(7, "https://example.com/");
    browser.push_script_result(json!(false));
    let mut popup = popup(browser.clone());

    popup.on_open().await;
    assert_eq!(popup.screen(), &error_screen(MSG_NOT_ON_SIGN_IN_PAGE));
    // The filler was injected before the check ran.
    assert_eq!(browser.injected_files()[0].1, "/filler.js");
}

#[tokio::test]
async fn test_unmatched_hostname_reports_no_account() {
    let browser = MockBrowser::new()
        .with_sync_token(TOKEN)
        .with_active_tab(7, "https://unknown.example.net/login");
    browser.push_script_result(json!(true));
    let mut popup = popup(browser);

    popup.on_open().await;
    popup.on_unlock_submit(MASTER_PASSWORD).await;
    assert_eq!(popup.screen(), &error_screen(MSG_NO_ACCOUNT_FOUND));
}

#[tokio::test]
async fn test_already_unlocked_vault_skips_the_password_prompt() {
    let browser = MockBrowser::new()
        .with_sync_token(TOKEN)
        .with_active_tab(7, "https://auth.example.com/signin");
    let vault = spawn_vault(test_config(), seeded_core(), browser.clone());
    vault.need_credentials().await.unwrap();
    vault.unlock(MASTER_PASSWORD.to_string()).await.unwrap();

    browser.push_script_result(json!(true));
    let mut popup = PopupController::new(client_for(vault), browser.clone(), test_config());

    popup.on_open().await;
    let PopupScreen::Accounts { hostname, accounts } = popup.screen() else {
        panic!("expected the accounts screen, got {:?}", popup.screen());
    };
    // One generic prefix stripped for display.
    assert_eq!(hostname, "example.com");
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn test_passwordless_results_fill_the_handle_only() {
    let browser = MockBrowser::new()
        .with_sync_token(TOKEN)
        .with_active_tab(7, "https://news.ycombinator.com/login");
    browser.push_script_result(json!(true));
    let mut popup = popup(browser.clone());

    popup.on_open().await;
    popup.on_unlock_submit(MASTER_PASSWORD).await;
    let PopupScreen::Accounts { accounts, .. } = popup.screen().clone() else {
        panic!("expected the accounts screen, got {:?}", popup.screen());
    };
    assert!(matches!(accounts[0], AccountResult::Inbox { .. }));

    popup.fill(&accounts[0]).await;
    let scripts = browser.executed_scripts();
    let fill_script = &scripts.last().unwrap().1;
    assert!(fill_script.contains("__ctrlpanel_extension_fill_field__"));
    assert!(fill_script.contains("\"linus@ycombinator.com\""));
}

#[tokio::test]
async fn test_fill_failure_shows_the_generic_error() {
    let browser = MockBrowser::new()
        .with_sync_token(TOKEN)
        .with_active_tab(7, "https://login.example.com/signin");
    browser.push_script_result(json!(true));
    let mut popup = popup(browser.clone());

    popup.on_open().await;
    popup.on_unlock_submit(MASTER_PASSWORD).await;
    let PopupScreen::Accounts { accounts, .. } = popup.screen().clone() else {
        panic!("expected the accounts screen, got {:?}", popup.screen());
    };

    browser.set_execute_should_fail(true);
    popup.fill(&accounts[0]).await;
    assert_eq!(popup.screen(), &error_screen(MSG_FAILED_TO_FILL));
}

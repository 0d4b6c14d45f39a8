//! Common test utilities shared across integration tests.
#![allow(dead_code)]

use roguedb_client::ServiceAccount;

/// PKCS#8 RSA private key used to sign test tokens.
pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/test_rsa.pem");
/// Public half of [`TEST_PRIVATE_KEY`].
pub const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/test_rsa_pub.pem");
/// P-256 key; valid PEM but not an RSA key.
pub const TEST_EC_KEY: &str = include_str!("../fixtures/test_ec.pem");

pub const TEST_EMAIL: &str = "svc@proj.iam.gserviceaccount.com";
pub const TEST_KEY_ID: &str = "0123456789abcdef";

/// Initialize test tracing (call once at the beginning of tests).
///
/// Subsequent calls are safe and will be ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("roguedb_client=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// JSON descriptor in the layout delivered with a purchase.
pub fn service_account_json() -> String {
    serde_json::json!({
        "type": "service_account",
        "project_id": "proj",
        "private_key_id": TEST_KEY_ID,
        "private_key": TEST_PRIVATE_KEY,
        "client_email": TEST_EMAIL,
        "client_id": "104514839470558386523",
        "auth_uri": "https://accounts.google.com/o/oauth2/auth",
        "token_uri": "https://oauth2.googleapis.com/token",
    })
    .to_string()
}

pub fn test_account() -> ServiceAccount {
    ServiceAccount::from_json(&service_account_json()).expect("fixture account is valid")
}

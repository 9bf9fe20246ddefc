//! Connection integration tests.
//!
//! Tests session establishment and failure handling.

use pgportal::error::PortalError;
use pgportal::sequence::{run_cursor, CursorPlan};
use pgportal::session::{ConnStatus, PgSession, Session};

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

#[tokio::test]
async fn test_connect_with_valid_credentials() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let session = PgSession::open(&url).await;
    assert_eq!(session.status(), ConnStatus::Ok);
    assert!(session.error_message().is_none());
    session.close().await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_invalid_host() {
    let session = PgSession::open(
        "host=invalid.host.that.does.not.exist.local dbname=testdb user=testuser connect_timeout=5",
    )
    .await;

    assert_eq!(session.status(), ConnStatus::Failed);
    let message = session.error_message().unwrap_or_default().to_lowercase();
    assert!(!message.is_empty(), "Expected a connection error message");
    session.close().await;
}

#[tokio::test(flavor = "current_thread")]
async fn test_unreachable_endpoint_fails_sequence() {
    let session =
        PgSession::open("host=127.0.0.1 port=1 dbname=postgres connect_timeout=5").await;

    let err = run_cursor(session, &CursorPlan::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PortalError::Connection(_)));
    assert!(err.to_string().contains("Connection to database failed"));
}

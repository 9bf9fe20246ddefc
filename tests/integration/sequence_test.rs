//! Cursor sequence integration tests.
//!
//! Runs the full BEGIN / DECLARE / FETCH / CLOSE / END sequence against a
//! live server.

use pgportal::sequence::{run_cursor, CursorPlan};
use pgportal::session::{ConnStatus, PgSession, Session};

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Helper to open a session against the test database.
async fn get_test_session() -> Option<PgSession> {
    let url = get_test_database_url()?;
    let session = PgSession::open(&url).await;
    (session.status() == ConnStatus::Ok).then_some(session)
}

#[tokio::test]
async fn test_fetch_three_rows() {
    let Some(session) = get_test_session().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let plan = CursorPlan::for_query(
        "select * from (values (1, 'alice'), (2, 'bob'), (3, 'carol')) as t(id, name)",
    );
    let output = run_cursor(session, &plan).await.unwrap();

    assert_eq!(
        output,
        concat!(
            "id             name           \n",
            "\n",
            "1              alice          \n",
            "2              bob            \n",
            "3              carol          \n",
        )
    );
}

#[tokio::test]
async fn test_fetch_empty_result_prints_header() {
    let Some(session) = get_test_session().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let plan = CursorPlan::for_query("select 1 as id, 'x'::text as name where false");
    let output = run_cursor(session, &plan).await.unwrap();

    assert_eq!(output, "id             name           \n\n");
}

#[tokio::test]
async fn test_null_fields_print_as_empty() {
    let Some(session) = get_test_session().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let plan = CursorPlan::for_query("select 'a' as x, null::int as y");
    let output = run_cursor(session, &plan).await.unwrap();

    let expected = format!("{:<15}{:<15}", "a", "");
    assert_eq!(output.lines().nth(2), Some(expected.as_str()));
}

#[tokio::test]
async fn test_default_plan_lists_databases() {
    let Some(session) = get_test_session().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let output = run_cursor(session, &CursorPlan::default()).await.unwrap();
    let mut lines = output.lines();

    let header = lines.next().unwrap();
    assert!(header.starts_with("oid") || header.starts_with("datname"));
    assert_eq!(lines.next(), Some(""));
    assert!(lines.any(|line| line.contains("template1")));
}

#[tokio::test]
async fn test_repeated_runs_print_identical_output() {
    let Some(first_session) = get_test_session().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let Some(second_session) = get_test_session().await else {
        return;
    };

    let plan = CursorPlan::for_query("select datname from pg_database order by datname");
    let first = run_cursor(first_session, &plan).await.unwrap();
    let second = run_cursor(second_session, &plan).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_declare_error_is_reported() {
    let Some(session) = get_test_session().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let plan = CursorPlan::for_query("select * from nonexistent_table_xyz");
    let err = run_cursor(session, &plan).await.unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("DECLARE CURSOR failed"));
    assert!(message.contains("nonexistent_table_xyz"));
}

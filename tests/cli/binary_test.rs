//! End-to-end tests of the pgportal executable.

use super::common::run_pgportal;
use pretty_assertions::assert_eq;

#[test]
fn test_mock_db_prints_table() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_pgportal(dir.path(), &["--mock-db"]);

    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(
        stdout,
        concat!(
            "datname        datdba         encoding       datistemplate  \n",
            "\n",
            "postgres       10             6              f              \n",
            "template1      10             6              t              \n",
            "template0      10             6              t              \n",
        )
    );
    assert_eq!(stderr, "");
}

#[test]
fn test_mock_db_respects_width_flag() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_pgportal(dir.path(), &["--mock-db", "--width", "10"]);

    assert_eq!(code, 0);
    assert_eq!(
        stdout.lines().next(),
        Some("datname   datdba    encoding  datistemplate")
    );
}

#[test]
fn test_width_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[output]\ncolumn_width = 9\n").unwrap();

    let (code, stdout, _) = run_pgportal(dir.path(), &["--mock-db"]);

    assert_eq!(code, 0);
    assert!(stdout.starts_with("datname  datdba   encoding datistemplate"));
}

#[test]
fn test_unreachable_endpoint_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_pgportal(
        dir.path(),
        &["host=127.0.0.1 port=1 dbname=postgres connect_timeout=5"],
    );

    assert_eq!(code, 1);
    assert_eq!(stdout, "");
    assert!(
        stderr.contains("Connection to database failed"),
        "stderr: {stderr}"
    );
}

#[test]
fn test_invalid_connection_option_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_pgportal(dir.path(), &["dbname=postgres nosuchoption=1"]);

    assert_eq!(code, 1);
    assert_eq!(
        stderr.trim_end(),
        "Connection to database failed: invalid connection option \"nosuchoption\""
    );
}

#[test]
fn test_unknown_named_connection_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_pgportal(dir.path(), &["--connection", "staging"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Connection 'staging' not found in config file"));
}

#[test]
fn test_invalid_cursor_name_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_pgportal(dir.path(), &["--mock-db", "--cursor", "1bad"]);

    assert_eq!(code, 1);
    assert_eq!(stdout, "");
    assert!(stderr.contains("Invalid cursor name '1bad'"));
}

#[test]
fn test_invalid_config_file_reports_one_line() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[output]\ncolumn_width = \"wide\"\n").unwrap();

    let (code, stdout, stderr) = run_pgportal(dir.path(), &["--mock-db"]);

    assert_eq!(code, 1);
    assert_eq!(stdout, "");
    assert_eq!(stderr.lines().count(), 1, "stderr: {stderr}");
    assert!(stderr.starts_with("Configuration error: "));
    assert!(stderr.contains("config.toml:2"));
}

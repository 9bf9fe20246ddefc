//! Common test utilities for binary tests.

use std::path::Path;
use std::process::Command;

/// Run pgportal with the given arguments.
///
/// Runs inside `workdir` with `RUST_LOG` cleared and the config file pointed
/// at a path under `workdir`, so neither the developer's environment nor a
/// stray `.env` leaks into the result.
pub fn run_pgportal(workdir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_pgportal"))
        .args(args)
        .current_dir(workdir)
        .env_remove("RUST_LOG")
        .env("PGPORTAL_CONFIG", workdir.join("config.toml"))
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

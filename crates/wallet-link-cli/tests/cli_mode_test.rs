use std::process::Command;

fn demo_config() -> String {
    format!("{}/demos/link.yaml", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn cli_mode_with_config_and_dry_run_works() {
    let binary_path = env!("CARGO_BIN_EXE_wallet-link");

    let output = Command::new(binary_path)
        .arg("--config")
        .arg(demo_config())
        .arg("--session-id")
        .arg("abc123")
        .arg("--dry-run")
        .arg("--log-level")
        .arg("error")
        .output()
        .expect("Failed to start wallet-link binary");

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStdout: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_mode_accepts_page_url() {
    let output = Command::new(env!("CARGO_BIN_EXE_wallet-link"))
        .arg("--config")
        .arg(demo_config())
        .arg("--url")
        .arg("https://link.example.com/?session_id=abc123")
        .arg("--dry-run")
        .arg("--log-level")
        .arg("error")
        .output()
        .expect("Failed to start wallet-link binary");

    assert!(output.status.success());
}

#[test]
fn cli_mode_rejects_missing_config() {
    let output = Command::new(env!("CARGO_BIN_EXE_wallet-link"))
        .arg("--config")
        .arg("/nonexistent/link.yaml")
        .arg("--dry-run")
        .output()
        .expect("Failed to start wallet-link binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("load config"), "stderr: {stderr}");
}

#[test]
fn cli_mode_rejects_conflicting_session_sources() {
    let output = Command::new(env!("CARGO_BIN_EXE_wallet-link"))
        .arg("--config")
        .arg(demo_config())
        .arg("--url")
        .arg("https://link.example.com/?session_id=abc123")
        .arg("--session-id")
        .arg("abc123")
        .arg("--dry-run")
        .output()
        .expect("Failed to start wallet-link binary");

    assert!(!output.status.success());
}

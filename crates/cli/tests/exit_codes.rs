//! Exit-code contract of the `preflight` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config")
}

fn preflight(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_preflight"))
        .arg("--config-dir")
        .arg(config_dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run preflight")
}

fn code(output: &Output) -> i32 {
    output.status.code().expect("exit code")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn allowed_with_default_mode() {
    let out = preflight(&shipped_config(), &["--operation", "square_cache_sync"]);
    assert_eq!(code(&out), 0, "{}", stderr(&out));
    assert!(String::from_utf8_lossy(&out.stdout).contains("LOCAL_STANDARD"));
}

#[test]
fn quiet_prints_nothing_on_success() {
    let out = preflight(
        &shipped_config(),
        &["--operation", "square_cache_sync", "--quiet"],
    );
    assert_eq!(code(&out), 0);
    assert!(out.stdout.is_empty());
}

#[test]
fn insufficient_mode_exits_22() {
    let out = preflight(
        &shipped_config(),
        &["--operation", "browse_photos", "--runtime", "local_cli"],
    );
    assert_eq!(code(&out), 22);
    let err = stderr(&out);
    assert!(err.contains("browse_photos"));
    assert!(err.contains("LOCAL_PRIVILEGED"));
    assert!(err.contains("LOCAL_STANDARD"));
}

#[test]
fn mode_not_allowed_for_runtime_exits_22() {
    let out = preflight(
        &shipped_config(),
        &["--operation", "square_cache_sync", "--mode", "LOCAL_PRIVILEGED"],
    );
    assert_eq!(code(&out), 22);
}

#[test]
fn unknown_operation_exits_22() {
    let out = preflight(
        &shipped_config(),
        &["--operation", "unknown_op", "--mode", "WEB_SAFE"],
    );
    assert_eq!(code(&out), 22);
}

#[test]
fn unknown_runtime_exits_20() {
    let out = preflight(
        &shipped_config(),
        &[
            "--operation",
            "square_cache_sync",
            "--mode",
            "LOCAL_STANDARD",
            "--runtime",
            "ghost_runtime",
        ],
    );
    assert_eq!(code(&out), 20);
    assert!(stderr(&out).contains("ghost_runtime"));
}

#[test]
fn unknown_mode_exits_20() {
    let out = preflight(
        &shipped_config(),
        &["--operation", "square_cache_sync", "--mode", "GOD_MODE"],
    );
    assert_eq!(code(&out), 20);
}

#[test]
fn missing_capability_exits_21_and_names_flag() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("capabilities.toml"),
        r#"
[LOCAL_STANDARD.capabilities]
filesystem_full_access = true
photos_full_access = false
"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("runtimes.toml"),
        r#"
[[runtime]]
id = "local_cli"
default_mode = "LOCAL_STANDARD"
allowed_modes = ["LOCAL_STANDARD"]
"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("operations.toml"),
        r#"
[[operation]]
operation = "export_photos"
required_mode = "LOCAL_STANDARD"
required_capabilities = ["filesystem_full_access", "photos_full_access"]
deny_reason = "Photo export writes library images to disk"
"#,
    )
    .unwrap();

    let out = preflight(dir.path(), &["--operation", "export_photos"]);
    assert_eq!(code(&out), 21);
    let err = stderr(&out);
    assert!(err.contains("[photos_full_access]"), "{err}");
    assert!(!err.contains("[filesystem_full_access"));
}

#[test]
fn missing_config_exits_20() {
    let dir = tempfile::tempdir().unwrap();
    let out = preflight(dir.path(), &["--operation", "square_cache_sync"]);
    assert_eq!(code(&out), 20);
    assert!(stderr(&out).contains("configuration missing"));
}

#[test]
fn invalid_required_mode_exits_20() {
    let dir = tempfile::tempdir().unwrap();
    for file in ["capabilities.toml", "runtimes.toml"] {
        std::fs::copy(shipped_config().join(file), dir.path().join(file)).unwrap();
    }
    std::fs::write(
        dir.path().join("operations.toml"),
        r#"
[[operation]]
operation = "browse_photos"
required_mode = "LOCAL_ROOT"
deny_reason = "broken"
"#,
    )
    .unwrap();

    let out = preflight(dir.path(), &["--operation", "browse_photos"]);
    assert_eq!(code(&out), 20);
    assert!(stderr(&out).contains("configuration invalid"));
}

#[test]
fn check_config_passes_on_shipped_tables() {
    let out = preflight(&shipped_config(), &["--check-config"]);
    assert_eq!(code(&out), 0, "{}", stderr(&out));
}

#[test]
fn list_shows_operations() {
    let out = preflight(&shipped_config(), &["--list"]);
    assert_eq!(code(&out), 0);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("square_cache_sync"));
    assert!(stdout.contains("chrome_js_inject"));
}

#[test]
fn quiet_still_prints_denial() {
    let out = preflight(
        &shipped_config(),
        &["--operation", "browse_photos", "--quiet"],
    );
    assert_eq!(code(&out), 22);
    assert!(out.stdout.is_empty());
    let err = stderr(&out);
    assert_eq!(err.lines().count(), 1, "{err}");
    assert!(err.contains("browse_photos"));
}

#[test]
fn verbose_includes_default_mode_message() {
    let out = preflight(
        &shipped_config(),
        &["--operation", "square_cache_sync", "--verbose"],
    );
    assert_eq!(code(&out), 0, "{}", stderr(&out));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("mode LOCAL_STANDARD is the runtime default"),
        "{stdout}"
    );
}

#[test]
fn check_config_reports_findings_exits_20() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("capabilities.toml"),
        r#"
[WEB_SAFE.capabilities]
network_access = true

[LOCAL_STANDARD.capabilities]
network_access = false
"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("runtimes.toml"),
        r#"
[[runtime]]
id = "local_cli"
default_mode = "LOCAL_STANDARD"
allowed_modes = ["WEB_SAFE", "LOCAL_STANDARD"]
"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("operations.toml"), "").unwrap();

    let out = preflight(dir.path(), &["--check-config"]);
    assert_eq!(code(&out), 20);
    let err = stderr(&out);
    assert!(err.contains("lint: capability 'network_access'"), "{err}");
    assert!(err.contains("LOCAL_STANDARD"));
}

#[test]
fn json_reports_denial_on_stdout() {
    let out = preflight(
        &shipped_config(),
        &["--operation", "browse_photos", "--json"],
    );
    assert_eq!(code(&out), 22);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 1, "{stdout}");
    assert!(stdout.contains(r#""verdict":"deny""#), "{stdout}");
    assert!(stdout.contains(r#""category":"insufficient_mode""#), "{stdout}");
    assert!(stdout.contains(r#""required_mode":"LOCAL_PRIVILEGED""#), "{stdout}");
}

#[test]
fn json_reports_grant_on_stdout() {
    let out = preflight(
        &shipped_config(),
        &["--operation", "square_cache_sync", "--json"],
    );
    assert_eq!(code(&out), 0, "{}", stderr(&out));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains(r#""verdict":"allow""#), "{stdout}");
    assert!(stdout.contains(r#""mode":"LOCAL_STANDARD""#), "{stdout}");
}

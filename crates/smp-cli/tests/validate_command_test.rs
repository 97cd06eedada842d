use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const FEEDINGREDIENT_NS: &str = "https://www.github.com/eukodyne/cesmii/smprofiles/FeedIngredientV1";

fn cargo_bin() -> PathBuf {
    if let Ok(path) = env::var("CARGO_BIN_EXE_smpv") {
        return PathBuf::from(path);
    }

    let target_dir = env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| repo_root().join("target"));
    let executable_name = format!("smpv{}", std::env::consts::EXE_SUFFIX);
    let fallback = target_dir.join("debug").join(executable_name);

    if fallback.exists() {
        return fallback;
    }

    panic!(
        "CARGO_BIN_EXE_smpv is not set and fallback binary was not found at {}",
        fallback.display()
    );
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn testdata_path(path: &str) -> String {
    repo_root()
        .join("testdata")
        .join(path)
        .to_string_lossy()
        .into_owned()
}

fn smpv_command(args: &[&str]) -> Command {
    let mut command = Command::new(cargo_bin());
    command.args(args).env_remove("RUST_LOG");
    command
}

fn run_smpv(args: &[&str]) -> Output {
    smpv_command(args).output().expect("smpv should execute")
}

fn run_validate(payload: &str, extra: &[&str]) -> Output {
    let payload = testdata_path(payload);
    let profile = testdata_path("profiles/WorkOrderV1.jsonld");
    let mut args = vec!["validate", payload.as_str(), "--profile", profile.as_str()];
    args.extend_from_slice(extra);
    run_smpv(&args)
}

fn assert_exit_code(output: &Output, expected: i32) {
    let actual = output.status.code().unwrap_or(-1);
    assert_eq!(
        actual,
        expected,
        "unexpected exit code; stdout: {}; stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn feed_ingredient_reference() -> String {
    format!(
        "{FEEDINGREDIENT_NS}={}",
        testdata_path("profiles/FeedIngredientV1.jsonld")
    )
}

#[test]
fn validate_returns_success_for_valid_workorder() {
    let reference = feed_ingredient_reference();
    let output = run_validate("payloads/valid_workorder.json", &["--reference", &reference]);

    assert_exit_code(&output, 0);

    let stdout = stdout(&output);
    assert!(stdout.contains("Errors: 0"));
    assert!(stdout.contains("Warnings: 0"));
    assert!(stdout.contains("Validation passed with no warnings."));
}

#[test]
fn validate_keys_reference_by_profile_id() {
    let reference = testdata_path("profiles/FeedIngredientV1.jsonld");
    let output = run_validate("payloads/valid_workorder.json", &["-r", &reference]);

    assert_exit_code(&output, 0);
}

#[test]
fn validate_returns_error_exit_code_for_invalid_payload() {
    let reference = feed_ingredient_reference();
    let output = run_validate("payloads/invalid_workorder.json", &["--reference", &reference]);

    assert_exit_code(&output, 2);

    let stdout = stdout(&output);
    assert!(stdout.contains("Errors: 4"));
    assert!(stdout.contains(
        "WorkOrderNumber: Invalid type (expected: integer (-2147483648 to 2147483647), got: string)"
    ));
    assert!(stdout.contains("TimeZone.offset: Invalid type"));
    assert!(stdout.contains("FeedIngredients[1].ProductNumber: Invalid type"));
}

#[test]
fn validate_reports_unloaded_reference_as_error() {
    let output = run_validate("payloads/valid_workorder.json", &[]);

    assert_exit_code(&output, 2);

    let stdout = stdout(&output);
    assert!(stdout.contains("Errors: 2"));
    assert!(stdout.contains("not loaded"));
    assert!(stdout.contains(FEEDINGREDIENT_NS));
}

#[test]
fn validate_returns_warning_exit_code_for_namespace_mismatch() {
    let output = run_validate("payloads/namespace_mismatch.yaml", &[]);

    assert_exit_code(&output, 1);

    let stdout = stdout(&output);
    assert!(stdout.contains("Warnings: 1"));
    assert!(stdout.contains("doesn't match profile namespace"));
    assert!(stdout.contains("Validation passed with 1 warning(s)."));
}

#[test]
fn validate_emits_json_report() {
    let reference = feed_ingredient_reference();
    let output = run_validate(
        "payloads/invalid_workorder.json",
        &["--reference", &reference, "--format", "json"],
    );

    assert_exit_code(&output, 2);

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["valid"], false);
    assert_eq!(
        report["profile"],
        "https://www.github.com/eukodyne/cesmii/smprofiles/WorkOrderV1"
    );
    assert_eq!(report["errors"].as_array().map(Vec::len), Some(4));
    assert_eq!(report["errors"][0]["path"], "WorkOrderNumber");
    assert_eq!(report["errors"][0]["message"], "Invalid type");
}

#[test]
fn validate_honours_max_depth() {
    let reference = feed_ingredient_reference();
    let output = run_validate(
        "payloads/valid_workorder.json",
        &["--reference", &reference, "--max-depth", "0"],
    );

    assert_exit_code(&output, 2);
    assert!(stdout(&output).contains("Maximum profile nesting depth (0) exceeded"));
}

#[test]
fn validate_reads_config_file_with_relative_sources() {
    let dir = tempfile::tempdir().expect("temporary directory should be created");
    let profiles = dir.path().join("profiles");
    fs::create_dir(&profiles).expect("profiles directory should be created");
    for name in ["WorkOrderV1.jsonld", "FeedIngredientV1.jsonld"] {
        fs::copy(testdata_path(&format!("profiles/{name}")), profiles.join(name))
            .expect("profile should be copied");
    }

    let config_path = dir.path().join("smpv.yaml");
    fs::write(
        &config_path,
        concat!(
            "profile: profiles/WorkOrderV1.jsonld\n",
            "references:\n",
            "  - source: profiles/FeedIngredientV1.jsonld\n",
            "format: json\n",
        ),
    )
    .expect("config should be written");

    let payload = testdata_path("payloads/valid_workorder.json");
    let output = run_smpv(&[
        "--config",
        config_path.to_string_lossy().as_ref(),
        "validate",
        &payload,
    ]);

    assert_exit_code(&output, 0);
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["valid"], true);
}

#[test]
fn validate_prefers_config_directory_over_working_directory() {
    let config_dir = tempfile::tempdir().expect("config directory should be created");
    let working_dir = tempfile::tempdir().expect("working directory should be created");

    fs::create_dir(config_dir.path().join("profiles")).expect("profiles directory should be created");
    fs::copy(
        testdata_path("profiles/WorkOrderV1.jsonld"),
        config_dir.path().join("profiles/P.jsonld"),
    )
    .expect("profile should be copied");

    fs::create_dir(working_dir.path().join("profiles")).expect("profiles directory should be created");
    fs::write(
        working_dir.path().join("profiles/P.jsonld"),
        r#"{"@id": "urn:wrong", "cesmii:attributes": []}"#,
    )
    .expect("decoy profile should be written");

    let config_path = config_dir.path().join("smpv.yaml");
    fs::write(&config_path, "profile: profiles/P.jsonld\nformat: json\n")
        .expect("config should be written");
    let payload = config_dir.path().join("order.json");
    fs::write(&payload, r#"{"WorkOrderNumber": "not-a-number"}"#)
        .expect("payload should be written");

    let output = smpv_command(&[
        "--config",
        config_path.to_string_lossy().as_ref(),
        "validate",
        payload.to_string_lossy().as_ref(),
    ])
    .current_dir(working_dir.path())
    .output()
    .expect("smpv should execute");

    assert_exit_code(&output, 2);
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(
        report["profile"],
        "https://www.github.com/eukodyne/cesmii/smprofiles/WorkOrderV1"
    );
    assert_eq!(report["errors"][0]["path"], "WorkOrderNumber");
}

#[test]
fn validate_resolves_command_line_sources_against_working_directory() {
    let config_dir = tempfile::tempdir().expect("config directory should be created");
    let config_path = config_dir.path().join("smpv.yaml");
    fs::write(&config_path, "format: json\n").expect("config should be written");
    fs::copy(
        testdata_path("profiles/WorkOrderV1.jsonld"),
        config_dir.path().join("WorkOrderV1.jsonld"),
    )
    .expect("profile should be copied");

    let payload = testdata_path("payloads/namespace_mismatch.yaml");
    let output = smpv_command(&[
        "--config",
        config_path.to_string_lossy().as_ref(),
        "validate",
        &payload,
        "--profile",
        "WorkOrderV1.jsonld",
    ])
    .current_dir(repo_root())
    .output()
    .expect("smpv should execute");

    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load profile"));
}

#[test]
fn validate_returns_error_when_profile_path_is_invalid() {
    let payload = testdata_path("payloads/valid_workorder.json");
    let missing = testdata_path("profiles/does-not-exist.jsonld");
    let output = run_smpv(&["validate", &payload, "--profile", &missing]);

    assert_exit_code(&output, 2);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load profile"));
    assert!(stderr.contains("not found"));
}

#[test]
fn validate_returns_error_when_payload_is_malformed() {
    let dir = tempfile::tempdir().expect("temporary directory should be created");
    let payload = dir.path().join("broken.json");
    fs::write(&payload, "{ not json").expect("payload should be written");

    let output = run_validate_path(&payload);

    assert_exit_code(&output, 2);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load payload"));
    assert!(stderr.contains("JSON parse error"));
}

#[test]
fn validate_requires_a_profile() {
    let payload = testdata_path("payloads/valid_workorder.json");
    let output = run_smpv(&["validate", &payload]);

    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("No profile given"));
}

fn run_validate_path(payload: &Path) -> Output {
    let profile = testdata_path("profiles/WorkOrderV1.jsonld");
    run_smpv(&[
        "validate",
        payload.to_string_lossy().as_ref(),
        "--profile",
        &profile,
    ])
}

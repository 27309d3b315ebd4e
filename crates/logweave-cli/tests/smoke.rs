use serde_json::Value;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn write_pipeline_file(path: &Path) {
    let source = r#"
        {
            "pipeline": [
                {"type": "noop", "id": "a", "output": "p"},
                {"type": "plugin", "id": "p", "pipeline": [
                    {"type": "noop", "id": "x"},
                    {"type": "noop", "id": "y"}
                ]}
            ]
        }
    "#;
    std::fs::write(path, source).expect("pipeline file write should succeed");
}

fn run_cli(args: &[&str], cwd: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_logweave-cli"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("cli process should start")
}

fn assert_success(output: &std::process::Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn assemble_command_config_file_expected_wiring_lines() {
    let temp = TempDir::new().expect("tempdir should create");
    let config = temp.path().join("pipeline.json");
    write_pipeline_file(&config);

    let output = run_cli(
        &[
            "assemble",
            "--config",
            config.to_str().expect("config path should be utf8"),
        ],
        temp.path(),
    );

    assert_success(&output);
    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "$.a [noop] -> $.p.x",
            "$.p.x [noop] -> $.p.y",
            "$.p.y [noop] -> $.default_output",
            "$.default_output [stdout] -> <none>",
        ]
    );
}

#[test]
fn assemble_command_json_without_default_output_expected_summaries() {
    let temp = TempDir::new().expect("tempdir should create");
    let config = temp.path().join("pipeline.json");
    write_pipeline_file(&config);

    let output = run_cli(
        &[
            "assemble",
            "--config",
            config.to_str().expect("config path should be utf8"),
            "--default-output",
            "none",
            "--json",
        ],
        temp.path(),
    );

    assert_success(&output);
    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf8");
    let value: Value = serde_json::from_str(&stdout).expect("json output should parse");
    let operators = value.as_array().expect("output should be an array");
    assert_eq!(operators.len(), 3);
    assert_eq!(operators[0].get("id").and_then(Value::as_str), Some("$.a"));
    assert_eq!(
        operators[0].get("outputs"),
        Some(&serde_json::json!(["$.p.x"]))
    );
    assert_eq!(
        operators[2].get("kind").and_then(Value::as_str),
        Some("transformer")
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("warning[dangling_output] $.p.y"));
}

#[test]
fn validate_command_unknown_output_expected_exit_code_two() {
    let temp = TempDir::new().expect("tempdir should create");
    let output = run_cli(
        &[
            "validate",
            "--config-source",
            r#"[{"type": "noop", "id": "a", "output": "missing"}]"#,
        ],
        temp.path(),
    );

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error[output_exists]"));
}

#[test]
fn assemble_command_builder_failure_expected_exit_code_one() {
    let temp = TempDir::new().expect("tempdir should create");
    let output = run_cli(
        &[
            "assemble",
            "--config-source",
            r#"[{"type": "noop"}, {"type": "filter", "id": "gate"}]"#,
        ],
        temp.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to build operator '$.gate'"));
    assert!(stderr.contains("missing required field 'expr'"));
}

#[test]
fn plugin_dir_expected_named_plugin_listed_and_expanded() {
    let temp = TempDir::new().expect("tempdir should create");
    let plugins = temp.path().join("plugins");
    std::fs::create_dir(&plugins).expect("plugin dir should create");
    std::fs::write(
        plugins.join("syslog.json"),
        r#"[{"type": "regex_parser", "id": "parse", "regex": "^<(?P<pri>\\d+)>"}]"#,
    )
    .expect("plugin write should succeed");
    let plugin_dir = plugins.to_str().expect("plugin path should be utf8");

    let types = run_cli(&["types", "--plugin-dir", plugin_dir], temp.path());
    assert_success(&types);
    let stdout = String::from_utf8(types.stdout).expect("stdout should be utf8");
    assert!(stdout.lines().any(|line| line == "syslog (plugin)"));
    assert!(stdout.lines().any(|line| line == "router (builtin)"));

    let assembled = run_cli(
        &[
            "assemble",
            "--plugin-dir",
            plugin_dir,
            "--default-output",
            "drop",
            "--config-source",
            r#"[{"type": "noop", "id": "in", "output": "edge"}, {"type": "syslog", "id": "edge"}]"#,
        ],
        temp.path(),
    );
    assert_success(&assembled);
    let stdout = String::from_utf8(assembled.stdout).expect("stdout should be utf8");
    assert!(stdout.contains("$.in [noop] -> $.edge.parse"));
    assert!(stdout.contains("$.edge.parse [regex_parser] -> $.default_output"));
    assert!(stdout.contains("$.default_output [drop_output] -> <none>"));
}

#[test]
fn verbose_flag_expected_debug_logs_on_stderr() {
    let temp = TempDir::new().expect("tempdir should create");
    let source = r#"[{"type": "noop", "id": "a"}]"#;

    let quiet = run_cli(&["assemble", "--config-source", source], temp.path());
    assert_success(&quiet);
    assert!(!String::from_utf8_lossy(&quiet.stderr).contains("built operator spec"));

    let verbose = run_cli(&["-v", "assemble", "--config-source", source], temp.path());
    assert_success(&verbose);
    let stderr = String::from_utf8_lossy(&verbose.stderr);
    assert!(stderr.contains("DEBUG"));
    assert!(stderr.contains("built operator spec"));
}

#[test]
fn plugin_dir_builtin_name_expected_exit_code_one() {
    let temp = TempDir::new().expect("tempdir should create");
    let plugins = temp.path().join("plugins");
    std::fs::create_dir(&plugins).expect("plugin dir should create");
    std::fs::write(plugins.join("noop.json"), r#"[{"type": "stdout"}]"#)
        .expect("plugin write should succeed");

    let output = run_cli(
        &[
            "types",
            "--plugin-dir",
            plugins.to_str().expect("plugin path should be utf8"),
        ],
        temp.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("plugin 'noop' conflicts with the operator type"));
}

//! CLI integration tests for request-schema binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("request-schema"))
}

// Helper to create a temp file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const USER_SPEC: &str = r#"{
    "body": {
        "username": {
            "firstName": { "type": "string", "required": true, "min": 4, "max": 15 },
            "lastName": { "type": "string", "required": true, "min": 4, "max": 255 }
        },
        "age": { "type": "number", "required": true, "min": 1, "max": 1000 }
    },
    "query": { "verbose": { "type": "boolean" } },
    "path": { "id": { "type": "number", "required": true, "min": 1, "max": 99 } }
}"#;

mod validate_command {
    use super::*;

    #[test]
    fn validate_valid_request() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", USER_SPEC);
        let body = write_temp_file(
            &dir,
            "body.json",
            r#"{"username": {"firstName": "juan", "lastName": "dela cruz"}, "age": 30}"#,
        );

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "--body",
                body.to_str().unwrap(),
                "--query",
                "verbose=true",
                "--path",
                "id=7",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"));
    }

    #[test]
    fn validate_missing_nested_attribute() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", USER_SPEC);
        let body = write_temp_file(
            &dir,
            "body.json",
            r#"{"username": {"firstName": "juan"}, "age": 30}"#,
        );

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "--body",
                body.to_str().unwrap(),
                "--path",
                "id=7",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains(
                "Error in Request Body, MISSING ATTRIBUTE ERROR. missing attribute 'username.lastName'",
            ));
    }

    #[test]
    fn validate_path_param_out_of_range() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", USER_SPEC);
        let body = write_temp_file(
            &dir,
            "body.json",
            r#"{"username": {"firstName": "juan", "lastName": "dela cruz"}, "age": 30}"#,
        );

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "--body",
                body.to_str().unwrap(),
                "--path",
                "id=100",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains(
                "Error in Path Parameter, INVALID ATTRIBUTE LENGTH",
            ));
    }

    #[test]
    fn validate_query_param_wrong_type() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", USER_SPEC);
        let body = write_temp_file(
            &dir,
            "body.json",
            r#"{"username": {"firstName": "juan", "lastName": "dela cruz"}, "age": 30}"#,
        );

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "--body",
                body.to_str().unwrap(),
                "--query",
                "verbose=yes",
                "--path",
                "id=7",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains(
                "invalid type of attribute 'verbose'. expected boolean, got string",
            ));
    }

    #[test]
    fn validate_without_body() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(
            &dir,
            "spec.json",
            r#"{"query": {"q": {"type": "string", "required": true, "min": 1, "max": 20}}}"#,
        );

        cmd()
            .args(["validate", spec.to_str().unwrap(), "--query", "q=rust"])
            .assert()
            .success();
    }

    #[test]
    fn validate_json_output_valid() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(
            &dir,
            "spec.json",
            r#"{"path": {"id": {"type": "number", "required": true, "min": 1, "max": 9}}}"#,
        );

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "--path",
                "id=3",
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""status_code":200"#))
            .stdout(predicate::str::contains(r#"\"id\":3"#));
    }

    #[test]
    fn validate_json_output_invalid() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(
            &dir,
            "spec.json",
            r#"{"query": {"testQparam": {"type": "string", "required": true, "min": 4, "max": 50}}}"#,
        );

        cmd()
            .args(["validate", spec.to_str().unwrap(), "--json"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""status_code":400"#))
            .stdout(predicate::str::contains(
                "Error in Query Parameter, MISSING ATTRIBUTE ERROR. missing attribute 'testQparam'",
            ))
            .stdout(predicate::str::contains(r#""Content-Type":"text/plain""#));
    }

    #[test]
    fn validate_json_output_spec_error() {
        cmd()
            .args(["validate", "/nonexistent/spec.json", "--json"])
            .assert()
            .code(3)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""error":"#));
    }

    #[test]
    fn malformed_key_value_rejected() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", "{}");

        cmd()
            .args(["validate", spec.to_str().unwrap(), "--query", "novalue"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("expected NAME=VALUE"));
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn spec_not_found() {
        cmd()
            .args(["validate", "/nonexistent/spec.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn invalid_json_spec() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "bad.json", r#"{ not valid json"#);

        cmd()
            .args(["validate", spec.to_str().unwrap()])
            .assert()
            .code(2);
    }

    #[test]
    fn unsupported_attribute_type() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(
            &dir,
            "spec.json",
            r#"{"body": {"born": {"type": "date", "required": true}}}"#,
        );

        cmd()
            .args(["validate", spec.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid attribute type \"date\""));
    }

    #[test]
    fn body_file_not_found() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", "{}");

        cmd()
            .args([
                "validate",
                spec.to_str().unwrap(),
                "--body",
                "/nonexistent/body.json",
            ])
            .assert()
            .code(3);
    }
}

mod check_command {
    use super::*;

    #[test]
    fn check_valid_spec() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", USER_SPEC);

        cmd()
            .args(["check", spec.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("all passed"));
    }

    #[test]
    fn check_directory_with_error() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "good.json", USER_SPEC);
        write_temp_file(&dir, "bad.json", r#"{"body": {"x": {"type": "list"}}}"#);

        cmd()
            .args(["check", dir.path().to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("E002"));
    }

    #[test]
    fn check_warning_passes_unless_strict() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(
            &dir,
            "spec.json",
            r#"{"body": {"name": {"type": "string", "min": 9, "max": 3}}}"#,
        );

        cmd()
            .args(["check", spec.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("W001"));

        cmd()
            .args(["check", spec.to_str().unwrap(), "--strict"])
            .assert()
            .code(1);
    }

    #[test]
    fn check_json_format() {
        let dir = TempDir::new().unwrap();
        let spec = write_temp_file(&dir, "spec.json", USER_SPEC);

        cmd()
            .args(["check", spec.to_str().unwrap(), "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""files_checked": 1"#));
    }

    #[test]
    fn check_missing_path() {
        cmd()
            .args(["check", "/nonexistent/dir"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("path not found"));
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("validate"))
            .stdout(predicate::str::contains("check"));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("request-schema"));
    }
}

//! CLI integration tests for the schema-rewrite binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("schema-rewrite"))
}

// Helper to create a temp file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const MASK_RULES: &str = r#"[
    {
        "description": "mask emails",
        "schema": { "type": "string", "format": "email" },
        "replace": "***@example.com"
    }
]"#;

mod apply_command {
    use super::*;

    #[test]
    fn rewrites_file() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(&dir, "rules.json", MASK_RULES);
        let input = write_temp_file(
            &dir,
            "input.json",
            r#"{"email":"baz@example.com","foo":"bar"}"#,
        );

        cmd()
            .args([
                "apply",
                "--rules",
                rules.to_str().unwrap(),
                input.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(r#"{"email":"***@example.com","foo":"bar"}"#.to_owned() + "\n");
    }

    #[test]
    fn rewrites_stdin_stream() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(&dir, "rules.json", MASK_RULES);

        cmd()
            .args(["apply", "-r", rules.to_str().unwrap()])
            .write_stdin("[\"x\",\"baz@example.com\"]\n\"a@example.com\" 7\n")
            .assert()
            .success()
            .stdout("[\"x\",\"***@example.com\"]\n\"***@example.com\"\n7\n");
    }

    #[test]
    fn large_integer_ids_are_kept() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(&dir, "rules.json", MASK_RULES);

        cmd()
            .args(["apply", "-r", rules.to_str().unwrap()])
            .write_stdin(r#"{"id":12345678901234567890123,"email":"a@example.com","ratio":1e2}"#)
            .assert()
            .success()
            .stdout(
                r#"{"id":12345678901234567890123,"email":"***@example.com","ratio":1e2}"#
                    .to_owned()
                    + "\n",
            );
    }

    #[test]
    fn no_recursive() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(&dir, "rules.json", MASK_RULES);

        cmd()
            .args(["apply", "-r", rules.to_str().unwrap(), "--no-recursive"])
            .write_stdin(r#"{"email":"baz@example.com"} "baz@example.com""#)
            .assert()
            .success()
            .stdout("{\"email\":\"baz@example.com\"}\n\"***@example.com\"\n");
    }

    #[test]
    fn abort_rule() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(
            &dir,
            "rules.json",
            r#"[
                {
                    "schema": { "type": "object", "required": ["password"] },
                    "replace": { "password": "[redacted]", "email": "kept@example.com" },
                    "abort": true
                },
                {
                    "schema": { "type": "string", "format": "email" },
                    "replace": "***@example.com"
                }
            ]"#,
        );

        cmd()
            .args(["apply", "-r", rules.to_str().unwrap()])
            .write_stdin(r#"{"user":{"password":"x"},"email":"a@example.com"}"#)
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#""user":{"password":"[redacted]","email":"kept@example.com"}"#,
            ))
            .stdout(predicate::str::contains(r#""email":"***@example.com""#));
    }

    #[test]
    fn pretty_to_output_file() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(&dir, "rules.json", MASK_RULES);
        let output = dir.path().join("out.json");

        cmd()
            .args([
                "apply",
                "-r",
                rules.to_str().unwrap(),
                "--pretty",
                "--output",
                output.to_str().unwrap(),
            ])
            .write_stdin(r#"{"email":"baz@example.com"}"#)
            .assert()
            .success()
            .stdout("");

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written, "{\n  \"email\": \"***@example.com\"\n}\n");
    }

    #[test]
    fn missing_rules_file() {
        cmd()
            .args(["apply", "-r", "/nonexistent/rules.json"])
            .write_stdin("{}")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn malformed_rules_file() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(&dir, "rules.json", "[{");

        cmd()
            .args(["apply", "-r", rules.to_str().unwrap()])
            .write_stdin("{}")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn malformed_input() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(&dir, "rules.json", MASK_RULES);

        cmd()
            .args(["apply", "-r", rules.to_str().unwrap()])
            .write_stdin("{\"a\": ")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("value #0"));
    }

    #[test]
    fn invalid_schema_fails_at_rewrite() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(
            &dir,
            "rules.json",
            r#"[{"schema": {"type": 12}, "replace": null}]"#,
        );

        cmd()
            .args(["apply", "-r", rules.to_str().unwrap()])
            .write_stdin("1")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("schema evaluation failed"));
    }
}

mod check_command {
    use super::*;

    #[test]
    fn valid_rules() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(&dir, "rules.json", MASK_RULES);

        cmd()
            .args(["check", rules.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 rules checked, all valid"));
    }

    #[test]
    fn invalid_schema_reported() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(
            &dir,
            "rules.json",
            r#"[
                {"schema": {"type": "string"}, "replace": 1},
                {"schema": {"type": 12}, "replace": 2, "description": "broken"}
            ]"#,
        );

        cmd()
            .args(["check", rules.to_str().unwrap()])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("#1 (broken)"));
    }

    #[test]
    fn json_output() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(
            &dir,
            "rules.json",
            r#"[{"schema": {"minLength": "x"}, "replace": 2}]"#,
        );

        cmd()
            .args(["check", rules.to_str().unwrap(), "--json"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""rule":0"#));
    }

    #[test]
    fn unknown_rule_field() {
        let dir = TempDir::new().unwrap();
        let rules = write_temp_file(
            &dir,
            "rules.json",
            r#"[{"schema": true, "replace": 1, "stop": true}]"#,
        );

        cmd()
            .args(["check", rules.to_str().unwrap(), "--json"])
            .assert()
            .code(2)
            .stdout(predicate::str::contains("invalid rule #0"));
    }
}

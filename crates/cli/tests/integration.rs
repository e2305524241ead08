//! Integration tests for the gsw CLI
//!
//! Local destinations run everywhere. The remote round trip needs a Cloud
//! Storage bucket with HMAC keys and only runs with the `integration`
//! feature:
//!
//! ```bash
//! export TEST_GCS_BUCKET=my-bucket
//! export TEST_GCS_ACCESS_KEY=GOOG1...
//! export TEST_GCS_SECRET_KEY=...
//! cargo test -p gswrite --features integration
//! ```

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const REMOTE_ENV: [&str; 4] = [
    "GSW_ENDPOINT",
    "GSW_REGION",
    "GSW_ACCESS_KEY",
    "GSW_SECRET_KEY",
];

/// Build a gsw command isolated from the user's config and environment
fn gsw(config_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gsw"));
    cmd.env("GSW_CONFIG_DIR", config_dir);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    for key in REMOTE_ENV {
        cmd.env_remove(key);
    }
    cmd
}

fn run_gsw(args: &[&str], config_dir: &Path) -> Output {
    gsw(config_dir)
        .args(args)
        .output()
        .expect("Failed to execute gsw command")
}

fn run_gsw_with_stdin(args: &[&str], config_dir: &Path, stdin: &[u8]) -> Output {
    let mut child = gsw(config_dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn gsw command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin)
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for gsw")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod local_write {
    use super::*;

    #[test]
    fn test_write_lines_from_args() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        let target = target.to_str().unwrap();

        let output = run_gsw(
            &["write", "-f", target, "The quick brown fox", "jumped"],
            dir.path(),
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(
            std::fs::read_to_string(target).unwrap(),
            "The quick brown fox\njumped\n"
        );
        assert!(stdout(&output).contains("Wrote 2 lines"));
        assert!(stderr(&output).contains("writing to disk"));
    }

    #[test]
    fn test_write_trims_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        let target = target.to_str().unwrap();

        let output = run_gsw(
            &["write", "-f", target, "--buffer-size", "1", "  one \t", "two  "],
            dir.path(),
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(std::fs::read_to_string(target).unwrap(), "  one\ntwo\n");
    }

    #[test]
    fn test_write_lines_from_stdin() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("stdin.txt");
        let target = target.to_str().unwrap();

        let output = run_gsw_with_stdin(
            &["write", "--filepath", target],
            dir.path(),
            b"first  \nsecond\r\nthird",
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(
            std::fs::read_to_string(target).unwrap(),
            "first\nsecond\nthird\n"
        );
    }

    #[test]
    fn test_write_empty_stdin_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("empty.txt");
        let target = target.to_str().unwrap();

        let output = run_gsw_with_stdin(&["write", "-f", target], dir.path(), b"");

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(std::fs::read_to_string(target).unwrap(), "");
        assert!(stdout(&output).contains("Wrote 0 lines"));
    }

    #[test]
    fn test_write_demo() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("demo.txt");
        let target = target.to_str().unwrap();

        let output = run_gsw(&["write", "-f", target, "--demo"], dir.path());

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(
            std::fs::read_to_string(target).unwrap(),
            "The quick brown fox\njumped over the lazy dog\n"
        );
    }

    #[test]
    fn test_write_truncates_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        std::fs::write(&target, "old contents that are longer\n").unwrap();
        let target = target.to_str().unwrap();

        let output = run_gsw(&["write", "-f", target, "new"], dir.path());

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(std::fs::read_to_string(target).unwrap(), "new\n");
    }

    #[test]
    fn test_write_json_output() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        let target = target.to_str().unwrap();

        let output = run_gsw(&["write", "-f", target, "--json", "abc"], dir.path());

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["lines"], 1);
        assert_eq!(json["size_bytes"], 4);
        assert_eq!(json["destination"]["kind"], "local");
        assert_eq!(json["destination"]["key"], target);
    }
}

mod failures {
    use super::*;

    #[test]
    fn test_invalid_destination() {
        let dir = TempDir::new().unwrap();

        let output = run_gsw(&["write", "-f", "gs://bucket-only", "x"], dir.path());

        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("Invalid destination"));
    }

    #[test]
    fn test_bucket_with_port_or_user_info() {
        let dir = TempDir::new().unwrap();

        for dest in ["gs://bucket:123/key", "gs://user:pw@bucket/key"] {
            let output = run_gsw(&["write", "-f", dest, "x"], dir.path());
            assert_eq!(output.status.code(), Some(2), "{dest}");
        }
    }

    #[test]
    fn test_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("out.txt");

        let output = run_gsw(&["write", "-f", target.to_str().unwrap(), "x"], dir.path());

        assert_eq!(output.status.code(), Some(4));
        assert!(stderr(&output).contains("Failed to create"));
        assert!(!target.exists());
    }

    #[test]
    fn test_remote_without_credentials() {
        let dir = TempDir::new().unwrap();

        let output = run_gsw(&["write", "-f", "gs://bucket/out.txt", "x"], dir.path());

        assert_eq!(output.status.code(), Some(3));
        assert!(stderr(&output).contains("Backend unavailable"));
    }

    #[test]
    fn test_missing_filepath_is_usage_error() {
        let dir = TempDir::new().unwrap();

        let output = run_gsw(&["write", "x"], dir.path());

        assert_eq!(output.status.code(), Some(2));
    }
}

mod resolve {
    use super::*;

    #[test]
    fn test_resolve_remote_json() {
        let dir = TempDir::new().unwrap();

        let output = run_gsw(
            &["resolve", "gs://mybucket/reports/2024%20q1.txt", "--json"],
            dir.path(),
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        insta::with_settings!({ sort_maps => true }, {
            insta::assert_json_snapshot!(json, @r#"
            {
              "container": "mybucket",
              "key": "reports/2024 q1.txt",
              "kind": "remote",
              "raw": "gs://mybucket/reports/2024%20q1.txt"
            }
            "#);
        });
    }

    #[test]
    fn test_resolve_local_json() {
        let dir = TempDir::new().unwrap();

        let output = run_gsw(&["resolve", "s3://bucket/key", "--json"], dir.path());

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        insta::with_settings!({ sort_maps => true }, {
            insta::assert_json_snapshot!(json, @r#"
            {
              "key": "s3://bucket/key",
              "kind": "local",
              "raw": "s3://bucket/key"
            }
            "#);
        });
    }
}

mod config {
    use super::*;

    #[test]
    fn test_set_and_show() {
        let dir = TempDir::new().unwrap();

        let output = run_gsw(
            &[
                "config",
                "set",
                "--access-key",
                "GOOG1EXAMPLE",
                "--secret-key",
                "hunter2",
                "--buffer-size",
                "512",
            ],
            dir.path(),
        );
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(dir.path().join("config.toml").exists());

        let output = run_gsw(&["config", "show", "--json"], dir.path());
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(json["remote"]["access_key"], "GOOG1EXAMPLE");
        assert_eq!(json["remote"]["secret_key"], "********");
        assert_eq!(json["sink"]["buffer_size"], 512);
        assert!(!stdout(&output).contains("hunter2"));
    }

    #[test]
    fn test_show_defaults() {
        let dir = TempDir::new().unwrap();

        let output = run_gsw(&["config", "show"], dir.path());

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let text = stdout(&output);
        assert!(text.contains("https://storage.googleapis.com"));
        assert!(text.contains("Buffer size: 4096 bytes"));
    }
}

#[cfg(feature = "integration")]
mod remote {
    use super::*;

    fn remote_env() -> Option<(String, String, String)> {
        let bucket = std::env::var("TEST_GCS_BUCKET").ok()?;
        let access_key = std::env::var("TEST_GCS_ACCESS_KEY").ok()?;
        let secret_key = std::env::var("TEST_GCS_SECRET_KEY").ok()?;
        Some((bucket, access_key, secret_key))
    }

    #[test]
    fn test_write_to_bucket() {
        let Some((bucket, access_key, secret_key)) = remote_env() else {
            eprintln!("Skipping: TEST_GCS_* not set");
            return;
        };
        let dir = TempDir::new().unwrap();
        let dest = format!("gs://{bucket}/gsw-integration/out.txt");

        let output = gsw(dir.path())
            .env("GSW_ACCESS_KEY", access_key)
            .env("GSW_SECRET_KEY", secret_key)
            .args(["write", "-f", &dest, "--demo"])
            .output()
            .expect("Failed to execute gsw command");

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stderr(&output).contains("writing to google storage"));
    }
}

//! Integration tests for the meshstat binary
//!
//! None of these reach a cluster: each fails before the first API call or
//! exits from argument parsing.

use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

/// Helper to run meshstat with a clean environment
fn meshstat(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_meshstat"))
        .args(args)
        .env_remove("HELM_DRIVER")
        .env_remove("RUST_LOG")
        .env("KUBECONFIG", "/nonexistent/meshstat/kubeconfig")
        .output()
        .expect("Failed to execute meshstat")
}

fn kubeconfig() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"apiVersion: v1
kind: Config
clusters:
  - name: local
    cluster:
      server: https://127.0.0.1:6443
contexts:
  - name: local
    context:
      cluster: local
      user: local
current-context: local
users:
  - name: local
    user:
      token: not-a-real-token
"#,
    )
    .unwrap();
    file
}

mod usage {
    use super::*;

    #[test]
    fn test_help_succeeds() {
        let output = meshstat(&["status", "--help"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("--kubeconfig"));
        assert!(stdout.contains("--context"));
    }

    #[test]
    fn test_positional_argument_exits_one() {
        let output = meshstat(&["status", "consul"]);

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("no non-flag arguments"));
    }

    #[test]
    fn test_unknown_flag_exits_one() {
        let output = meshstat(&["status", "--bogus"]);
        assert_eq!(output.status.code(), Some(1));
    }
}

mod configuration {
    use super::*;

    #[test]
    fn test_missing_kubeconfig_file() {
        let output = meshstat(&["status", "-c", "/nonexistent/meshstat/kubeconfig"]);

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Long lines are wrapped, possibly at a path separator
        assert!(stderr.contains("meshstat::cli::config"));
        assert!(stderr.contains("Configuration error"));
        assert!(stderr.contains("nonexistent"));
    }

    #[test]
    fn test_unknown_context() {
        let file = kubeconfig();
        let path = file.path().to_string_lossy().to_string();

        let output = meshstat(&["status", "--kubeconfig", &path, "--context", "missing"]);

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("meshstat::cli::config"));
    }

    #[test]
    fn test_unsupported_storage_driver_from_env() {
        let output = Command::new(env!("CARGO_BIN_EXE_meshstat"))
            .args(["status"])
            .env("HELM_DRIVER", "sql")
            .output()
            .expect("Failed to execute meshstat");

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("unsupported storage driver 'sql'"));
    }

    #[test]
    fn test_nothing_printed_to_stdout_on_config_error() {
        let output = meshstat(&["status", "-c", "/nonexistent/meshstat/kubeconfig"]);
        assert!(output.stdout.is_empty());
    }
}

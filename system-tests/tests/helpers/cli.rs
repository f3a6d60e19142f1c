// system-tests/tests/helpers/cli.rs
// ============================================================================
// Module: CLI Helpers
// Description: Shared helpers for locating and invoking the agent-entities CLI.
// Purpose: Provide consistent CLI binary resolution across system-test suites.
// Dependencies: std::process, std::path
// ============================================================================

//! Helpers for invoking the agent-entities CLI in system-tests.

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::sync::OnceLock;

/// Binary name produced by `agent-entities-cli`.
const BINARY_NAME: &str = "agent-entities";

/// Captured CLI invocation.
#[derive(Debug, Clone)]
pub struct CliRun {
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

impl CliRun {
    /// Returns true when the process exited with status zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Returns a one-line transcript entry for artifacts.
    pub fn transcript(&self, args: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "args": args,
            "code": self.code,
            "stdout": self.stdout,
            "stderr": self.stderr,
        })
    }
}

impl From<Output> for CliRun {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Locates the agent-entities CLI binary, building it if necessary.
pub fn cli_binary() -> Option<PathBuf> {
    if let Some(path) = option_env!("CARGO_BIN_EXE_agent-entities") {
        let candidate = PathBuf::from(path);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_agent-entities") {
        let candidate = PathBuf::from(path);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    build_cli_binary().map_or_else(|_| resolve_cli_from_current_exe(), Some)
}

/// Runs the CLI with arguments and a scrubbed credential environment.
pub fn run_cli(binary: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<CliRun, String> {
    let mut command = Command::new(binary);
    command
        .args(args)
        .env_remove("AGENT_ENTITIES_CONFIG")
        .env_remove("GOOGLE_CLOUD_PROJECT");
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().map(CliRun::from).map_err(|err| format!("run {BINARY_NAME} failed: {err}"))
}

fn resolve_cli_from_current_exe() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let profile_dir = exe.parent()?.parent()?;
    let candidate = profile_dir.join(format!("{BINARY_NAME}{}", exe_suffix()));
    if candidate.exists() { Some(candidate) } else { None }
}

fn target_dir_from_current_exe() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let profile_dir = exe.parent()?.parent()?;
    profile_dir.parent().map(PathBuf::from)
}

fn build_cli_binary() -> Result<PathBuf, String> {
    static BUILD_RESULT: OnceLock<Result<PathBuf, String>> = OnceLock::new();
    let result = BUILD_RESULT.get_or_init(|| {
        let Some(target_dir) = target_dir_from_current_exe() else {
            return Err("unable to resolve target dir from current exe".to_string());
        };
        let output = Command::new("cargo")
            .args(["build", "-p", "agent-entities-cli", "--bin", BINARY_NAME, "--target-dir"])
            .arg(&target_dir)
            .output()
            .map_err(|err| format!("spawn cargo build failed: {err}"))?;
        if !output.status.success() {
            return Err(format!(
                "cargo build agent-entities-cli failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }
        resolve_cli_from_target_dir(&target_dir)
            .ok_or_else(|| format!("{BINARY_NAME} binary not found after build"))
    });
    result.clone()
}

fn resolve_cli_from_target_dir(target_dir: &Path) -> Option<PathBuf> {
    let candidate = target_dir.join("debug").join(format!("{BINARY_NAME}{}", exe_suffix()));
    if candidate.exists() { Some(candidate) } else { None }
}

const fn exe_suffix() -> &'static str {
    if cfg!(windows) { ".exe" } else { "" }
}

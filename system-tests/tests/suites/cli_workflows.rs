// system-tests/tests/suites/cli_workflows.rs
// ============================================================================
// Module: CLI Workflow Tests
// Description: End-to-end agent-entities CLI command coverage.
// Purpose: Validate entity type, entity, and config commands against the API stub.
// Dependencies: system-tests helpers, agent-entities-core
// ============================================================================

//! CLI workflow coverage for agent-entities system-tests.

#![allow(
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Workflow steps assert inline while propagating setup errors."
)]

use std::error::Error;
use std::fs;
use std::path::Path;

use helpers::api_stub::ApiStubHandle;
use helpers::api_stub::StubOptions;
use helpers::api_stub::spawn_api_stub;
use helpers::artifacts::TestReporter;
use helpers::cli::CliRun;
use helpers::cli::cli_binary;
use helpers::cli::run_cli;
use serde_json::Value;
use tempfile::TempDir;

use crate::helpers;

const TOKEN_ENV: &str = "AGENT_ENTITIES_SYSTEM_TEST_TOKEN";
const TOKEN: &str = "cli-workflow-token";
const DISPLAY_NAME: &str = "fake_entity_type_for_testing";

type DynError = Box<dyn Error>;

/// Writes a CLI config pointed at the stub with a file audit sink.
fn write_cli_config(path: &Path, endpoint: &str, audit_path: &Path) -> Result<(), String> {
    let audit_path =
        std::path::absolute(audit_path).map_err(|err| format!("resolve audit path: {err}"))?;
    let contents = format!(
        r#"[project]
id = "cli-project"

[api]
endpoint = "{endpoint}"
allow_http = true
timeout_ms = 5000
page_size = 1
operation_poll_interval_ms = 0

[auth]
access_token_env = "{TOKEN_ENV}"

[audit]
sink = "file"
path = "{}"
"#,
        audit_path.display()
    );
    fs::write(path, contents).map_err(|err| format!("write config: {err}"))
}

/// CLI invoker that records every call into a transcript.
struct CliSession<'a> {
    binary: &'a Path,
    config: String,
    transcript: Vec<Value>,
}

impl CliSession<'_> {
    fn run(&mut self, args: &[&str]) -> Result<CliRun, String> {
        let mut full: Vec<&str> = vec!["--config", self.config.as_str()];
        full.extend_from_slice(args);
        let run = run_cli(self.binary, &full, &[(TOKEN_ENV, TOKEN)])?;
        self.transcript.push(run.transcript(&full));
        Ok(run)
    }

    fn run_ok(&mut self, args: &[&str]) -> Result<String, String> {
        let run = self.run(args)?;
        if run.success() {
            Ok(run.stdout)
        } else {
            Err(format!("{args:?} failed ({:?}): {}", run.code, run.stderr))
        }
    }
}

fn authorized_stub() -> Result<ApiStubHandle, String> {
    spawn_api_stub(StubOptions {
        required_token: Some(TOKEN.to_string()),
        ..StubOptions::default()
    })
}

#[test]
#[allow(clippy::too_many_lines, reason = "End-to-end CLI workflow stays linear for auditability.")]
fn cli_workflows_end_to_end() -> Result<(), DynError> {
    let mut reporter = TestReporter::new("cli_workflows_end_to_end", "stub")?;
    let Some(cli) = cli_binary() else {
        reporter.skip("agent-entities CLI binary unavailable")?;
        return Ok(());
    };
    let stub = authorized_stub()?;
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("agent-entities.toml");
    let audit_path = reporter.artifacts().root().join("cli_audit.jsonl");
    write_cli_config(&config_path, stub.endpoint(), &audit_path)?;
    let mut session = CliSession {
        binary: &cli,
        config: config_path.display().to_string(),
        transcript: Vec::new(),
    };

    assert_eq!(session.run_ok(&["config", "validate"])?.trim(), "config ok");

    let created = session.run_ok(&["entity-types", "create", "--display-name", DISPLAY_NAME])?;
    assert!(created.contains(&format!("display_name: \"{DISPLAY_NAME}\"")), "{created}");

    let ids = session.run_ok(&["entity-types", "ids", "--display-name", DISPLAY_NAME])?;
    let ids: Vec<&str> = ids.lines().collect();
    assert_eq!(ids.len(), 1, "{ids:?}");
    let entity_type_id = ids[0].to_string();

    session.run_ok(&[
        "entities",
        "create",
        "--entity-type-id",
        &entity_type_id,
        "--value",
        "fake_entity_for_testing_1",
    ])?;
    session.run_ok(&[
        "entities",
        "create",
        "--entity-type-id",
        &entity_type_id,
        "--value",
        "fake_entity_for_testing_2",
        "--synonym",
        "fake_synonym_for_testing_1",
        "--synonym",
        "fake_synonym_for_testing_2",
    ])?;

    let listed = session.run_ok(&["entities", "list", "--entity-type-id", &entity_type_id])?;
    assert!(listed.contains("Entity value: fake_entity_for_testing_1"), "{listed}");
    assert!(listed.contains("Entity value: fake_entity_for_testing_2"), "{listed}");
    assert!(
        listed.contains("Synonyms: [fake_synonym_for_testing_1, fake_synonym_for_testing_2]"),
        "{listed}"
    );

    let shown =
        session.run_ok(&["entity-types", "get", "--id", &entity_type_id, "--format", "json"])?;
    let shown: Value = serde_json::from_str(&shown)?;
    assert_eq!(shown["displayName"], DISPLAY_NAME);
    assert_eq!(shown["entities"].as_array().map(Vec::len), Some(2));

    for value in ["fake_entity_for_testing_1", "fake_entity_for_testing_2"] {
        session.run_ok(&[
            "entities",
            "delete",
            "--entity-type-id",
            &entity_type_id,
            "--value",
            value,
        ])?;
    }
    let emptied = session.run_ok(&["entities", "list", "--entity-type-id", &entity_type_id])?;
    assert_eq!(emptied, "");

    session.run_ok(&["entity-types", "delete", "--id", &entity_type_id])?;
    let ids = session.run_ok(&[
        "entity-types",
        "ids",
        "--display-name",
        DISPLAY_NAME,
        "--format",
        "json",
    ])?;
    let ids: Vec<String> = serde_json::from_str(&ids)?;
    assert!(ids.is_empty());

    let audit = fs::read_to_string(&audit_path)?;
    assert!(!audit.is_empty());
    assert!(!audit.contains(TOKEN), "audit log leaked the access token");
    for line in audit.lines() {
        let event: Value = serde_json::from_str(line)?;
        assert_eq!(event["event"], "api_request");
    }

    reporter.artifacts().write_json("tool_transcript.json", &session.transcript)?;
    reporter.pass(
        vec!["entity lifecycle completed through the CLI".to_string()],
        &["tool_transcript.json", "cli_audit.jsonl"],
    )?;
    Ok(())
}

#[test]
fn cli_reports_remote_failures() -> Result<(), DynError> {
    let mut reporter = TestReporter::new("cli_reports_remote_failures", "stub")?;
    let Some(cli) = cli_binary() else {
        reporter.skip("agent-entities CLI binary unavailable")?;
        return Ok(());
    };
    let stub = authorized_stub()?;
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("agent-entities.toml");
    write_cli_config(&config_path, stub.endpoint(), &temp_dir.path().join("audit.jsonl"))?;
    let mut session = CliSession {
        binary: &cli,
        config: config_path.display().to_string(),
        transcript: Vec::new(),
    };

    let missing = session.run(&["entity-types", "get", "--id", "missing"])?;
    assert!(!missing.success());
    assert!(missing.stderr.contains("entity-types get failed"), "{}", missing.stderr);
    assert!(missing.stderr.contains("not found"), "{}", missing.stderr);

    let anonymous = run_cli(
        &cli,
        &["--config", session.config.as_str(), "entity-types", "list"],
        &[],
    )?;
    assert!(!anonymous.success());
    assert!(anonymous.stderr.contains(TOKEN_ENV), "{}", anonymous.stderr);

    for id in ["../escape", "..", "."] {
        let invalid_id = session.run(&["entity-types", "delete", "--id", id])?;
        assert!(!invalid_id.success(), "{id} was accepted");
        assert!(invalid_id.stderr.contains("invalid entity type id"), "{}", invalid_id.stderr);
    }
    assert!(
        stub.requests().iter().all(|request| request.method != "DELETE"),
        "invalid id produced a DELETE"
    );
    assert!(
        stub.requests().iter().all(|request| !request.url.contains("..")),
        "invalid id reached the server"
    );

    reporter.artifacts().write_json("tool_transcript.json", &session.transcript)?;
    reporter.pass(Vec::new(), &["tool_transcript.json"])?;
    Ok(())
}

#[test]
fn cli_config_validate_rejects_bad_config() -> Result<(), DynError> {
    let mut reporter = TestReporter::new("cli_config_validate_rejects_bad_config", "none")?;
    let Some(cli) = cli_binary() else {
        reporter.skip("agent-entities CLI binary unavailable")?;
        return Ok(());
    };
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("agent-entities.toml");
    fs::write(&config_path, "[api]\nendpoint = \"http://127.0.0.1:1\"\n")?;
    let config = config_path.display().to_string();

    let run = run_cli(&cli, &["--config", config.as_str(), "config", "validate"], &[])?;
    assert!(!run.success());
    assert!(run.stderr.contains("allow_http"), "{}", run.stderr);

    fs::write(&config_path, "[api]\nunknown_field = 1\n")?;
    let run = run_cli(&cli, &["--config", config.as_str(), "config", "validate"], &[])?;
    assert!(!run.success());
    assert!(run.stderr.contains("config parse error"), "{}", run.stderr);

    reporter.pass(Vec::new(), &[])?;
    Ok(())
}

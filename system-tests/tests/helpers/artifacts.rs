// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Create per-test run roots and write deterministic summaries.
// Dependencies: system-tests, serde, serde_jcs
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// Outcome recorded for one scenario run.
#[derive(Debug, Serialize)]
struct RunSummary {
    test_name: String,
    backend: String,
    status: String,
    started_at_ms: u128,
    ended_at_ms: u128,
    notes: Vec<String>,
    artifacts: Vec<String>,
}

impl RunSummary {
    /// Renders the summary as a short markdown report.
    fn to_markdown(&self) -> String {
        let mut out = format!("# {} ({})\n\n", self.test_name, self.backend);
        let _ = writeln!(out, "- status: {}", self.status);
        let _ = writeln!(out, "- elapsed_ms: {}", self.ended_at_ms.saturating_sub(self.started_at_ms));
        push_section(&mut out, "Notes", &self.notes);
        push_section(&mut out, "Artifacts", &self.artifacts);
        out
    }
}

fn push_section(out: &mut String, heading: &str, items: &[String]) {
    let _ = write!(out, "\n## {heading}\n\n");
    if items.is_empty() {
        out.push_str("- none\n");
    }
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Directory holding the files produced by one system-test.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    root: PathBuf,
}

impl TestArtifacts {
    /// Creates the directory under the configured run root, or under
    /// `target/system-tests/run_<millis>` when none is configured.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let run_root = SystemTestConfig::load()
            .map_err(io::Error::other)?
            .run_root
            .unwrap_or_else(|| {
                PathBuf::from("target/system-tests").join(format!("run_{}", epoch_millis()))
            });
        let root = run_root.join(test_name);
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the artifact directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `value` as canonical (JCS) JSON.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        self.write_bytes(name, &bytes)
    }

    /// Writes UTF-8 text.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        self.write_bytes(name, value.as_bytes())
    }

    fn write_bytes(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Records the outcome of one test; a test that unwinds without reporting
/// is recorded as `panic` when the reporter drops.
pub struct TestReporter {
    artifacts: TestArtifacts,
    test_name: String,
    backend: String,
    started_at_ms: u128,
    reported: bool,
}

impl TestReporter {
    /// Creates a reporter for `test_name` run against `backend`.
    pub fn new(test_name: &str, backend: &str) -> io::Result<Self> {
        Ok(Self {
            artifacts: TestArtifacts::new(test_name)?,
            test_name: test_name.to_string(),
            backend: backend.to_string(),
            started_at_ms: epoch_millis(),
            reported: false,
        })
    }

    /// Returns the artifact directory for this test.
    pub fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Records a pass along with the artifacts the test wrote.
    pub fn pass(&mut self, notes: Vec<String>, artifacts: &[&str]) -> io::Result<()> {
        let artifacts = artifacts.iter().map(|name| (*name).to_string()).collect();
        self.report("pass", notes, artifacts)
    }

    /// Records a skip with its reason.
    pub fn skip(&mut self, reason: &str) -> io::Result<()> {
        self.report("skip", vec![reason.to_string()], Vec::new())
    }

    fn report(
        &mut self,
        status: &str,
        notes: Vec<String>,
        mut artifacts: Vec<String>,
    ) -> io::Result<()> {
        artifacts.push("summary.json".to_string());
        artifacts.push("summary.md".to_string());
        let summary = RunSummary {
            test_name: self.test_name.clone(),
            backend: self.backend.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms: epoch_millis(),
            notes,
            artifacts,
        };
        self.artifacts.write_json("summary.json", &summary)?;
        self.artifacts.write_text("summary.md", &summary.to_markdown())?;
        self.reported = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if !self.reported {
            let status = if std::thread::panicking() { "panic" } else { "unreported" };
            let _ = self.report(status, vec!["test ended without reporting".to_string()], Vec::new());
        }
    }
}

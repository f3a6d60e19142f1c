// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed. Live mode requires a project.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional run root override.
    RunRoot,
    /// Enable suites against the hosted service (`true`/`false` or `1`/`0`).
    Live,
    /// Project used by live suites.
    Project,
    /// Bearer token used by live suites.
    AccessToken,
    /// Optional endpoint override for live suites.
    Endpoint,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "AGENT_ENTITIES_SYSTEM_TEST_RUN_ROOT",
            Self::Live => "AGENT_ENTITIES_SYSTEM_TEST_LIVE",
            Self::Project => "GOOGLE_CLOUD_PROJECT",
            Self::AccessToken => "GOOGLE_OAUTH_ACCESS_TOKEN",
            Self::Endpoint => "AGENT_ENTITIES_SYSTEM_TEST_ENDPOINT",
            Self::TimeoutSeconds => "AGENT_ENTITIES_SYSTEM_TEST_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Whether live suites run.
    pub live: bool,
    /// Project for live suites.
    pub project: Option<String>,
    /// Bearer token for live suites.
    pub access_token: Option<String>,
    /// Endpoint override for live suites.
    pub endpoint: Option<String>,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
}

impl fmt::Debug for SystemTestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemTestConfig")
            .field("run_root", &self.run_root)
            .field("live", &self.live)
            .field("project", &self.project)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, live mode without a project).
    pub fn load() -> Result<Self, String> {
        Self::load_from(&read_env_strict)
    }

    /// Loads configuration through an injected lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is empty or fails validation.
    pub fn load_from(
        lookup: &dyn Fn(&str) -> Result<Option<String>, String>,
    ) -> Result<Self, String> {
        let nonempty = |env: SystemTestEnv| read_env_nonempty(lookup, env.as_str());
        let run_root = nonempty(SystemTestEnv::RunRoot)?.map(PathBuf::from);
        let live = parse_bool_env(SystemTestEnv::Live.as_str(), nonempty(SystemTestEnv::Live)?)?;
        let project = nonempty(SystemTestEnv::Project)?;
        let access_token = nonempty(SystemTestEnv::AccessToken)?;
        let endpoint = nonempty(SystemTestEnv::Endpoint)?;
        let timeout = nonempty(SystemTestEnv::TimeoutSeconds)?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        if live && project.is_none() {
            return Err(format!(
                "{} requires {}",
                SystemTestEnv::Live.as_str(),
                SystemTestEnv::Project.as_str()
            ));
        }
        Ok(Self {
            run_root,
            live,
            project,
            access_token,
            endpoint,
            timeout,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads a variable through `lookup` and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(
    lookup: &dyn Fn(&str) -> Result<Option<String>, String>,
    name: &str,
) -> Result<Option<String>, String> {
    match lookup(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable; unset means `false`.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}

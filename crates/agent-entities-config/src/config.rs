// crates/agent-entities-config/src/config.rs
// ============================================================================
// Module: Agent Entities Configuration
// Description: Configuration loading and validation for the entity client.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: agent-entities-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicitly named file must exist; when no path is given and the
//! default file is absent, built-in defaults apply. Environment lookups are
//! injected so callers and tests control them without mutating process state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use agent_entities_core::ProjectId;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "agent-entities.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "AGENT_ENTITIES_CONFIG";
/// Environment variable holding the default project identifier.
pub const PROJECT_ENV_VAR: &str = "GOOGLE_CLOUD_PROJECT";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default API endpoint.
pub(crate) const DEFAULT_ENDPOINT: &str = "https://dialogflow.googleapis.com";
/// Default API version path segment.
pub(crate) const DEFAULT_API_VERSION: &str = "v2";
/// Default request timeout in milliseconds.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Minimum request timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 300_000;
/// Default maximum response body size in bytes.
pub(crate) const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// Minimum response body limit in bytes.
pub(crate) const MIN_MAX_RESPONSE_BYTES: usize = 1024;
/// Maximum response body limit in bytes.
pub(crate) const MAX_MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Default list page size.
pub(crate) const DEFAULT_PAGE_SIZE: u32 = 100;
/// Largest page size accepted by the service.
pub(crate) const MAX_PAGE_SIZE: u32 = 1_000;
/// Default maximum number of pages followed per listing.
pub(crate) const DEFAULT_MAX_PAGES: u32 = 1_000;
/// Upper bound on pages followed per listing.
pub(crate) const MAX_MAX_PAGES: u32 = 100_000;
/// Default delay between operation polls in milliseconds.
pub(crate) const DEFAULT_OPERATION_POLL_INTERVAL_MS: u64 = 500;
/// Maximum delay between operation polls in milliseconds.
pub(crate) const MAX_OPERATION_POLL_INTERVAL_MS: u64 = 60_000;
/// Default number of operation polls before giving up.
pub(crate) const DEFAULT_OPERATION_MAX_POLLS: u32 = 120;
/// Maximum number of operation polls.
pub(crate) const MAX_OPERATION_MAX_POLLS: u32 = 10_000;
/// Maximum user agent length.
pub(crate) const MAX_USER_AGENT_LENGTH: usize = 256;
/// Maximum language code length (BCP-47 tag).
pub(crate) const MAX_LANGUAGE_CODE_LENGTH: usize = 35;
/// Maximum API version segment length.
pub(crate) const MAX_API_VERSION_LENGTH: usize = 16;
/// Maximum environment variable name length.
pub(crate) const MAX_ENV_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Agent entities client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentEntitiesConfig {
    /// Project selection.
    #[serde(default)]
    pub project: ProjectConfig,
    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Bearer token pass-through settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Request audit logging settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl AgentEntitiesConfig {
    /// Loads configuration from disk using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, &|name| std::env::var(name).ok())
    }

    /// Loads configuration from disk with an injected environment lookup.
    ///
    /// Resolution order: explicit `path`, then `AGENT_ENTITIES_CONFIG`, then
    /// `agent-entities.toml` in the working directory. Only the last may be
    /// absent, in which case defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env(
        path: Option<&Path>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let (resolved, required) = resolve_path(path, env)?;
        validate_path(&resolved)?;
        if !required && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| {
            ConfigError::Io(format!("{}: {err}", resolved.display()))
        })?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.project.validate()?;
        self.api.validate()?;
        self.auth.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Resolves the project: explicit override, then `project.id`, then
    /// `GOOGLE_CLOUD_PROJECT`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when no project is available or it is invalid.
    pub fn resolve_project(
        &self,
        override_id: Option<&str>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<ProjectId, ConfigError> {
        let raw = override_id
            .map(str::to_string)
            .or_else(|| self.project.id.clone())
            .or_else(|| env(PROJECT_ENV_VAR).filter(|value| !value.trim().is_empty()))
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "project id not set; pass --project, set project.id, or export \
                     {PROJECT_ENV_VAR}"
                ))
            })?;
        ProjectId::new(raw.trim())
            .map_err(|err| ConfigError::Invalid(format!("project id: {err}")))
    }

    /// Reads the bearer token named by `auth.access_token_env`, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the variable is configured but unset or blank.
    pub fn resolve_access_token(
        &self,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Option<String>, ConfigError> {
        let Some(name) = &self.auth.access_token_env else {
            return Ok(None);
        };
        match env(name) {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            _ => Err(ConfigError::Invalid(format!(
                "auth.access_token_env names {name} but it is unset or empty"
            ))),
        }
    }
}

/// Project selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Default project identifier.
    #[serde(default)]
    pub id: Option<String>,
}

impl ProjectConfig {
    /// Validates the project section.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(id) = &self.id {
            ProjectId::new(id.as_str())
                .map_err(|err| ConfigError::Invalid(format!("project.id: {err}")))?;
        }
        Ok(())
    }
}

/// Remote API settings.
///
/// # Invariants
/// - `http://` endpoints are only accepted with `allow_http = true`.
/// - Every numeric field is bounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the API (scheme + host, optional port).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API version path segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Optional language code for entity values.
    #[serde(default)]
    pub language_code: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Page size requested when listing.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Maximum pages followed per listing.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Allow cleartext HTTP endpoints.
    #[serde(default)]
    pub allow_http: bool,
    /// User agent for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Delay between long-running operation polls in milliseconds.
    #[serde(default = "default_operation_poll_interval_ms")]
    pub operation_poll_interval_ms: u64,
    /// Maximum polls before an operation is reported as timed out.
    #[serde(default = "default_operation_max_polls")]
    pub operation_max_polls: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            language_code: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            allow_http: false,
            user_agent: default_user_agent(),
            operation_poll_interval_ms: DEFAULT_OPERATION_POLL_INTERVAL_MS,
            operation_max_polls: DEFAULT_OPERATION_MAX_POLLS,
        }
    }
}

impl ApiConfig {
    /// Validates the API section.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(&self.endpoint, self.allow_http)?;
        if self.api_version.is_empty()
            || self.api_version.len() > MAX_API_VERSION_LENGTH
            || !self.api_version.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
        {
            return Err(ConfigError::Invalid(
                "api.api_version must be a short lowercase alphanumeric segment".to_string(),
            ));
        }
        if let Some(code) = &self.language_code
            && (code.is_empty()
                || code.len() > MAX_LANGUAGE_CODE_LENGTH
                || !code.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-'))
        {
            return Err(ConfigError::Invalid(
                "api.language_code must be a BCP-47 language tag".to_string(),
            ));
        }
        if self.timeout_ms < MIN_TIMEOUT_MS || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "api.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes < MIN_MAX_RESPONSE_BYTES
            || self.max_response_bytes > MAX_MAX_RESPONSE_BYTES
        {
            return Err(ConfigError::Invalid(format!(
                "api.max_response_bytes must be between {MIN_MAX_RESPONSE_BYTES} and \
                 {MAX_MAX_RESPONSE_BYTES}"
            )));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "api.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.max_pages == 0 || self.max_pages > MAX_MAX_PAGES {
            return Err(ConfigError::Invalid(format!(
                "api.max_pages must be between 1 and {MAX_MAX_PAGES}"
            )));
        }
        if self.user_agent.trim().is_empty() || self.user_agent.len() > MAX_USER_AGENT_LENGTH {
            return Err(ConfigError::Invalid(
                "api.user_agent must be non-empty and at most 256 bytes".to_string(),
            ));
        }
        if self.operation_poll_interval_ms > MAX_OPERATION_POLL_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "api.operation_poll_interval_ms must be at most {MAX_OPERATION_POLL_INTERVAL_MS}"
            )));
        }
        if self.operation_max_polls == 0 || self.operation_max_polls > MAX_OPERATION_MAX_POLLS {
            return Err(ConfigError::Invalid(format!(
                "api.operation_max_polls must be between 1 and {MAX_OPERATION_MAX_POLLS}"
            )));
        }
        Ok(())
    }
}

/// Bearer token pass-through settings.
///
/// # Invariants
/// - Tokens are never stored in the config file; only the variable name is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Environment variable holding an already-issued bearer token.
    #[serde(default)]
    pub access_token_env: Option<String>,
}

impl AuthConfig {
    /// Validates the auth section.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.access_token_env
            && (name.is_empty()
                || name.len() > MAX_ENV_NAME_LENGTH
                || !name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_'))
        {
            return Err(ConfigError::Invalid(
                "auth.access_token_env must be an environment variable name".to_string(),
            ));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// Write JSON lines to stderr.
    Stderr,
    /// Append JSON lines to `audit.path`.
    File,
}

/// Request audit logging settings.
///
/// # Invariants
/// - `path` is required when `sink = "file"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink receiving audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates the audit section.
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (_, Some(path)) => validate_path_string("audit.path", &path.to_string_lossy()),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default API endpoint.
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Default API version.
fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Default list page size.
const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Default page budget.
const fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

/// Default user agent derived from the crate version.
fn default_user_agent() -> String {
    format!("agent-entities/{}", env!("CARGO_PKG_VERSION"))
}

/// Default operation poll interval.
const fn default_operation_poll_interval_ms() -> u64 {
    DEFAULT_OPERATION_POLL_INTERVAL_MS
}

/// Default operation poll budget.
const fn default_operation_max_polls() -> u32 {
    DEFAULT_OPERATION_MAX_POLLS
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path and whether it must exist.
fn resolve_path(
    path: Option<&Path>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = env(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates the endpoint scheme, host presence, and absence of credentials.
fn validate_endpoint(endpoint: &str, allow_http: bool) -> Result<(), ConfigError> {
    let trimmed = endpoint.trim();
    let rest = if let Some(rest) = trimmed.strip_prefix("https://") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        if !allow_http {
            return Err(ConfigError::Invalid(
                "api.endpoint uses http:// without allow_http".to_string(),
            ));
        }
        rest
    } else {
        return Err(ConfigError::Invalid(
            "api.endpoint must include http:// or https://".to_string(),
        ));
    };
    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(ConfigError::Invalid("api.endpoint must include a host".to_string()));
    }
    if authority.contains('@') {
        return Err(ConfigError::Invalid("api.endpoint must not embed credentials".to_string()));
    }
    if rest.contains('?') || rest.contains('#') {
        return Err(ConfigError::Invalid(
            "api.endpoint must not include a query or fragment".to_string(),
        ));
    }
    Ok(())
}

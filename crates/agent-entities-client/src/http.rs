// crates/agent-entities-client/src/http.rs
// ============================================================================
// Module: HTTP Entity Types Client
// Description: Blocking REST implementation of `EntityTypesApi`.
// Purpose: Call the hosted entity type API with strict limits.
// Dependencies: agent-entities-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! [`HttpEntityTypesClient`] maps each [`EntityTypesApi`] call onto the REST
//! surface rooted at `{endpoint}/{api_version}`. Listing follows page tokens
//! up to a page budget. Batch entity calls return long-running operations
//! which are polled until done or the poll budget is spent.
//!
//! Security posture: redirects are disabled, cleartext endpoints require an
//! explicit opt-in, endpoint credentials are rejected, and response bodies
//! are read under a hard byte limit. Bearer tokens are attached as headers
//! and never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use agent_entities_core::AgentName;
use agent_entities_core::ApiError;
use agent_entities_core::Entity;
use agent_entities_core::EntityType;
use agent_entities_core::EntityTypeName;
use agent_entities_core::EntityTypesApi;
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::audit::ApiAuditEvent;
use crate::audit::ApiAuditEventParams;
use crate::audit::ApiAuditSink;
use crate::audit::ApiNoopAuditSink;
use crate::audit::RequestMethod;
use crate::wire::BatchCreateEntitiesRequest;
use crate::wire::BatchDeleteEntitiesRequest;
use crate::wire::ErrorEnvelope;
use crate::wire::ListEntityTypesResponse;
use crate::wire::Operation;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum bytes of a non-JSON error body echoed into error messages.
const MAX_ERROR_SNIPPET: usize = 256;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Transport settings for [`HttpEntityTypesClient`].
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` endpoints.
/// - `max_response_bytes` is a hard upper bound on response bodies.
/// - `max_pages` and `operation_max_polls` bound every loop.
#[derive(Clone, PartialEq, Eq)]
pub struct RestClientConfig {
    /// Base URL (scheme + host, optional port and path prefix).
    pub endpoint: String,
    /// API version path segment.
    pub api_version: String,
    /// Optional language code sent with reads and entity writes.
    pub language_code: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// Page size requested when listing.
    pub page_size: u32,
    /// Maximum pages followed per listing.
    pub max_pages: u32,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// User agent string for outbound requests.
    pub user_agent: String,
    /// Delay between operation polls in milliseconds.
    pub operation_poll_interval_ms: u64,
    /// Maximum operation polls.
    pub operation_max_polls: u32,
    /// Pre-issued bearer token.
    pub access_token: Option<String>,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://dialogflow.googleapis.com".to_string(),
            api_version: "v2".to_string(),
            language_code: None,
            timeout_ms: 30_000,
            max_response_bytes: 4 * 1024 * 1024,
            page_size: 100,
            max_pages: 1_000,
            allow_http: false,
            user_agent: format!("agent-entities/{}", env!("CARGO_PKG_VERSION")),
            operation_poll_interval_ms: 500,
            operation_max_polls: 120,
            access_token: None,
        }
    }
}

impl fmt::Debug for RestClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("language_code", &self.language_code)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_response_bytes", &self.max_response_bytes)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("allow_http", &self.allow_http)
            .field("user_agent", &self.user_agent)
            .field("operation_poll_interval_ms", &self.operation_poll_interval_ms)
            .field("operation_max_polls", &self.operation_max_polls)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// REST client for the entity type API.
///
/// # Invariants
/// - `base` has passed endpoint policy checks and has no trailing slash.
/// - Redirects are not followed.
pub struct HttpEntityTypesClient {
    /// Transport settings.
    config: RestClientConfig,
    /// Validated API root, `{endpoint}/{api_version}`.
    base: String,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Receives one event per request.
    audit: Arc<dyn ApiAuditSink>,
}

impl HttpEntityTypesClient {
    /// Creates a client with a no-op audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] when the endpoint violates policy
    /// and [`ApiError::Transport`] when the HTTP client cannot be built.
    pub fn new(config: RestClientConfig) -> Result<Self, ApiError> {
        let endpoint = Url::parse(config.endpoint.trim())
            .map_err(|_| ApiError::InvalidArgument("invalid endpoint url".to_string()))?;
        validate_endpoint(&endpoint, config.allow_http)?;
        let version = config.api_version.trim_matches('/');
        if version.is_empty() || version.contains(['/', '?', '#']) {
            return Err(ApiError::InvalidArgument("invalid api version".to_string()));
        }
        let base = format!("{}/{version}", endpoint.as_str().trim_end_matches('/'));
        let client = build_http_client(&config)?;
        Ok(Self {
            config,
            base,
            client,
            audit: Arc::new(ApiNoopAuditSink),
        })
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn ApiAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the transport settings.
    #[must_use]
    pub const fn config(&self) -> &RestClientConfig {
        &self.config
    }

    /// Builds the absolute URL for a resource path.
    fn resource_url(&self, resource: &str) -> Result<Url, ApiError> {
        Url::parse(&format!("{}/{resource}", self.base))
            .map_err(|_| ApiError::Protocol(format!("invalid resource path: {resource}")))
    }

    /// Adds `languageCode` when configured.
    fn with_language(&self, mut url: Url) -> Url {
        if let Some(code) = &self.config.language_code {
            url.query_pairs_mut().append_pair("languageCode", code);
        }
        url
    }

    /// Sends a request, records an audit event, and returns the body of a
    /// success response.
    fn execute(
        &self,
        method: RequestMethod,
        url: Url,
        resource: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ApiError> {
        let started = Instant::now();
        let request_bytes = body.as_ref().map_or(0, Vec::len);
        let (status, result) = self.send_once(method, url, body);
        let response_bytes = match &result {
            Ok(bytes) => bytes.len(),
            Err(_) => 0,
        };
        self.audit.record(&ApiAuditEvent::new(ApiAuditEventParams {
            method,
            resource: resource.to_string(),
            status,
            error_kind: result.as_ref().err().map(ApiError::kind),
            request_bytes,
            response_bytes,
            duration_ms: started.elapsed().as_millis(),
        }));
        result
    }

    /// Performs one request without auditing.
    fn send_once(
        &self,
        method: RequestMethod,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> (Option<u16>, Result<Vec<u8>, ApiError>) {
        let verb = match method {
            RequestMethod::Get => Method::GET,
            RequestMethod::Post => Method::POST,
            RequestMethod::Delete => Method::DELETE,
        };
        let mut request = self.client.request(verb, url);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }
        let mut response = match request.send() {
            Ok(response) => response,
            Err(err) => {
                return (None, Err(ApiError::Transport(format!("{}", err.without_url()))));
            }
        };
        let status = response.status();
        let code = status.as_u16();
        if status.is_redirection() {
            return (Some(code), Err(ApiError::Protocol("redirects are not followed".to_string())));
        }
        let bytes = match read_response_limited(&mut response, self.config.max_response_bytes) {
            Ok(bytes) => bytes,
            Err(err) => return (Some(code), Err(err)),
        };
        if status.is_success() {
            (Some(code), Ok(bytes))
        } else {
            (Some(code), Err(map_error_response(code, &bytes)))
        }
    }

    /// Sends a request and decodes a JSON response.
    fn call_json<T: DeserializeOwned>(
        &self,
        method: RequestMethod,
        url: Url,
        resource: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, ApiError> {
        let bytes = self.execute(method, url, resource, body)?;
        serde_json::from_slice(&bytes)
            .map_err(|err| ApiError::Protocol(format!("invalid response json: {err}")))
    }

    /// Posts a batch request and waits for the resulting operation.
    fn run_batch<B: Serialize>(&self, resource: &str, body: &B) -> Result<(), ApiError> {
        let url = self.resource_url(resource)?;
        let payload = encode_body(body)?;
        let operation: Operation =
            self.call_json(RequestMethod::Post, url, resource, Some(payload))?;
        self.await_operation(operation)
    }

    /// Polls an operation until it is done.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::OperationFailed`] when the operation carries an
    /// error and [`ApiError::OperationTimeout`] when the poll budget is spent.
    fn await_operation(&self, operation: Operation) -> Result<(), ApiError> {
        let mut current = operation;
        let mut polls: u32 = 0;
        loop {
            if let Some(status) = &current.error {
                return Err(ApiError::OperationFailed(format!(
                    "{} (code {})",
                    status.message, status.code
                )));
            }
            if current.done {
                return Ok(());
            }
            validate_operation_name(&current.name)?;
            if polls >= self.config.operation_max_polls {
                return Err(ApiError::OperationTimeout(current.name));
            }
            polls += 1;
            if self.config.operation_poll_interval_ms > 0 {
                thread::sleep(Duration::from_millis(self.config.operation_poll_interval_ms));
            }
            let url = self.resource_url(&current.name)?;
            let name = current.name.clone();
            current = self.call_json(RequestMethod::Get, url, &name, None)?;
            if current.name.is_empty() {
                current.name = name;
            }
        }
    }
}

impl EntityTypesApi for HttpEntityTypesClient {
    fn list_entity_types(&self, agent: &AgentName) -> Result<Vec<EntityType>, ApiError> {
        let resource = format!("{agent}/entityTypes");
        let mut entity_types = Vec::new();
        let mut page_token: Option<String> = None;
        for _ in 0 .. self.config.max_pages {
            let mut url = self.resource_url(&resource)?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("pageSize", &self.config.page_size.to_string());
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }
            let url = self.with_language(url);
            let page: ListEntityTypesResponse =
                self.call_json(RequestMethod::Get, url, &resource, None)?;
            entity_types.extend(page.entity_types);
            match page.next_page_token.filter(|token| !token.is_empty()) {
                None => return Ok(entity_types),
                Some(next) if page_token.as_ref() == Some(&next) => {
                    return Err(ApiError::Protocol("page token did not advance".to_string()));
                }
                Some(next) => page_token = Some(next),
            }
        }
        Err(ApiError::Protocol(format!(
            "listing exceeded {} pages",
            self.config.max_pages
        )))
    }

    fn get_entity_type(&self, name: &EntityTypeName) -> Result<EntityType, ApiError> {
        let resource = name.to_string();
        let url = self.with_language(self.resource_url(&resource)?);
        self.call_json(RequestMethod::Get, url, &resource, None)
    }

    fn create_entity_type(
        &self,
        agent: &AgentName,
        entity_type: &EntityType,
    ) -> Result<EntityType, ApiError> {
        let resource = format!("{agent}/entityTypes");
        let url = self.with_language(self.resource_url(&resource)?);
        let payload = encode_body(entity_type)?;
        self.call_json(RequestMethod::Post, url, &resource, Some(payload))
    }

    fn delete_entity_type(&self, name: &EntityTypeName) -> Result<(), ApiError> {
        let resource = name.to_string();
        let url = self.resource_url(&resource)?;
        self.execute(RequestMethod::Delete, url, &resource, None)?;
        Ok(())
    }

    fn batch_create_entities(
        &self,
        name: &EntityTypeName,
        entities: &[Entity],
    ) -> Result<(), ApiError> {
        let body = BatchCreateEntitiesRequest {
            entities: entities.to_vec(),
            language_code: self.config.language_code.clone(),
        };
        self.run_batch(&format!("{name}/entities:batchCreate"), &body)
    }

    fn batch_delete_entities(
        &self,
        name: &EntityTypeName,
        values: &[String],
    ) -> Result<(), ApiError> {
        let body = BatchDeleteEntitiesRequest {
            entity_values: values.to_vec(),
            language_code: self.config.language_code.clone(),
        };
        self.run_batch(&format!("{name}/entities:batchDelete"), &body)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates URL scheme and credential policy.
fn validate_endpoint(url: &Url, allow_http: bool) -> Result<(), ApiError> {
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        "http" => {
            return Err(ApiError::InvalidArgument(
                "http endpoints require allow_http".to_string(),
            ));
        }
        _ => return Err(ApiError::InvalidArgument("unsupported url scheme".to_string())),
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ApiError::InvalidArgument("url credentials are not allowed".to_string()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ApiError::InvalidArgument("url host required".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ApiError::InvalidArgument(
            "endpoint must not include a query or fragment".to_string(),
        ));
    }
    Ok(())
}

/// Rejects operation names that would escape the API root.
fn validate_operation_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::Protocol("operation has no name".to_string()));
    }
    let unsafe_segment = name.split('/').any(|segment| segment.is_empty() || segment == "..");
    if unsafe_segment
        || name.contains("://")
        || name.chars().any(|ch| ch.is_whitespace() || ch.is_control() || "?#%\\".contains(ch))
    {
        return Err(ApiError::Protocol(format!("invalid operation name: {name}")));
    }
    Ok(())
}

/// Builds the blocking HTTP client.
fn build_http_client(config: &RestClientConfig) -> Result<Client, ApiError> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(config.user_agent.clone())
        .redirect(Policy::none())
        .build()
        .map_err(|_| ApiError::Transport("http client build failed".to_string()))
}

/// Serializes a request body.
fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body)
        .map_err(|err| ApiError::Protocol(format!("request serialization failed: {err}")))
}

/// Maps a non-success response onto a typed error.
///
/// The canonical status label wins when present; otherwise the HTTP code
/// decides.
fn map_error_response(code: u16, body: &[u8]) -> ApiError {
    let (status, message) = match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.status, envelope.error.message),
        Err(_) => (String::new(), error_snippet(body)),
    };
    let by_status = match status.as_str() {
        "NOT_FOUND" => Some(ApiError::NotFound(message.clone())),
        "PERMISSION_DENIED" => Some(ApiError::PermissionDenied(message.clone())),
        "UNAUTHENTICATED" => Some(ApiError::Unauthenticated(message.clone())),
        "INVALID_ARGUMENT" => Some(ApiError::InvalidArgument(message.clone())),
        "ALREADY_EXISTS" => Some(ApiError::AlreadyExists(message.clone())),
        _ => None,
    };
    if let Some(err) = by_status {
        return err;
    }
    if !status.is_empty() {
        return ApiError::Status {
            code,
            status,
            message,
        };
    }
    match code {
        404 => ApiError::NotFound(message),
        403 => ApiError::PermissionDenied(message),
        401 => ApiError::Unauthenticated(message),
        400 => ApiError::InvalidArgument(message),
        409 => ApiError::AlreadyExists(message),
        _ => ApiError::Status {
            code,
            status,
            message,
        },
    }
}

/// Returns a bounded, lossy text snippet of a response body.
fn error_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut end = text.len().min(MAX_ERROR_SNIPPET);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[.. end].trim().to_string()
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| ApiError::Protocol("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(ApiError::Protocol("response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|_| ApiError::Transport("failed to read response".to_string()))?;
    if buf.len() > max_bytes {
        return Err(ApiError::Protocol("response exceeds size limit".to_string()));
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected)
            .map_err(|_| ApiError::Protocol("invalid response length".to_string()))?;
        if buf.len() < expected {
            return Err(ApiError::Transport("response truncated".to_string()));
        }
    }
    Ok(buf)
}

// crates/agent-entities-client/src/audit.rs
// ============================================================================
// Module: Request Audit Logging
// Description: Structured audit events for outbound API requests.
// Purpose: Emit JSON-lines request records without logging payloads.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every outbound request yields one [`ApiAuditEvent`]. Sinks write the
//! event as a single JSON line. Bearer tokens, request bodies, and response
//! bodies are never part of an event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// HTTP method used for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl RequestMethod {
    /// Returns the method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// Request outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiOutcome {
    /// Success status and readable body.
    Success,
    /// Any failure, including transport errors.
    Error,
}

/// Audit record for one outbound request.
#[derive(Debug, Clone, Serialize)]
pub struct ApiAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: RequestMethod,
    /// Resource path relative to the API version root, without query.
    pub resource: String,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    /// Request outcome.
    pub outcome: ApiOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Wall-clock duration of the request.
    pub duration_ms: u128,
}

/// Inputs required to construct an audit event.
pub struct ApiAuditEventParams {
    /// HTTP method.
    pub method: RequestMethod,
    /// Resource path.
    pub resource: String,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    /// Normalized error kind label; `None` on success.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Wall-clock duration of the request.
    pub duration_ms: u128,
}

impl ApiAuditEvent {
    /// Creates a new audit event stamped with the current time.
    #[must_use]
    pub fn new(params: ApiAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let outcome =
            if params.error_kind.is_some() { ApiOutcome::Error } else { ApiOutcome::Success };
        Self {
            event: "api_request",
            timestamp_ms,
            method: params.method,
            resource: params.resource,
            status: params.status,
            outcome,
            error_kind: params.error_kind,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
            duration_ms: params.duration_ms,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for request events.
pub trait ApiAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &ApiAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct ApiStderrAuditSink;

impl ApiAuditSink for ApiStderrAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct ApiFileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl ApiFileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ApiAuditSink for ApiFileAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct ApiNoopAuditSink;

impl ApiAuditSink for ApiNoopAuditSink {
    fn record(&self, _event: &ApiAuditEvent) {}
}

// system-tests/tests/helpers/api_stub.rs
// ============================================================================
// Module: Entity Types API Stub
// Description: Local REST stub of the entity types API for system-tests.
// Purpose: Exercise the HTTP client and CLI end to end without the hosted service.
// Dependencies: agent-entities-core, agent-entities-client, tiny_http, url
// ============================================================================

//! ## Overview
//! The stub serves the v2 entity types surface from an in-memory backend.
//! Listings are paginated with a small server-side page cap so clients must
//! follow `nextPageToken`. Batch calls return pending operations that report
//! `done` on the first poll.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use agent_entities_client::wire::BatchCreateEntitiesRequest;
use agent_entities_client::wire::BatchDeleteEntitiesRequest;
use agent_entities_client::wire::ErrorEnvelope;
use agent_entities_client::wire::ListEntityTypesResponse;
use agent_entities_client::wire::Operation;
use agent_entities_core::AgentName;
use agent_entities_core::ApiError;
use agent_entities_core::EntityType;
use agent_entities_core::EntityTypeId;
use agent_entities_core::EntityTypeName;
use agent_entities_core::EntityTypesApi;
use agent_entities_core::InMemoryEntityTypes;
use agent_entities_core::ProjectId;
use serde::Serialize;
use tiny_http::Header;
use tiny_http::Request;
use tiny_http::Response;
use tiny_http::Server;
use url::Url;

/// Stub behavior knobs.
#[derive(Debug, Clone)]
pub struct StubOptions {
    /// Bearer token every request must carry, when set.
    pub required_token: Option<String>,
    /// Maximum entity types returned per page regardless of `pageSize`.
    pub page_cap: usize,
}

impl Default for StubOptions {
    fn default() -> Self {
        Self {
            required_token: None,
            page_cap: 2,
        }
    }
}

/// Request metadata captured by the stub.
#[derive(Debug, Clone, Serialize)]
pub struct StubRequest {
    /// HTTP method.
    pub method: String,
    /// Path and query.
    pub url: String,
}

/// Shared state for the stub server thread.
struct StubState {
    backend: InMemoryEntityTypes,
    options: StubOptions,
    requests: Mutex<Vec<StubRequest>>,
    next_operation: AtomicU64,
}

/// Handle for a running API stub. The server stops on drop.
pub struct ApiStubHandle {
    endpoint: String,
    state: Arc<StubState>,
    shutdown: Arc<AtomicBool>,
    join: Option<thread::JoinHandle<()>>,
}

impl ApiStubHandle {
    /// Returns the endpoint (scheme, host, and port) to configure clients with.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the backend so suites can seed or inspect state directly.
    pub fn backend(&self) -> &InMemoryEntityTypes {
        &self.state.backend
    }

    /// Returns captured requests.
    pub fn requests(&self) -> Vec<StubRequest> {
        self.state.requests.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }
}

impl Drop for ApiStubHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Starts the stub on an ephemeral loopback port.
pub fn spawn_api_stub(options: StubOptions) -> Result<ApiStubHandle, String> {
    let server = Server::http("127.0.0.1:0").map_err(|err| format!("stub bind failed: {err}"))?;
    let addr = server
        .server_addr()
        .to_ip()
        .ok_or_else(|| "stub bound a non-IP address".to_string())?;
    let state = Arc::new(StubState {
        backend: InMemoryEntityTypes::new(),
        options,
        requests: Mutex::new(Vec::new()),
        next_operation: AtomicU64::new(1),
    });
    let shutdown = Arc::new(AtomicBool::new(false));
    let thread_state = Arc::clone(&state);
    let thread_shutdown = Arc::clone(&shutdown);
    let join = thread::spawn(move || {
        while !thread_shutdown.load(Ordering::SeqCst) {
            match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(request)) => handle_request(&thread_state, request),
                Ok(None) => {}
                Err(_) => break,
            }
        }
    });
    Ok(ApiStubHandle {
        endpoint: format!("http://{addr}"),
        state,
        shutdown,
        join: Some(join),
    })
}

/// Status and JSON body produced for a request.
type StubReply = (u16, String);

fn handle_request(state: &StubState, mut request: Request) {
    let method = request.method().to_string();
    let raw_url = request.url().to_string();
    if let Ok(mut requests) = state.requests.lock() {
        requests.push(StubRequest {
            method: method.clone(),
            url: raw_url.clone(),
        });
    }
    let authorized = state.options.required_token.as_ref().is_none_or(|token| {
        let expected = format!("Bearer {token}");
        request
            .headers()
            .iter()
            .any(|header| header.field.equiv("Authorization") && header.value.as_str() == expected)
    });
    let mut body = String::new();
    let (status, payload) = if !authorized {
        error_reply(401, "UNAUTHENTICATED", "request had invalid authentication credentials")
    } else if request.as_reader().read_to_string(&mut body).is_err() {
        error_reply(400, "INVALID_ARGUMENT", "request body is not UTF-8")
    } else {
        route(state, &method, &raw_url, &body)
    };
    let mut response = Response::from_string(payload).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response.add_header(header);
    }
    let _ = request.respond(response);
}

fn route(state: &StubState, method: &str, raw_url: &str, body: &str) -> StubReply {
    let Ok(url) = Url::parse(&format!("http://stub{raw_url}")) else {
        return error_reply(400, "INVALID_ARGUMENT", "unparseable request url");
    };
    let segments: Vec<&str> = url.path().split('/').filter(|segment| !segment.is_empty()).collect();
    let ["v2", "projects", project, "agent", rest @ ..] = segments.as_slice() else {
        return error_reply(404, "NOT_FOUND", "unknown resource");
    };
    let project = match ProjectId::new(*project) {
        Ok(project) => project,
        Err(err) => return error_reply(400, "INVALID_ARGUMENT", &err.to_string()),
    };
    let backend = &state.backend;
    match (method, rest) {
        ("GET", ["entityTypes"]) => list(state, &AgentName::new(project), &url),
        ("POST", ["entityTypes"]) => match serde_json::from_str::<EntityType>(body) {
            Ok(entity_type) => {
                json_reply(backend.create_entity_type(&AgentName::new(project), &entity_type))
            }
            Err(err) => error_reply(400, "INVALID_ARGUMENT", &err.to_string()),
        },
        ("GET", ["entityTypes", id]) => {
            with_name(project, id, |name| json_reply(backend.get_entity_type(&name)))
        }
        ("DELETE", ["entityTypes", id]) => with_name(project, id, |name| {
            json_reply(backend.delete_entity_type(&name).map(|()| serde_json::json!({})))
        }),
        ("POST", ["entityTypes", id, "entities:batchCreate"]) => with_name(project, id, |name| {
            match serde_json::from_str::<BatchCreateEntitiesRequest>(body) {
                Ok(batch) => operation_reply(
                    state,
                    &name,
                    backend.batch_create_entities(&name, &batch.entities),
                ),
                Err(err) => error_reply(400, "INVALID_ARGUMENT", &err.to_string()),
            }
        }),
        ("POST", ["entityTypes", id, "entities:batchDelete"]) => with_name(project, id, |name| {
            match serde_json::from_str::<BatchDeleteEntitiesRequest>(body) {
                Ok(batch) => operation_reply(
                    state,
                    &name,
                    backend.batch_delete_entities(&name, &batch.entity_values),
                ),
                Err(err) => error_reply(400, "INVALID_ARGUMENT", &err.to_string()),
            }
        }),
        ("GET", ["operations", operation]) => to_json(&Operation {
            name: format!("projects/{project}/agent/operations/{operation}"),
            done: true,
            error: None,
        }),
        _ => error_reply(404, "NOT_FOUND", "unknown resource"),
    }
}

fn list(state: &StubState, agent: &AgentName, url: &Url) -> StubReply {
    let mut page_size = state.options.page_cap.max(1);
    let mut offset = 0_usize;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "pageSize" => match value.parse::<usize>() {
                Ok(size) if size > 0 => page_size = page_size.min(size),
                _ => return error_reply(400, "INVALID_ARGUMENT", "pageSize must be positive"),
            },
            "pageToken" => match value.parse::<usize>() {
                Ok(token) => offset = token,
                Err(_) => return error_reply(400, "INVALID_ARGUMENT", "malformed pageToken"),
            },
            _ => {}
        }
    }
    let entity_types = match state.backend.list_entity_types(agent) {
        Ok(entity_types) => entity_types,
        Err(err) => return api_error_reply(&err),
    };
    let end = offset.saturating_add(page_size).min(entity_types.len());
    let page = entity_types.get(offset.min(end)..end).map(<[EntityType]>::to_vec).unwrap_or_default();
    let next_page_token = (end < entity_types.len()).then(|| end.to_string());
    to_json(&ListEntityTypesResponse {
        entity_types: page,
        next_page_token,
    })
}

fn with_name(
    project: ProjectId,
    id: &str,
    handler: impl FnOnce(EntityTypeName) -> StubReply,
) -> StubReply {
    match EntityTypeId::new(id) {
        Ok(id) => handler(EntityTypeName::new(project, id)),
        Err(err) => error_reply(400, "INVALID_ARGUMENT", &err.to_string()),
    }
}

fn operation_reply(state: &StubState, name: &EntityTypeName, result: Result<(), ApiError>) -> StubReply {
    if let Err(err) = result {
        return api_error_reply(&err);
    }
    let sequence = state.next_operation.fetch_add(1, Ordering::SeqCst);
    to_json(&Operation {
        name: format!("projects/{}/agent/operations/op-{sequence}", name.project()),
        done: false,
        error: None,
    })
}

fn json_reply<T: Serialize>(result: Result<T, ApiError>) -> StubReply {
    match result {
        Ok(value) => to_json(&value),
        Err(err) => api_error_reply(&err),
    }
}

fn to_json<T: Serialize>(value: &T) -> StubReply {
    match serde_json::to_string(value) {
        Ok(body) => (200, body),
        Err(err) => error_reply(500, "INTERNAL", &err.to_string()),
    }
}

fn api_error_reply(err: &ApiError) -> StubReply {
    match err {
        ApiError::NotFound(message) => error_reply(404, "NOT_FOUND", message),
        ApiError::AlreadyExists(message) => error_reply(409, "ALREADY_EXISTS", message),
        ApiError::InvalidArgument(message) => error_reply(400, "INVALID_ARGUMENT", message),
        other => error_reply(500, "INTERNAL", &other.to_string()),
    }
}

fn error_reply(code: u16, status: &str, message: &str) -> StubReply {
    let body = serde_json::to_string(&ErrorEnvelope::new(code, status, message))
        .unwrap_or_else(|_| "{}".to_string());
    (code, body)
}

//! Integration tests for the portfolio admin console.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p portfolio-integration-tests
//! ```
//!
//! Each test starts a [`MockBackend`]: an in-process axum server on an
//! ephemeral port that serves the portfolio REST routes from memory, records
//! every request it receives, and can be scripted to fail.
//!
//! # Test Categories
//!
//! - `client` - Headers, error normalization, envelopes
//! - `projects` / `certifications` - Multipart CRUD through the stores
//! - `contacts` - Paging, search, detail and bulk delete

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use portfolio_console::{ApiClient, Console, CredentialSource};
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use url::Url;

/// Token accepted when [`MockBackend::require_token`] is enabled.
pub const VALID_TOKEN: &str = "test-admin-token";

/// Collections served by the mock backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Projects,
    Certifications,
    Contacts,
}

impl Collection {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "projects" => Some(Self::Projects),
            "certifications" => Some(Self::Certifications),
            "contacts" => Some(Self::Contacts),
            _ => None,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Projects => "Project",
            Self::Certifications => "Certification",
            Self::Contacts => "Contact",
        }
    }

    const fn id_prefix(self) -> &'static str {
        match self {
            Self::Projects => "p",
            Self::Certifications => "c",
            Self::Contacts => "m",
        }
    }
}

/// A file part received in a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

/// A request as seen by the mock backend.
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub content_type: Option<String>,
    /// Multipart text parts, in order, exactly as sent.
    pub fields: Vec<(String, String)>,
    pub files: Vec<RecordedFile>,
    pub json: Option<Value>,
}

impl RecordedRequest {
    /// Raw text of the first multipart part named `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

struct ScriptedFailure {
    method: Method,
    path: String,
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

#[derive(Default)]
struct BackendState {
    projects: Vec<Value>,
    certifications: Vec<Value>,
    contacts: Vec<Value>,
    requests: Vec<RecordedRequest>,
    failures: VecDeque<ScriptedFailure>,
    required_token: Option<String>,
    wrap_responses: bool,
    next_id: u64,
}

impl BackendState {
    fn records(&mut self, collection: Collection) -> &mut Vec<Value> {
        match collection {
            Collection::Projects => &mut self.projects,
            Collection::Certifications => &mut self.certifications,
            Collection::Contacts => &mut self.contacts,
        }
    }

    fn take_failure(&mut self, method: &Method, path: &str) -> Option<ScriptedFailure> {
        let index = self
            .failures
            .iter()
            .position(|failure| failure.method == *method && failure.path == path)?;
        self.failures.remove(index)
    }

    fn next_id(&mut self, collection: Collection) -> String {
        self.next_id += 1;
        format!("{}-new-{}", collection.id_prefix(), self.next_id)
    }
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-process portfolio backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state = Shared::default();
        let router = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");

        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Mock backend stopped");
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL of the running server.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Mock backend URL is valid")
    }

    /// A console wired to this backend.
    #[must_use]
    pub fn console(&self, credential: CredentialSource) -> Console {
        Console::new(self.client(credential))
    }

    /// A console authenticated with [`VALID_TOKEN`].
    #[must_use]
    pub fn authenticated_console(&self) -> Console {
        self.console(CredentialSource::Static(SecretString::from(VALID_TOKEN)))
    }

    /// A bare client wired to this backend.
    #[must_use]
    pub fn client(&self, credential: CredentialSource) -> ApiClient {
        ApiClient::new(self.url(), credential, Duration::from_secs(5))
            .expect("Failed to build API client")
    }

    /// Replace a collection's records.
    pub fn seed(&self, collection: Collection, records: Vec<Value>) {
        *lock(&self.state).records(collection) = records;
    }

    /// Current records of a collection.
    #[must_use]
    pub fn records(&self, collection: Collection) -> Vec<Value> {
        lock(&self.state).records(collection).clone()
    }

    /// Reject requests without `Authorization: Bearer <VALID_TOKEN>`.
    pub fn require_token(&self) {
        lock(&self.state).required_token = Some(VALID_TOKEN.to_string());
    }

    /// Wrap every success body in `{"data": ...}`.
    pub fn wrap_responses(&self) {
        lock(&self.state).wrap_responses = true;
    }

    /// Answer the next `method path` request with `status` and a JSON body.
    pub fn fail_next(&self, method: Method, path: &str, status: u16, body: &Value) {
        self.script(method, path, status, "application/json", body.to_string());
    }

    /// Answer the next `method path` request with `status` and a raw body.
    pub fn fail_next_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.script(method, path, status, "text/plain", body.to_string());
    }

    fn script(
        &self,
        method: Method,
        path: &str,
        status: u16,
        content_type: &'static str,
        body: String,
    ) {
        lock(&self.state).failures.push_back(ScriptedFailure {
            method,
            path: path.to_string(),
            status: StatusCode::from_u16(status).expect("Valid status code"),
            content_type,
            body,
        });
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.state).requests.last().cloned()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(State(state): State<Shared>, request: Request) -> Response {
    let mut recorded = record_head(request.method(), request.uri(), request.headers());
    let method = request.method().clone();

    if recorded
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    {
        read_multipart(request, &mut recorded).await;
    } else {
        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        recorded.json = serde_json::from_slice(&bytes).ok();
    }

    let mut state = lock(&state);
    state.requests.push(recorded.clone());

    if let Some(failure) = state.take_failure(&method, &recorded.path) {
        return Response::builder()
            .status(failure.status)
            .header(header::CONTENT_TYPE, failure.content_type)
            .body(Body::from(failure.body))
            .expect("Valid scripted response");
    }

    if let Some(token) = &state.required_token {
        match recorded.authorization.as_deref() {
            None => {
                return reply(StatusCode::UNAUTHORIZED, &json!({"message": "No token provided"}));
            }
            Some(value) if value != format!("Bearer {token}") => {
                return reply(StatusCode::UNAUTHORIZED, &json!({"message": "Invalid token"}));
            }
            Some(_) => {}
        }
    }

    route(&mut state, &method, &recorded)
}

fn record_head(method: &Method, uri: &axum::http::Uri, headers: &HeaderMap) -> RecordedRequest {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_owned),
        authorization: header("authorization"),
        request_id: header("x-request-id"),
        content_type: header("content-type"),
        ..RecordedRequest::default()
    }
}

async fn read_multipart(request: Request, recorded: &mut RecordedRequest) {
    let Ok(mut multipart) = Multipart::from_request(request, &()).await else {
        return;
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let Ok(bytes) = field.bytes().await else {
            return;
        };

        if file_name.is_some() {
            recorded.files.push(RecordedFile {
                field: name,
                file_name,
                content_type,
                size: bytes.len(),
            });
        } else {
            recorded
                .fields
                .push((name, String::from_utf8_lossy(&bytes).into_owned()));
        }
    }
}

fn reply(status: StatusCode, body: &Value) -> Response {
    (status, axum::Json(body.clone())).into_response()
}

fn success(state: &BackendState, status: StatusCode, body: Value) -> Response {
    if state.wrap_responses {
        reply(status, &json!({ "data": body }))
    } else {
        reply(status, &body)
    }
}

fn not_found(collection: Collection) -> Response {
    reply(
        StatusCode::NOT_FOUND,
        &json!({"message": format!("{} not found", collection.label())}),
    )
}

fn route(state: &mut BackendState, method: &Method, request: &RecordedRequest) -> Response {
    let decoded: Vec<String> = request
        .path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .collect();
    let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();

    let collection = match segments.as_slice() {
        ["api", name, ..] => Collection::from_segment(name),
        _ => None,
    };
    let Some(collection) = collection else {
        return reply(StatusCode::NOT_FOUND, &json!({"message": "Route not found"}));
    };

    match (method.as_str(), segments.as_slice()) {
        ("GET", [_, _]) if collection == Collection::Contacts => list_contacts(state, request),
        ("GET", [_, _]) => {
            let records = state.records(collection).clone();
            success(state, StatusCode::OK, Value::Array(records))
        }
        ("POST", [_, "contacts", "bulk-delete"]) => bulk_delete(state, request),
        ("POST", [_, _, action]) if action.starts_with("add-") => {
            let mut record = payload_record(collection, request);
            let id = state.next_id(collection);
            record.insert("_id".to_string(), Value::String(id));
            if collection == Collection::Contacts {
                record.insert("createdAt".to_string(), json!("2024-05-01T10:00:00Z"));
            }
            let record = Value::Object(record);
            state.records(collection).push(record.clone());
            success(state, StatusCode::CREATED, record)
        }
        ("PUT", [_, _, "update", id]) => {
            let fields = payload_record(collection, request);
            let Some(existing) = find_mut(state.records(collection), id) else {
                return not_found(collection);
            };
            if let Value::Object(existing) = existing {
                existing.extend(fields);
            }
            let updated = existing.clone();
            success(state, StatusCode::OK, updated)
        }
        ("DELETE", [_, _, "delete", id]) => {
            let records = state.records(collection);
            let before = records.len();
            records.retain(|record| record["_id"] != *id);
            if records.len() == before {
                return not_found(collection);
            }
            reply(
                StatusCode::OK,
                &json!({"message": format!("{} deleted", collection.label())}),
            )
        }
        ("GET", [_, "contacts", id]) => match find_mut(state.records(collection), id) {
            Some(found) => {
                let found = found.clone();
                success(state, StatusCode::OK, found)
            }
            None => not_found(collection),
        },
        _ => reply(StatusCode::NOT_FOUND, &json!({"message": "Route not found"})),
    }
}

fn find_mut<'a>(records: &'a mut [Value], id: &str) -> Option<&'a mut Value> {
    records.iter_mut().find(|record| record["_id"] == id)
}

/// Build a record from a JSON body or from multipart parts.
fn payload_record(collection: Collection, request: &RecordedRequest) -> Map<String, Value> {
    if let Some(Value::Object(json)) = &request.json {
        return json.clone();
    }

    let mut record = Map::new();
    for (name, text) in &request.fields {
        let value = match serde_json::from_str::<Value>(text) {
            Ok(array @ Value::Array(_)) => array,
            _ => Value::String(text.clone()),
        };
        record.insert(name.clone(), value);
    }
    for file in &request.files {
        let stored = format!("/uploads/{}", file.file_name.as_deref().unwrap_or("upload"));
        record.insert(file.field.clone(), Value::String(stored));
    }

    if collection == Collection::Projects {
        let mut links = Map::new();
        if let Some(repository) = record.remove("repository") {
            links.insert("repository".to_string(), repository);
        }
        if let Some(live_demo) = record.remove("liveDemo") {
            links.insert("liveDemo".to_string(), live_demo);
        }
        if !links.is_empty() {
            record.insert("links".to_string(), Value::Object(links));
        }
    }

    record
}

fn list_contacts(state: &mut BackendState, request: &RecordedRequest) -> Response {
    let params: Vec<(String, String)> = request
        .query
        .as_deref()
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    let param = |name: &str| {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    let page: usize = param("page").and_then(|v| v.parse().ok()).unwrap_or(1).max(1);
    let limit: usize = param("limit").and_then(|v| v.parse().ok()).unwrap_or(10).max(1);
    let search = param("search").map(|term| term.to_lowercase());

    let matching: Vec<Value> = state
        .contacts
        .iter()
        .filter(|record| {
            search.as_ref().is_none_or(|term| {
                ["name", "email", "companyName", "message"].iter().any(|key| {
                    record[*key]
                        .as_str()
                        .is_some_and(|value| value.to_lowercase().contains(term))
                })
            })
        })
        .cloned()
        .collect();

    let total = matching.len();
    let data: Vec<Value> = matching
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    reply(
        StatusCode::OK,
        &json!({
            "data": data,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": total,
                "totalPages": total.div_ceil(limit),
            }
        }),
    )
}

fn bulk_delete(state: &mut BackendState, request: &RecordedRequest) -> Response {
    let ids: Vec<String> = request
        .json
        .as_ref()
        .and_then(|body| body["ids"].as_array())
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default();

    if ids.is_empty() {
        return reply(StatusCode::BAD_REQUEST, &json!({"message": "No ids provided"}));
    }

    let before = state.contacts.len();
    state
        .contacts
        .retain(|record| !ids.iter().any(|id| record["_id"] == id.as_str()));

    reply(
        StatusCode::OK,
        &json!({"deletedCount": before - state.contacts.len()}),
    )
}

/// A project record as the backend stores it.
#[must_use]
pub fn project_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "duration": "3 months",
        "description": ["Built the thing"],
        "techStack": ["Rust", "Axum"],
        "clientName": "Acme",
        "targetAudience": ["Developers"],
        "features": ["Fast"],
        "role": "Lead",
        "links": {"repository": "https://github.com/acme/thing"},
        "image": "/uploads/thing.png"
    })
}

/// A certification record as the backend stores it.
#[must_use]
pub fn certification_json(id: &str, course_name: &str) -> Value {
    json!({
        "_id": id,
        "courseName": course_name,
        "mode": "Online",
        "provider": "Coursera",
        "duration": "6 weeks",
        "completionDate": "2024-01-15",
        "keyLearnings": ["Ownership"],
        "certificate": "/uploads/cert.pdf"
    })
}

/// A contact response record as the backend stores it.
#[must_use]
pub fn contact_json(id: &str, name: &str, email: &str, message: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "email": email,
        "companyName": "Acme",
        "message": message,
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

// system-tests/tests/helpers/stub_service.rs
// ============================================================================
// Module: Stub Record Service
// Description: Minimal in-memory role-based HTTP service for system-tests.
// Purpose: Give the harness a real system under test with rejections to probe.
// Dependencies: axum, scenario-probe-core, tokio, time
// ============================================================================

//! ## Overview
//! The stub models only the generic contract the harness exercises: per-role
//! registration and login issuing opaque bearer tokens, owner-private CRUD on
//! a `record` resource with soft deletion, and owner-scoped listings with an
//! optional status filter plus pagination. Business rules are deliberately
//! minimal; the harness only ever asserts that rejections occur, never which
//! error code they carry.

use std::collections::BTreeMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use scenario_probe_core::fixture;
use serde_json::Value;
use serde_json::json;
use time::Duration as TimeDuration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

/// Minimum secret length the stub's registration policy accepts.
const MIN_SECRET_LENGTH: usize = 8;
/// Default page size applied when a listing omits `limit`.
const DEFAULT_LIMIT: u32 = 20;

/// Handler response alias: status plus JSON body.
type Reply = (StatusCode, Json<Value>);

// ============================================================================
// SECTION: State
// ============================================================================

/// Registered actor entry.
#[derive(Clone)]
struct StoredActor {
    secret: String,
    role: String,
}

/// Stored record entry, kept in creation order.
#[derive(Clone)]
struct StoredRecord {
    id: String,
    owner: String,
    status: String,
    body: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    deleted: bool,
}

/// Shared in-memory service data.
#[derive(Default)]
struct ServiceData {
    /// Actors keyed by unique identifier.
    actors: BTreeMap<String, StoredActor>,
    /// Session tokens mapped to actor identifiers.
    sessions: BTreeMap<String, String>,
    /// Records in creation order.
    records: Vec<StoredRecord>,
}

/// Cloneable handler state.
#[derive(Clone, Default)]
struct ServiceState {
    inner: Arc<Mutex<ServiceData>>,
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle for the spawned stub service.
pub struct StubServiceHandle {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StubServiceHandle {
    /// Returns the service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for StubServiceHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns the stub service on a free loopback port.
pub fn spawn_stub_service() -> Result<StubServiceHandle, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("stub service bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("stub service listener nonblocking failed: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("stub service local addr failed: {err}"))?;
    let base_url = format!("http://{addr}");

    let state = ServiceState::default();
    let app = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/records", post(create_record).get(list_records))
        .route(
            "/records/:id",
            get(read_record).put(update_record).delete(delete_record),
        )
        .with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let runtime = match Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(error) => {
                let _ = error;
                return;
            }
        };
        runtime.block_on(async move {
            let listener = match tokio::net::TcpListener::from_std(listener) {
                Ok(listener) => listener,
                Err(error) => {
                    let _ = error;
                    return;
                }
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(StubServiceHandle {
        base_url,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}

// ============================================================================
// SECTION: Handler Plumbing
// ============================================================================

/// Builds an error reply with a stable message field.
fn error_reply(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "message": message })))
}

/// Runs a closure against the locked service data, failing closed on poison.
fn with_data<T>(
    state: &ServiceState,
    operate: impl FnOnce(&mut ServiceData) -> T,
) -> Result<T, Reply> {
    state
        .inner
        .lock()
        .map(|mut data| operate(&mut data))
        .map_err(|_| error_reply(StatusCode::INTERNAL_SERVER_ERROR, "state lock poisoned"))
}

/// Resolves the bearer token in the request headers to an actor identifier.
fn authenticate(data: &ServiceData, headers: &HeaderMap) -> Result<String, Reply> {
    let token = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| error_reply(StatusCode::UNAUTHORIZED, "missing bearer token"))?;
    data.sessions
        .get(token)
        .cloned()
        .ok_or_else(|| error_reply(StatusCode::UNAUTHORIZED, "unknown session token"))
}

/// Renders a stored record as its wire form.
fn record_json(record: &StoredRecord) -> Value {
    json!({
        "id": record.id,
        "owner": record.owner,
        "status": record.status,
        "body": record.body,
        "created_at": render_timestamp(record.created_at),
        "updated_at": render_timestamp(record.updated_at),
    })
}

/// Formats a timestamp as RFC 3339.
fn render_timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

/// Extracts a required string field from a JSON body.
fn required_text(body: &Value, field: &str) -> Result<String, Reply> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| {
            error_reply(StatusCode::UNPROCESSABLE_ENTITY, &format!("field `{field}` is required"))
        })
}

/// Issues a fresh session token for an identifier.
fn issue_token(data: &mut ServiceData, identifier: &str) -> String {
    let token = format!("tok-{}", fixture::uuid());
    data.sessions.insert(token.clone(), identifier.to_string());
    token
}

// ============================================================================
// SECTION: Auth Handlers
// ============================================================================

/// Liveness probe.
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Registers a new actor and issues a session token.
async fn register(State(state): State<ServiceState>, Json(body): Json<Value>) -> Reply {
    let outcome = with_data(&state, move |data| {
        let identifier = required_text(&body, "identifier")?;
        let secret = required_text(&body, "secret")?;
        let role = required_text(&body, "role")?;
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(error_reply(StatusCode::UNPROCESSABLE_ENTITY, "secret is too weak"));
        }
        if data.actors.contains_key(&identifier) {
            return Err(error_reply(StatusCode::CONFLICT, "identifier already registered"));
        }
        data.actors.insert(identifier.clone(), StoredActor {
            secret,
            role: role.clone(),
        });
        let token = issue_token(data, &identifier);
        Ok((
            StatusCode::CREATED,
            Json(json!({ "token": token, "identifier": identifier, "role": role })),
        ))
    });
    outcome.and_then(|inner| inner).unwrap_or_else(|reply| reply)
}

/// Logs an actor in and issues a fresh session token.
async fn login(State(state): State<ServiceState>, Json(body): Json<Value>) -> Reply {
    let outcome = with_data(&state, move |data| {
        let identifier = required_text(&body, "identifier")?;
        let secret = required_text(&body, "secret")?;
        let Some(actor) = data.actors.get(&identifier) else {
            return Err(error_reply(StatusCode::UNAUTHORIZED, "unknown identifier"));
        };
        if actor.secret != secret {
            return Err(error_reply(StatusCode::UNAUTHORIZED, "wrong secret"));
        }
        let role = actor.role.clone();
        let token = issue_token(data, &identifier);
        Ok((
            StatusCode::OK,
            Json(json!({ "token": token, "identifier": identifier, "role": role })),
        ))
    });
    outcome.and_then(|inner| inner).unwrap_or_else(|reply| reply)
}

// ============================================================================
// SECTION: Record Handlers
// ============================================================================

/// Creates a record owned by the calling actor.
async fn create_record(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let outcome = with_data(&state, move |data| {
        let owner = authenticate(data, &headers)?;
        let text = required_text(&body, "body")?;
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("published")
            .to_string();
        let now = OffsetDateTime::now_utc();
        let record = StoredRecord {
            id: fixture::uuid(),
            owner,
            status,
            body: text,
            created_at: now,
            updated_at: now,
            deleted: false,
        };
        let rendered = record_json(&record);
        data.records.push(record);
        Ok((StatusCode::CREATED, Json(rendered)))
    });
    outcome.and_then(|inner| inner).unwrap_or_else(|reply| reply)
}

/// Reads one record; owner-private.
async fn read_record(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let outcome = with_data(&state, move |data| {
        let caller = authenticate(data, &headers)?;
        let Some(record) =
            data.records.iter().find(|record| record.id == id && !record.deleted)
        else {
            return Err(error_reply(StatusCode::NOT_FOUND, "record not found"));
        };
        if record.owner != caller {
            return Err(error_reply(StatusCode::FORBIDDEN, "record belongs to another actor"));
        }
        Ok((StatusCode::OK, Json(record_json(record))))
    });
    outcome.and_then(|inner| inner).unwrap_or_else(|reply| reply)
}

/// Updates a record's mutable fields; owner-private.
async fn update_record(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let outcome = with_data(&state, move |data| {
        let caller = authenticate(data, &headers)?;
        let Some(record) =
            data.records.iter_mut().find(|record| record.id == id && !record.deleted)
        else {
            return Err(error_reply(StatusCode::NOT_FOUND, "record not found"));
        };
        if record.owner != caller {
            return Err(error_reply(StatusCode::FORBIDDEN, "record belongs to another actor"));
        }
        if let Some(text) = body.get("body").and_then(Value::as_str) {
            record.body = text.to_string();
        }
        if let Some(status) = body.get("status").and_then(Value::as_str) {
            record.status = status.to_string();
        }
        // Wall clocks can tie at millisecond granularity; force strict advance.
        let mut updated = OffsetDateTime::now_utc();
        if updated <= record.updated_at {
            updated = record.updated_at + TimeDuration::milliseconds(1);
        }
        record.updated_at = updated;
        Ok((StatusCode::OK, Json(record_json(record))))
    });
    outcome.and_then(|inner| inner).unwrap_or_else(|reply| reply)
}

/// Soft-deletes a record; owner-private.
async fn delete_record(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let outcome = with_data(&state, move |data| {
        let caller = authenticate(data, &headers)?;
        let Some(record) =
            data.records.iter_mut().find(|record| record.id == id && !record.deleted)
        else {
            return Err(error_reply(StatusCode::NOT_FOUND, "record not found"));
        };
        if record.owner != caller {
            return Err(error_reply(StatusCode::FORBIDDEN, "record belongs to another actor"));
        }
        record.deleted = true;
        Ok((StatusCode::OK, Json(json!({}))))
    });
    outcome.and_then(|inner| inner).unwrap_or_else(|reply| reply)
}

/// Lists the caller's records with an optional status filter and pagination.
async fn list_records(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Reply {
    let outcome = with_data(&state, move |data| {
        let caller = authenticate(data, &headers)?;
        let page = parse_positive(&params, "page", 1)?;
        let limit = parse_positive(&params, "limit", DEFAULT_LIMIT)?;
        let status_filter = params.get("status").cloned();

        let matching: Vec<&StoredRecord> = data
            .records
            .iter()
            .filter(|record| record.owner == caller && !record.deleted)
            .filter(|record| {
                status_filter.as_ref().is_none_or(|wanted| &record.status == wanted)
            })
            .collect();
        let records = matching.len() as u64;
        let pages = records.div_ceil(u64::from(limit));
        let offset = usize::try_from(u64::from(page - 1) * u64::from(limit))
            .unwrap_or(usize::MAX);
        let data_page: Vec<Value> = matching
            .iter()
            .skip(offset)
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|record| record_json(record))
            .collect();
        Ok((
            StatusCode::OK,
            Json(json!({
                "data": data_page,
                "pagination": {
                    "current": page,
                    "limit": limit,
                    "records": records,
                    "pages": pages,
                },
            })),
        ))
    });
    outcome.and_then(|inner| inner).unwrap_or_else(|reply| reply)
}

/// Parses a positive pagination parameter, rejecting zero and negatives.
fn parse_positive(
    params: &std::collections::HashMap<String, String>,
    key: &str,
    default: u32,
) -> Result<u32, Reply> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u32>() {
            Ok(value) if value >= 1 => Ok(value),
            _ => Err(error_reply(
                StatusCode::BAD_REQUEST,
                &format!("`{key}` must be a positive integer"),
            )),
        },
    }
}

//! Stand-in for the chat backend: register, login and post-message endpoints
//! kept in memory, with failures that can be scripted per user.
use axum::{
    debug_handler,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Behaviour of the mock service.
#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    users: Vec<(String, String)>,
    fail_after: HashMap<String, usize>,
    delay: Duration,
}

impl MockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `user1`..`user4`, all with password `pass123`.
    pub fn with_default_users() -> Self {
        (1..=4).fold(Self::new(), |config, i| {
            config.user(&format!("user{i}"), "pass123")
        })
    }

    pub fn user(mut self, username: &str, password: &str) -> Self {
        self.users.push((username.to_string(), password.to_string()));
        self
    }

    /// Every post from `username` after the first `accepted` ones answers 500.
    pub fn fail_after(mut self, username: &str, accepted: usize) -> Self {
        self.fail_after.insert(username.to_string(), accepted);
        self
    }

    /// Artificial latency added to every request.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct Store {
    users: HashMap<String, String>,
    /// token -> username
    sessions: HashMap<String, String>,
    accepted_by_user: HashMap<String, usize>,
    messages_by_room: HashMap<String, usize>,
}

struct MockState {
    fail_after: HashMap<String, usize>,
    delay: Duration,
    next_id: AtomicU64,
    store: Mutex<Store>,
}

impl MockState {
    fn new(config: MockConfig) -> Self {
        let store = Store {
            users: config.users.into_iter().collect(),
            ..Default::default()
        };
        Self {
            fail_after: config.fail_after,
            delay: config.delay,
            next_id: AtomicU64::new(1),
            store: Mutex::new(store),
        }
    }

    fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn pause(&self) {
        REQUESTS.fetch_add(1, Ordering::Relaxed);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[derive(Debug, Error)]
enum HandlerError {
    #[error("username and password required")]
    MissingFields,

    #[error("username already exists")]
    UserExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing or invalid token")]
    Unauthorized,

    #[error("content required")]
    EmptyContent,

    #[error("scripted failure")]
    Scripted,
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        use HandlerError::*;
        let status = match self {
            MissingFields | EmptyContent => StatusCode::BAD_REQUEST,
            UserExists => StatusCode::CONFLICT,
            InvalidCredentials | Unauthorized => StatusCode::UNAUTHORIZED,
            Scripted => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Deserialize)]
struct CredentialBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct MessageCreated {
    id: u64,
    room_id: String,
    username: String,
    content: String,
}

pub fn router(config: MockConfig) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/rooms/:room_id/messages", post(post_message).get(count_messages))
        .with_state(Arc::new(MockState::new(config)))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(listener: TcpListener, config: MockConfig) -> std::io::Result<()> {
    axum::serve(listener, router(config)).await
}

pub async fn run(addr: SocketAddr, config: MockConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Mock chat service listening on {}", listener.local_addr()?);
    serve(listener, config).await?;
    Ok(())
}

/// Binds an ephemeral loopback port, serves in the background and returns the address.
pub async fn spawn(config: MockConfig) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = serve(listener, config).await {
            tracing::error!("Mock chat service stopped: {err}");
        }
    });
    Ok(addr)
}

#[debug_handler]
async fn register(
    State(state): State<Arc<MockState>>,
    Json(body): Json<CredentialBody>,
) -> Result<(StatusCode, Json<Value>), HandlerError> {
    state.pause().await;
    if body.username.is_empty() || body.password.is_empty() {
        return Err(HandlerError::MissingFields);
    }

    let mut store = state.store();
    if store.users.contains_key(&body.username) {
        return Err(HandlerError::UserExists);
    }
    store.users.insert(body.username.clone(), body.password);
    debug!("Registered {}", body.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": { "username": body.username } })),
    ))
}

#[debug_handler]
async fn login(
    State(state): State<Arc<MockState>>,
    Json(body): Json<CredentialBody>,
) -> Result<Json<Value>, HandlerError> {
    state.pause().await;
    if body.username.is_empty() || body.password.is_empty() {
        return Err(HandlerError::MissingFields);
    }

    let mut store = state.store();
    if store.users.get(&body.username) != Some(&body.password) {
        return Err(HandlerError::InvalidCredentials);
    }

    let id = state.next_id.fetch_add(1, Ordering::Relaxed);
    let token = format!("mock-{}-{id}", body.username);
    store.sessions.insert(token.clone(), body.username);
    counter!("mock_service.logins").increment(1);

    Ok(Json(json!({ "token": token })))
}

#[debug_handler]
async fn post_message(
    State(state): State<Arc<MockState>>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<MessageBody>,
) -> Result<(StatusCode, Json<MessageCreated>), HandlerError> {
    state.pause().await;
    let token = bearer_token(&headers).ok_or(HandlerError::Unauthorized)?;

    let mut store = state.store();
    let username = store
        .sessions
        .get(token)
        .cloned()
        .ok_or(HandlerError::Unauthorized)?;
    if body.content.is_empty() {
        return Err(HandlerError::EmptyContent);
    }

    let accepted = store.accepted_by_user.get(&username).copied().unwrap_or(0);
    if state
        .fail_after
        .get(&username)
        .is_some_and(|limit| accepted >= *limit)
    {
        debug!("Scripted failure for {username} after {accepted} messages");
        return Err(HandlerError::Scripted);
    }

    *store.accepted_by_user.entry(username.clone()).or_default() += 1;
    *store.messages_by_room.entry(room_id.clone()).or_default() += 1;
    counter!("mock_service.messages").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(MessageCreated {
            id: state.next_id.fetch_add(1, Ordering::Relaxed),
            room_id,
            username,
            content: body.content,
        }),
    ))
}

#[debug_handler]
async fn count_messages(
    State(state): State<Arc<MockState>>,
    Path(room_id): Path<String>,
) -> Json<Value> {
    let total = state
        .store()
        .messages_by_room
        .get(&room_id)
        .copied()
        .unwrap_or(0);
    Json(json!({ "room_id": room_id, "total": total }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/** Throughput printer **/

static REQUESTS: AtomicU64 = AtomicU64::new(0);

pub async fn throughput_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let requests = REQUESTS.swap(0, Ordering::Relaxed);
        if requests > 0 {
            info!("{requests} req/s");
        }
    }
}

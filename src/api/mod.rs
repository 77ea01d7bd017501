//! Cart session service
//!
//! One cart per session id, each hydrated from and saved to storage under
//! `{storage_key}-{session}`. Every request goes through the session's store,
//! so the single-writer rule holds per cart.
//!
//! Mounted carts are only a cache over storage: every change is already
//! saved, so idle carts are unloaded and mounted again on their next request.

use axum::{extract::{Path, State}, http::StatusCode, routing::{get, post}, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use uuid::Uuid;
use crate::config::{Config, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_SECS};
use crate::domain::actions::CartAction;
use crate::domain::aggregates::CartState;
use crate::persistence::{CartStorage, FileStorage, PersistenceSync};
use crate::store::CartStore;

pub type SharedStorage = Arc<dyn CartStorage + Send + Sync>;
type ApiError = (StatusCode, String);
type Slot = Arc<Mutex<Option<CartStore>>>;

const MAX_SESSION_LEN: usize = 64;

/// Bounds on the carts held in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self { idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS), max_sessions: DEFAULT_MAX_SESSIONS }
    }
}

struct Entry {
    slot: Slot,
    last_used: Instant,
}

impl Entry {
    /// The registry holds one reference; any other belongs to a running request.
    fn in_use(&self) -> bool { Arc::strong_count(&self.slot) > 1 }
}

/// How a request treats a session that storage has never seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Access {
    /// Answer 404.
    Existing,
    /// Register it with an initial cart.
    Upsert,
}

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<Mutex<HashMap<String, Entry>>>,
    storage: SharedStorage,
    storage_key: Arc<str>,
    limits: SessionLimits,
}

impl AppState {
    pub fn new(storage: SharedStorage, storage_key: impl Into<String>) -> Self {
        let storage_key: String = storage_key.into();
        Self { sessions: Arc::default(), storage, storage_key: storage_key.into(), limits: SessionLimits::default() }
    }

    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let storage = FileStorage::open(&config.storage_dir)?;
        info!(dir = %storage.root().display(), "cart storage ready");
        let limits = SessionLimits { idle: config.session_idle, max_sessions: config.max_sessions };
        Ok(Self::new(Arc::new(storage), config.storage_key.clone()).with_limits(limits))
    }

    /// Carts currently mounted in memory.
    pub fn session_count(&self) -> usize { self.lock_sessions().len() }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn storage_key(&self, session: &str) -> String { format!("{}-{session}", self.storage_key) }

    /// Run `f` against the session's store on the blocking pool, since
    /// dispatches write through to storage.
    async fn run<T, F>(&self, session: String, access: Access, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut CartStore) -> T + Send + 'static,
    {
        if !is_valid_session(&session) {
            return Err((StatusCode::BAD_REQUEST, "Invalid session id".to_string()));
        }
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.with_cart(&session, access, f))
            .await
            .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?
    }

    /// Mounts the session's store on first use. Only that session's lock is
    /// held while the store works; the registry lock never spans I/O.
    fn with_cart<T>(&self, session: &str, access: Access, f: impl FnOnce(&mut CartStore) -> T) -> Result<T, ApiError> {
        let slot = self.checkout(session);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let store = match &mut *guard {
            Some(store) => store,
            empty => match self.mount(session, access)? {
                Some(store) => empty.insert(store),
                None => {
                    drop(guard);
                    self.release(session, &slot);
                    return Err((StatusCode::NOT_FOUND, "Cart session not found".to_string()));
                }
            },
        };
        Ok(f(store))
    }

    fn mount(&self, session: &str, access: Access) -> Result<Option<CartStore>, ApiError> {
        let key = self.storage_key(session);
        let mut store = CartStore::new();
        let hydration = PersistenceSync::attach(Arc::clone(&self.storage), key.clone(), &mut store);
        if hydration.found() {
            return Ok(Some(store));
        }
        if access == Access::Existing {
            return Ok(None);
        }
        let json = serde_json::to_string(&**store.state())
            .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
        self.storage.write(&key, &json).map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
        debug!(%session, "cart session registered");
        Ok(Some(store))
    }

    fn checkout(&self, session: &str) -> Slot {
        let now = Instant::now();
        let mut sessions = self.lock_sessions();
        let entry = sessions
            .entry(session.to_string())
            .or_insert_with(|| Entry { slot: Slot::default(), last_used: now });
        entry.last_used = now;
        let slot = Arc::clone(&entry.slot);
        self.evict(&mut sessions, now);
        slot
    }

    /// Forget a slot that never mounted, unless another request is waiting on it.
    fn release(&self, session: &str, slot: &Slot) {
        let mut sessions = self.lock_sessions();
        if sessions.get(session).is_some_and(|e| Arc::ptr_eq(&e.slot, slot) && Arc::strong_count(slot) == 2) {
            sessions.remove(session);
        }
    }

    fn evict(&self, sessions: &mut HashMap<String, Entry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, e| e.in_use() || now.duration_since(e.last_used) < self.limits.idle);

        let excess = sessions.len().saturating_sub(self.limits.max_sessions);
        if excess > 0 {
            let mut idle: Vec<(Instant, String)> = sessions
                .iter()
                .filter(|(_, e)| !e.in_use())
                .map(|(k, e)| (e.last_used, k.clone()))
                .collect();
            idle.sort_unstable();
            for (_, key) in idle.into_iter().take(excess) {
                sessions.remove(&key);
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, held = sessions.len(), "unloaded idle carts");
        }
    }
}

fn is_valid_session(session: &str) -> bool {
    !session.is_empty()
        && session.len() <= MAX_SESSION_LEN
        && session.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-cart"})) }))
        .route("/api/v1/carts", post(create_session))
        .route("/api/v1/carts/:session", get(get_cart).delete(clear_cart))
        .route("/api/v1/carts/:session/actions", post(dispatch))
        .route("/api/v1/carts/:session/total", get(get_total))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

#[derive(Debug, Serialize, Deserialize)] pub struct SessionResponse { pub session: String }

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalResponse { pub total: Decimal, pub item_count: u64 }

async fn create_session(State(s): State<AppState>) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = Uuid::now_v7().to_string();
    s.run(session.clone(), Access::Upsert, |_| ()).await?;
    Ok((StatusCode::CREATED, Json(SessionResponse { session })))
}

async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartState>, ApiError> {
    s.run(session, Access::Existing, |c| CartState::clone(c.state())).await.map(Json)
}

async fn dispatch(State(s): State<AppState>, Path(session): Path<String>, Json(action): Json<CartAction>) -> Result<Json<CartState>, ApiError> {
    s.run(session, Access::Upsert, |c| CartState::clone(c.dispatch(action))).await.map(Json)
}

async fn get_total(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<TotalResponse>, ApiError> {
    s.run(session, Access::Existing, |c| TotalResponse { total: c.total_price(), item_count: c.state().item_count() })
        .await
        .map(Json)
}

async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<StatusCode, ApiError> {
    s.run(session, Access::Existing, |c| { c.clear(); }).await?;
    Ok(StatusCode::NO_CONTENT)
}

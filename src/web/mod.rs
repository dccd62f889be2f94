use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::error::Error;
use crate::game::ReviewLine;
use crate::pool::RandomPool;
use crate::samples::sample_spots;
use crate::session::{Phase, RoundOutcome, Session, SessionConfig};
use crate::spot::Spot;
use crate::stats::{RoundRecord, SessionStats};

const HISTORY_LIMIT: usize = 20;

/// A session plus the pool it draws from and what the client last saw.
struct Drill {
    session: Session,
    pool: RandomPool,
    last_outcome: Option<RoundOutcome>,
    review: Option<Vec<ReviewLine>>,
}

impl Drill {
    fn new(config: SessionConfig, pool: RandomPool) -> Self {
        Self {
            session: Session::new(config),
            pool,
            last_outcome: None,
            review: None,
        }
    }

    fn start(config: SessionConfig) -> Result<Self, Error> {
        let pool = RandomPool::seeded(sample_spots(), config.seed.map(|seed| seed.wrapping_add(1)));
        let mut drill = Self::new(config, pool);
        drill.deal_next()?;
        Ok(drill)
    }

    /// Starts the next round. Only valid while the session awaits a spot, which
    /// is also where a failed deal leaves it, so a client can simply retry.
    fn deal_next(&mut self) -> Result<(), Error> {
        self.session.deal(&mut self.pool)?;
        self.last_outcome = None;
        self.review = None;
        Ok(())
    }

    fn continue_with(&mut self, keep_going: bool) -> Result<(), Error> {
        self.session.decide_continue(keep_going)?;
        if keep_going {
            self.deal_next()?;
        }
        Ok(())
    }

    fn view(&self) -> SessionView {
        let history = self.session.history();
        let recent = history[history.len().saturating_sub(HISTORY_LIMIT)..]
            .iter()
            .rev()
            .cloned()
            .collect();
        let stats = *self.session.stats();
        SessionView {
            session_id: self.session.id(),
            phase: self.session.phase(),
            config: *self.session.config(),
            spot: self.session.current_spot().cloned(),
            outcome: self.last_outcome.clone(),
            review: self.review.clone(),
            stats: StatsView {
                accuracy: stats.accuracy(),
                stats,
            },
            history: recent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsView {
    #[serde(flatten)]
    pub stats: SessionStats,
    pub accuracy: f64,
}

/// Client-facing snapshot of a drill session. History is newest first.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub config: SessionConfig,
    pub spot: Option<Spot>,
    pub outcome: Option<RoundOutcome>,
    pub review: Option<Vec<ReviewLine>>,
    pub stats: StatsView,
    pub history: Vec<RoundRecord>,
}

#[derive(Clone)]
struct AppState {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Drill>>>>>,
}

impl AppState {
    fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn insert_session(&self, drill: Drill) -> Arc<Mutex<Drill>> {
        let id = drill.session.id();
        let entry = Arc::new(Mutex::new(drill));
        self.sessions.write().insert(id, entry.clone());
        entry
    }

    fn get_session(&self, id: &Uuid) -> Option<Arc<Mutex<Drill>>> {
        self.sessions.read().get(id).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    action: String,
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
    show: bool,
}

#[derive(Debug, Deserialize)]
struct ContinueRequest {
    #[serde(rename = "continue")]
    keep_going: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("session not found")]
    NotFound,
    #[error(transparent)]
    Drill(#[from] Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Drill(Error::InvalidAction(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Drill(Error::UnexpectedPhase { .. }) => StatusCode::CONFLICT,
            ApiError::Drill(_) => StatusCode::BAD_REQUEST,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub async fn serve(addr: SocketAddr) -> Result<()> {
    let state = AppState::new();
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/:id", get(fetch_session))
        .route("/sessions/:id/actions", post(submit_action))
        .route("/sessions/:id/review", post(answer_review))
        .route("/sessions/:id/continue", post(decide_continue))
        .route("/sessions/:id/deal", post(deal_spot));

    Router::new()
        .route("/healthz", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn router() -> Router {
    build_router(AppState::new())
}

async fn health() -> &'static str {
    "ok"
}

async fn start_session(
    State(state): State<AppState>,
    Json(config): Json<SessionConfig>,
) -> Result<Json<SessionView>, ApiError> {
    let drill = Drill::start(config)?;
    let entry = state.insert_session(drill);
    let view = entry.lock().view();
    Ok(Json(view))
}

async fn fetch_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let entry = state.get_session(&id).ok_or(ApiError::NotFound)?;
    let view = entry.lock().view();
    Ok(Json(view))
}

async fn submit_action(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let entry = state.get_session(&id).ok_or(ApiError::NotFound)?;
    let mut drill = entry.lock();
    let outcome = drill.session.submit_action(&req.action)?;
    drill.review = outcome.review.clone();
    drill.last_outcome = Some(outcome);
    Ok(Json(drill.view()))
}

async fn answer_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let entry = state.get_session(&id).ok_or(ApiError::NotFound)?;
    let mut drill = entry.lock();
    drill.review = drill.session.answer_review(req.show)?;
    Ok(Json(drill.view()))
}

async fn decide_continue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ContinueRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let entry = state.get_session(&id).ok_or(ApiError::NotFound)?;
    let mut drill = entry.lock();
    drill.continue_with(req.keep_going)?;
    Ok(Json(drill.view()))
}

async fn deal_spot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let entry = state.get_session(&id).ok_or(ApiError::NotFound)?;
    let mut drill = entry.lock();
    drill.deal_next()?;
    Ok(Json(drill.view()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(spots: Vec<Spot>) -> Drill {
        let config = SessionConfig {
            seed: Some(3),
            ..SessionConfig::default()
        };
        Drill::new(config, RandomPool::seeded(spots, Some(4)))
    }

    #[test]
    fn failed_deal_after_continue_can_be_retried() {
        let mut drill = seeded(sample_spots());
        drill.deal_next().expect("first spot");
        drill.session.submit_action("raise").expect("valid action");

        drill.pool = RandomPool::seeded(Vec::new(), Some(4));
        assert!(matches!(drill.continue_with(true), Err(Error::EmptyPool)));
        assert_eq!(drill.session.phase(), Phase::AwaitingSpot);

        drill.pool = RandomPool::seeded(sample_spots(), Some(4));
        drill.deal_next().expect("retry deals");
        assert_eq!(drill.session.phase(), Phase::AwaitingUserAction);
        assert!(drill.view().spot.is_some());
        assert!(drill.view().outcome.is_none());
    }

    #[test]
    fn stopping_does_not_deal() {
        let mut drill = seeded(sample_spots());
        drill.deal_next().unwrap();
        drill.session.submit_action("raise").unwrap();
        drill.continue_with(false).unwrap();

        assert_eq!(drill.session.phase(), Phase::Terminated);
        assert!(matches!(drill.deal_next(), Err(Error::UnexpectedPhase { .. })));
    }
}

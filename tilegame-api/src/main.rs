//! Tile Game Web API
//!
//! Serves one in-process game session over JSON. Progress is saved to a
//! SQLite key-value table after every board-changing move and offered back
//! on the next start.

mod store;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilegame_core::{
    can_move, Direction, GameEvent, Gesture, GridState, MoveResult, Notifier, Renderer, Session,
    Snapshot,
};

use crate::store::SqliteStore;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Parser, Debug)]
struct Args {
    /// Host interface to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind.
    #[arg(long, default_value_t = 8000)]
    port: u16,
    /// SQLite database holding saved progress.
    #[arg(long, default_value = "data/tilegame.db")]
    db: PathBuf,
    /// Board rows.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=16))]
    rows: u8,
    /// Board columns.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=16))]
    columns: u8,
    /// Seed for tile spawning (random when omitted).
    #[arg(long)]
    seed: Option<u64>,
    /// Start a new game instead of restoring saved progress.
    #[arg(long)]
    fresh: bool,
    /// Tracing filter, e.g. "info", "debug".
    #[arg(long, default_value = "info")]
    log: String,
}

// =============================================================================
// Session State
// =============================================================================

type GameSession = Session<SqliteStore>;

/// Shared application state
struct AppStateInner {
    session: Mutex<GameSession>,
}

type AppState = Arc<AppStateInner>;

impl AppStateInner {
    fn session(&self) -> MutexGuard<'_, GameSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Logs board updates; HTTP clients draw from the JSON responses
struct TraceRenderer;

impl Renderer for TraceRenderer {
    fn render(&mut self, grid: &GridState) {
        debug!(
            score = grid.score(),
            best_score = grid.best_score(),
            max_tile = grid.max_tile(),
            "board updated"
        );
    }
}

struct TraceNotifier;

impl Notifier for TraceNotifier {
    fn notify(&mut self, event: GameEvent) {
        match event {
            GameEvent::GameOver { score, best_score } => {
                info!(score, best_score, "game over, you lost");
            }
        }
    }
}

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GameStateModel {
    board: Vec<Vec<u32>>,
    score: u64,
    best_score: u64,
    merged_tiles: Vec<Vec<bool>>,
    rows: usize,
    columns: usize,
    game_over: bool,
}

impl From<&GridState> for GameStateModel {
    fn from(grid: &GridState) -> Self {
        GameStateModel {
            board: grid.board(),
            score: grid.score(),
            best_score: grid.best_score(),
            merged_tiles: grid.merge_markers(),
            rows: grid.rows(),
            columns: grid.columns(),
            game_over: !can_move(grid),
        }
    }
}

#[derive(Deserialize)]
struct MoveRequest {
    direction: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveResponse {
    direction: Direction,
    #[serde(flatten)]
    result: MoveResult,
    state: GameStateModel,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorModel {
            detail: detail.into(),
        }),
    )
}

fn parse_direction(name: &str) -> Result<Direction, ApiError> {
    name.parse().map_err(|e: tilegame_core::UnknownDirection| {
        api_error(StatusCode::BAD_REQUEST, e.to_string())
    })
}

fn move_response(session: &mut GameSession, direction: Direction) -> MoveResponse {
    let result = session.move_tiles(direction);
    MoveResponse {
        direction,
        result,
        state: GameStateModel::from(session.grid()),
    }
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let session = state.session();
    Json(GameStateModel::from(session.grid()))
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let direction = parse_direction(&req.direction)?;
    let mut session = state.session();
    Ok(Json(move_response(&mut session, direction)))
}

async fn move_direction(
    State(state): State<AppState>,
    Path(direction): Path<String>,
) -> Result<Json<MoveResponse>, ApiError> {
    let direction = parse_direction(&direction)?;
    let mut session = state.session();
    Ok(Json(move_response(&mut session, direction)))
}

async fn swipe(State(state): State<AppState>, Json(gesture): Json<Gesture>) -> Json<MoveResponse> {
    let mut session = state.session();
    Json(move_response(&mut session, gesture.direction()))
}

/// Reset the game. The client has already confirmed with the player.
async fn reset_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = state.session();
    session.reset_game();
    Json(GameStateModel::from(session.grid()))
}

/// Restore saved progress. The client has already confirmed with the player.
async fn restore_game(State(state): State<AppState>) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    if !session.load_game_state() {
        return Err(api_error(StatusCode::NOT_FOUND, "No saved progress to restore"));
    }
    Ok(Json(GameStateModel::from(session.grid())))
}

async fn export_state(State(state): State<AppState>) -> Json<Snapshot> {
    let session = state.session();
    Json(session.export())
}

async fn import_state(
    State(state): State<AppState>,
    Json(snapshot): Json<Snapshot>,
) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    session
        .import(&snapshot)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(GameStateModel::from(session.grid())))
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/move", post(make_move))
        .route("/move/{direction}", post(move_direction))
        .route("/swipe", post(swipe))
        .route("/reset", post(reset_game))
        .route("/restore", post(restore_game))
        .route("/state/export", get(export_state))
        .route("/state/import", post(import_state))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(parent) = args.db.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let store = SqliteStore::open(&args.db)
        .with_context(|| format!("opening database {}", args.db.display()))?;
    info!(db = %args.db.display(), "opened progress store");

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut session = Session::new(args.rows.into(), args.columns.into(), store, rng)
        .with_renderer(TraceRenderer)
        .with_notifier(TraceNotifier);
    let restored = session.start(&mut !args.fresh);
    info!(restored, rows = args.rows, columns = args.columns, "session ready");

    let state: AppState = Arc::new(AppStateInner {
        session: Mutex::new(session),
    });

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "tile game API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

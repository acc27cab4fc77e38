//! REST API handlers.
//!
//! The two engine operations return the flat summary shape the surrounding
//! screens render directly (`success`/`message` plus counters); registry
//! endpoints use the generic `success`/`data` wrapper.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use matchday_engine::{CompetitionFormat, EngineError, FixtureEngine};
use matchday_state::{Competition, CompetitionTeam};

use crate::ApiState;

// ── Response shapes ────────────────────────────────────────────────

/// Response wrapper for registry endpoints.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

/// Request body shared by both engine operations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub competition_id: String,
}

/// Flat summary returned by the engine operations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups_created: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    teams_allocated: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matches_created: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

/// Failure body for the engine operations.
#[derive(Debug, Serialize)]
struct OperationError {
    error: String,
}

/// Map an engine error onto the HTTP status it deserves.
fn engine_error_status(err: &EngineError) -> StatusCode {
    match err {
        EngineError::CompetitionNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::FixturesAlreadyScheduled(_) => StatusCode::CONFLICT,
        EngineError::State(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::NoParticipants
        | EngineError::InvalidGroupCount(_)
        | EngineError::UnknownFormat(_) => StatusCode::BAD_REQUEST,
    }
}

fn engine_failure(err: &EngineError) -> axum::response::Response {
    (
        engine_error_status(err),
        Json(OperationError {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ── Engine operations ──────────────────────────────────────────────

/// POST /api/v1/groups/allocate
pub async fn allocate_groups(
    State(state): State<ApiState>,
    Json(req): Json<OperationRequest>,
) -> impl IntoResponse {
    let engine = FixtureEngine::new(state.store.clone());
    match engine.allocate_groups(&req.competition_id) {
        Ok(summary) => Json(OperationResponse {
            success: true,
            message: format!(
                "allocated {} teams into {} groups",
                summary.teams_allocated, summary.groups_created
            ),
            groups_created: Some(summary.groups_created),
            teams_allocated: Some(summary.teams_allocated),
            matches_created: None,
            format: None,
        })
        .into_response(),
        Err(e) => engine_failure(&e),
    }
}

/// POST /api/v1/fixtures/generate
pub async fn generate_fixtures(
    State(state): State<ApiState>,
    Json(req): Json<OperationRequest>,
) -> impl IntoResponse {
    let engine = FixtureEngine::new(state.store.clone());
    match engine.generate_fixtures(&req.competition_id) {
        Ok(summary) => Json(OperationResponse {
            success: true,
            message: format!(
                "created {} matches ({})",
                summary.matches_created, summary.format
            ),
            groups_created: None,
            teams_allocated: None,
            matches_created: Some(summary.matches_created),
            format: Some(summary.format),
        })
        .into_response(),
        Err(e) => engine_failure(&e),
    }
}

// ── Competitions ───────────────────────────────────────────────────

/// GET /api/v1/competitions
pub async fn list_competitions(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list_competitions() {
        Ok(competitions) => ApiResponse::ok(competitions).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// GET /api/v1/competitions/{id}
pub async fn get_competition(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_competition(&id) {
        Ok(Some(competition)) => ApiResponse::ok(competition).into_response(),
        Ok(None) => error_response("competition not found", StatusCode::NOT_FOUND).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// POST /api/v1/competitions
pub async fn create_competition(
    State(state): State<ApiState>,
    Json(competition): Json<Competition>,
) -> impl IntoResponse {
    if let Err(e) = CompetitionFormat::parse(&competition.format) {
        return error_response(&e.to_string(), StatusCode::BAD_REQUEST).into_response();
    }
    match state.store.put_competition(&competition) {
        Ok(()) => (StatusCode::CREATED, ApiResponse::ok(competition)).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// DELETE /api/v1/competitions/{id}
pub async fn delete_competition(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.delete_competition(&id) {
        Ok(true) => ApiResponse::ok("deleted").into_response(),
        Ok(false) => error_response("competition not found", StatusCode::NOT_FOUND).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

// ── Teams ──────────────────────────────────────────────────────────

/// GET /api/v1/competitions/{id}/teams
pub async fn list_teams(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.list_teams_for_competition(&id) {
        Ok(teams) => ApiResponse::ok(teams).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// POST /api/v1/competitions/{id}/teams
pub async fn register_team(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(mut team): Json<CompetitionTeam>,
) -> impl IntoResponse {
    // The path owns the competition reference.
    team.competition_id = id.clone();

    match state.store.get_competition(&id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response("competition not found", StatusCode::NOT_FOUND)
                .into_response();
        }
        Err(e) => {
            return error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
                .into_response();
        }
    }

    match state.store.put_team(&team) {
        Ok(()) => (StatusCode::CREATED, ApiResponse::ok(team)).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

// ── Matches ────────────────────────────────────────────────────────

/// GET /api/v1/competitions/{id}/matches
pub async fn list_matches(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.list_matches_for_competition(&id) {
        Ok(matches) => ApiResponse::ok(matches).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

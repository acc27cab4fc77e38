//! matchday-api — REST API for the Matchday fixture engine.
//!
//! Provides axum route handlers for the two engine operations plus the
//! competition/team registry endpoints the operations consume from.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/v1/groups/allocate` | Allocate groups for a competition |
//! | POST | `/api/v1/fixtures/generate` | Generate the match calendar |
//! | GET | `/api/v1/competitions` | List all competitions |
//! | POST | `/api/v1/competitions` | Create a competition |
//! | GET | `/api/v1/competitions/{id}` | Get competition details |
//! | DELETE | `/api/v1/competitions/{id}` | Delete a competition |
//! | GET | `/api/v1/competitions/{id}/teams` | List registered teams |
//! | POST | `/api/v1/competitions/{id}/teams` | Register a team |
//! | GET | `/api/v1/competitions/{id}/matches` | List generated matches |
//!
//! Every route answers CORS preflight with permissive headers so browser
//! dashboards on other origins can call the engine directly.

pub mod handlers;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use matchday_state::StateStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: StateStore,
}

/// Build the complete API router.
pub fn build_router(store: StateStore) -> Router {
    let api_state = ApiState { store };

    let api_routes = Router::new()
        .route("/groups/allocate", post(handlers::allocate_groups))
        .route("/fixtures/generate", post(handlers::generate_fixtures))
        .route(
            "/competitions",
            get(handlers::list_competitions).post(handlers::create_competition),
        )
        .route(
            "/competitions/{id}",
            get(handlers::get_competition).delete(handlers::delete_competition),
        )
        .route(
            "/competitions/{id}/teams",
            get(handlers::list_teams).post(handlers::register_team),
        )
        .route("/competitions/{id}/matches", get(handlers::list_matches))
        .with_state(api_state);

    Router::new().nest("/api/v1", api_routes).layer(cors_layer())
}

/// Permissive CORS: any origin, the headers browser clients actually send.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::ServerState;

pub mod clients;
pub mod services;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health plus the client and service resources.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let client_routes = Router::new()
        .route("/client", get(clients::list).post(clients::create))
        .route("/client/addService", post(clients::add_service))
        .route("/client/removeService", post(clients::remove_service))
        .route("/client/removeAllService/:id", post(clients::remove_all_services))
        .route(
            "/client/:id",
            get(clients::show).put(clients::update).patch(clients::update).delete(clients::destroy),
        )
        .route("/client/:id/:force", axum::routing::delete(clients::destroy_with_path_flag));

    let service_routes = Router::new()
        .route("/service", get(services::list).post(services::create))
        .route("/service/removeAllClient/:id", post(services::remove_all_clients))
        .route(
            "/service/:id",
            get(services::show).put(services::update).patch(services::update).delete(services::destroy),
        )
        .route("/service/:id/:force", axum::routing::delete(services::destroy_with_path_flag));

    Router::new()
        .route("/health", get(health))
        .merge(client_routes)
        .merge(service_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and transport failures
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

/// Truthy spellings accepted for the delete `force` flag.
pub(crate) fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "force" | "yes")
}

/// `?force=...` on delete routes.
#[derive(Debug, Default, serde::Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub force: Option<String>,
}

impl DeleteQuery {
    pub fn force(&self) -> bool { self.force.as_deref().is_some_and(is_truthy) }
}

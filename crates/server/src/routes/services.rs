use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use common::types::Message;
use models::service;
use registry::domain::{ServiceInput, ServiceView};
use serde_json::{json, Value};
use tracing::info;

use crate::{errors::JsonApiError, routes::{is_truthy, DeleteQuery}, state::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<service::Model>>, JsonApiError> {
    let services = state.services.list().await?;
    info!(count = services.len(), "list services");
    Ok(Json(services))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<ServiceInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let Json(input) = payload?;
    let view = state.services.create(input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Service created successfully", "service": view }))))
}

pub async fn show(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(state.services.get(id).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    payload: Result<Json<ServiceInput>, JsonRejection>,
) -> Result<Json<Value>, JsonApiError> {
    let Json(input) = payload?;
    let view = state.services.update(id, input).await?;
    Ok(Json(json!({ "message": "Service updated successfully", "service": view })))
}

pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Message>, JsonApiError> {
    delete_service(&state, id, query.force()).await
}

pub async fn destroy_with_path_flag(
    State(state): State<ServerState>,
    Path((id, force)): Path<(i32, String)>,
) -> Result<Json<Message>, JsonApiError> {
    delete_service(&state, id, is_truthy(&force)).await
}

async fn delete_service(state: &ServerState, id: i32, force: bool) -> Result<Json<Message>, JsonApiError> {
    state.services.delete(id, force).await?;
    info!(service_id = id, force, "deleted service");
    Ok(Json(Message::new("Service deleted successfully")))
}

pub async fn remove_all_clients(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, JsonApiError> {
    let view = state.services.remove_all_clients(id).await?;
    Ok(Json(json!({ "message": "Clients removed successfully", "service": view })))
}

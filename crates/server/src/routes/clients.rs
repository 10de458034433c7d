use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use common::types::Message;
use models::client;
use registry::domain::{AssociationInput, ClientInput, ClientView};
use serde_json::{json, Value};
use tracing::info;

use crate::{errors::JsonApiError, routes::{is_truthy, DeleteQuery}, state::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<client::Model>>, JsonApiError> {
    let clients = state.clients.list().await?;
    info!(count = clients.len(), "list clients");
    Ok(Json(clients))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<ClientInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let Json(input) = payload?;
    let view = state.clients.create(input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Client created successfully", "client": view }))))
}

pub async fn show(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<ClientView>, JsonApiError> {
    Ok(Json(state.clients.get(id).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    payload: Result<Json<ClientInput>, JsonRejection>,
) -> Result<Json<Value>, JsonApiError> {
    let Json(input) = payload?;
    let view = state.clients.update(id, input).await?;
    Ok(Json(json!({ "message": "Client updated successfully", "client": view })))
}

pub async fn destroy(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Message>, JsonApiError> {
    delete_client(&state, id, query.force()).await
}

/// `DELETE /client/:id/:force`, kept for older callers.
pub async fn destroy_with_path_flag(
    State(state): State<ServerState>,
    Path((id, force)): Path<(i32, String)>,
) -> Result<Json<Message>, JsonApiError> {
    delete_client(&state, id, is_truthy(&force)).await
}

async fn delete_client(state: &ServerState, id: i32, force: bool) -> Result<Json<Message>, JsonApiError> {
    state.clients.delete(id, force).await?;
    info!(client_id = id, force, "deleted client");
    Ok(Json(Message::new("Client deleted successfully")))
}

pub async fn add_service(
    State(state): State<ServerState>,
    payload: Result<Json<AssociationInput>, JsonRejection>,
) -> Result<Json<Value>, JsonApiError> {
    let Json(input) = payload?;
    let view = state.clients.add_service(input).await?;
    Ok(Json(json!({ "message": "Service added successfully", "client": view })))
}

pub async fn remove_service(
    State(state): State<ServerState>,
    payload: Result<Json<AssociationInput>, JsonRejection>,
) -> Result<Json<Value>, JsonApiError> {
    let Json(input) = payload?;
    let view = state.clients.remove_service(input).await?;
    Ok(Json(json!({ "message": "Service removed successfully", "client": view })))
}

pub async fn remove_all_services(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, JsonApiError> {
    let view = state.clients.remove_all_services(id).await?;
    Ok(Json(json!({ "message": "Services removed successfully", "client": view })))
}

//! Host HTTP handlers

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    models::{HostCreateRequest, HostView},
    web::{
        responses::{created, handle_error, handle_result, no_content, not_found, ok},
        AppState,
    },
};

pub async fn list_hosts(State(state): State<AppState>) -> Response {
    handle_result(
        state
            .hosts
            .get_all()
            .await
            .map(|hosts| hosts.iter().map(HostView::from).collect::<Vec<_>>()),
    )
}

pub async fn get_host(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.hosts.get_by_id(id).await {
        Ok(Some(host)) => ok(HostView::from(&host)).into_response(),
        Ok(None) => not_found("host", id).into_response(),
        Err(e) => handle_error(e),
    }
}

pub async fn create_host(
    State(state): State<AppState>,
    Json(request): Json<HostCreateRequest>,
) -> Response {
    match state.hosts.add(request).await {
        Ok(host) => created(HostView::from(&host)).into_response(),
        Err(e) => handle_error(e),
    }
}

/// Deleting a host also removes the programs it presents
pub async fn delete_host(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.hosts.delete(id).await {
        Ok(()) => no_content().into_response(),
        Err(e) => handle_error(e),
    }
}

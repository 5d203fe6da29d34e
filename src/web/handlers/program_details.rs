//! Program details HTTP handlers

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    models::{ProgramDetailsCreateRequest, ProgramDetailsView},
    web::{
        responses::{created, handle_error, handle_result, no_content, not_found, ok},
        AppState,
    },
};

pub async fn list_program_details(State(state): State<AppState>) -> Response {
    handle_result(
        state
            .program_details
            .get_all()
            .await
            .map(|details| details.iter().map(ProgramDetailsView::from).collect::<Vec<_>>()),
    )
}

pub async fn get_program_details(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.program_details.get_by_id(id).await {
        Ok(Some(details)) => ok(ProgramDetailsView::from(&details)).into_response(),
        Ok(None) => not_found("program details", id).into_response(),
        Err(e) => handle_error(e),
    }
}

pub async fn create_program_details(
    State(state): State<AppState>,
    Json(request): Json<ProgramDetailsCreateRequest>,
) -> Response {
    match state.program_details.add(request).await {
        Ok(details) => created(ProgramDetailsView::from(&details)).into_response(),
        Err(e) => handle_error(e),
    }
}

/// Deleting details also removes the program they belong to
pub async fn delete_program_details(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.program_details.delete(id).await {
        Ok(()) => no_content().into_response(),
        Err(e) => handle_error(e),
    }
}

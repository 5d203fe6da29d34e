//! Radio program HTTP handlers
//!
//! Programs always leave the service as [`RadioProgramView`]s.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    models::{AddMusicRequest, RadioProgramCreateRequest, RadioProgramUpdateRequest, RadioProgramView},
    utils::datetime::DateTimeParser,
    web::{
        responses::{bad_request, created, handle_error, handle_result, no_content, not_found, ok},
        AppState,
    },
};

#[derive(Debug, Deserialize)]
pub struct OnAirParams {
    /// Instant to look up; defaults to now
    pub at: Option<String>,
}

pub async fn list_radio_programs(State(state): State<AppState>) -> Response {
    handle_result(state.radio_programs.get_all_programs().await)
}

pub async fn get_radio_program(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.radio_programs.get_program_by_id(id).await {
        Ok(Some(program)) => ok(RadioProgramView::from(&program)).into_response(),
        Ok(None) => not_found("radio program", id).into_response(),
        Err(e) => handle_error(e),
    }
}

/// Programs on air at `?at=` (RFC 3339), or right now
pub async fn list_on_air(
    State(state): State<AppState>,
    Query(params): Query<OnAirParams>,
) -> Response {
    let instant = match params.at.as_deref() {
        Some(at) => match DateTimeParser::parse_flexible(at) {
            Ok(instant) => instant,
            Err(e) => return bad_request(&e.to_string()).into_response(),
        },
        None => Utc::now(),
    };

    handle_result(
        state
            .radio_programs
            .get_programs_by_time(instant)
            .await
            .map(|programs| programs.iter().map(RadioProgramView::from).collect::<Vec<_>>()),
    )
}

pub async fn create_radio_program(
    State(state): State<AppState>,
    Json(request): Json<RadioProgramCreateRequest>,
) -> Response {
    match state.radio_programs.add_program(request).await {
        Ok(program) => created(RadioProgramView::from(&program)).into_response(),
        Err(e) => handle_error(e),
    }
}

pub async fn update_radio_program(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RadioProgramUpdateRequest>,
) -> Response {
    match state.radio_programs.update_program(id, request).await {
        Ok(program) => ok(RadioProgramView::from(&program)).into_response(),
        Err(e) => handle_error(e),
    }
}

pub async fn delete_radio_program(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.radio_programs.delete_program(id).await {
        Ok(()) => no_content().into_response(),
        Err(e) => handle_error(e),
    }
}

pub async fn add_music_to_radio_program(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AddMusicRequest>,
) -> Response {
    match state
        .radio_programs
        .add_music_to_program(id, request.music_id)
        .await
    {
        Ok(program) => ok(RadioProgramView::from(&program)).into_response(),
        Err(e) => handle_error(e),
    }
}

//! Music HTTP handlers

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    models::{MusicCreateRequest, MusicView},
    web::{
        responses::{created, handle_error, handle_result, no_content, not_found, ok},
        AppState,
    },
};

pub async fn list_musics(State(state): State<AppState>) -> Response {
    handle_result(
        state
            .musics
            .get_all()
            .await
            .map(|musics| musics.iter().map(MusicView::from).collect::<Vec<_>>()),
    )
}

pub async fn get_music(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.musics.get_by_id(id).await {
        Ok(Some(music)) => ok(MusicView::from(&music)).into_response(),
        Ok(None) => not_found("music", id).into_response(),
        Err(e) => handle_error(e),
    }
}

pub async fn create_music(
    State(state): State<AppState>,
    Json(request): Json<MusicCreateRequest>,
) -> Response {
    match state.musics.add(request).await {
        Ok(music) => created(MusicView::from(&music)).into_response(),
        Err(e) => handle_error(e),
    }
}

/// Removes the track from every program playing it
pub async fn delete_music(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.musics.delete(id).await {
        Ok(()) => no_content().into_response(),
        Err(e) => handle_error(e),
    }
}

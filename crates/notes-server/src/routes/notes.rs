//! Notes routes.
//!
//! - GET /notes - Public notes, optionally filtered by subject
//! - GET /notes/me - The caller's notes
//! - GET /notes/{id} - One note
//! - POST /notes - Create a note owned by the caller
//! - PUT /notes/{id} - Partially update an owned note
//! - DELETE /notes/{id} - Delete an owned note

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use notes_core::{NewNote, Note, NoteChanges};

use crate::error::ApiResult;
use crate::extract::{AuthenticatedUser, ListQuery, ValidJson, ValidQuery, parse_note_id};
use crate::service::PaginatedResponse;
use crate::state::AppState;

/// GET /notes
async fn list_public_notes(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> ApiResult<Json<PaginatedResponse<Note>>> {
    let page = state
        .notes()
        .list_public_notes(query.subject(), query.cursor(), query.limit())
        .await?;
    Ok(Json(page))
}

/// GET /notes/me
async fn list_my_notes(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> ApiResult<Json<PaginatedResponse<Note>>> {
    let page = state
        .notes()
        .list_owner_notes(user.user_id, query.cursor(), query.limit())
        .await?;
    Ok(Json(page))
}

/// GET /notes/{id}
async fn get_note(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Note>> {
    let id = parse_note_id(&id)?;
    Ok(Json(state.notes().get_note(id).await?))
}

/// POST /notes
async fn create_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidJson(body): ValidJson<NewNote>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let note = state.notes().create_note(user.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// PUT /notes/{id}
async fn update_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidJson(changes): ValidJson<NoteChanges>,
) -> ApiResult<Json<Note>> {
    let id = parse_note_id(&id)?;
    let note = state.notes().update_note(user.user_id, id, changes).await?;
    Ok(Json(note))
}

/// DELETE /notes/{id}
async fn delete_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_note_id(&id)?;
    state.notes().delete_note(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build notes routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notes", get(list_public_notes).post(create_note))
        .route("/notes/me", get(list_my_notes))
        .route(
            "/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
}

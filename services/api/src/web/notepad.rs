//! services/api/src/web/notepad.rs
//!
//! Axum handlers for the notepad CRUD surface, plus the master definition for
//! the OpenAPI specification.
//!
//! The acting user id always comes from the validated session (request
//! extensions), never from the client. Denied outcomes are rendered so that a
//! caller cannot tell a missing note from another user's note: detail reads
//! answer one uniform 404, and mutating routes answer a generic 200 whether or
//! not anything happened.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use notepad_core::access::Access;
use notepad_core::domain::Note;
use notepad_core::ports::StorageError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::auth::{AuthResponse, LoginRequest, SignupRequest};
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        list_notes_handler,
        create_form_handler,
        create_note_handler,
        show_note_handler,
        edit_form_handler,
        update_note_handler,
        delete_note_handler,
    ),
    components(
        schemas(SignupRequest, LoginRequest, AuthResponse, NoteForm, NoteResponse, FormDescriptor, StatusResponse)
    ),
    tags(
        (name = "Notepad API", description = "Per-user note CRUD behind cookie-session auth.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Title/body submitted by the create and edit forms. Opaque text; any
/// length/format validation belongs to the form layer in front of the API.
#[derive(Deserialize, ToSchema)]
pub struct NoteForm {
    pub title: String,
    pub body: String,
}

#[derive(Serialize, ToSchema)]
pub struct NoteResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            body: note.body,
            created_at: note.created_at,
        }
    }
}

/// What the create form asks for; the client renders the actual page.
#[derive(Serialize, ToSchema)]
pub struct FormDescriptor {
    pub fields: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

//=========================================================================================
// Response Helpers
//=========================================================================================

fn storage_failure(e: StorageError) -> (StatusCode, String) {
    error!("Notepad storage failure: {:?}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal error".to_string(),
    )
}

/// The one body every denied detail read gets, regardless of why.
fn opaque_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(StatusResponse {
            status: "not found".to_string(),
        }),
    )
        .into_response()
}

/// The one body every mutating route answers when there is nothing to say.
fn generic_ok() -> Response {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
    .into_response()
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /notepad - list the acting user's notes, oldest first.
#[utoipa::path(
    get,
    path = "/notepad",
    responses(
        (status = 200, description = "The user's notes", body = [NoteResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_notes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let notes = state
        .notes
        .list_for_user(user_id)
        .await
        .map_err(storage_failure)?;
    let body: Vec<NoteResponse> = notes.into_iter().map(NoteResponse::from).collect();
    Ok(Json(body))
}

/// GET /notepad/create - describe the create form.
#[utoipa::path(
    get,
    path = "/notepad/create",
    responses(
        (status = 200, description = "Create form descriptor", body = FormDescriptor),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn create_form_handler() -> Json<FormDescriptor> {
    Json(FormDescriptor {
        fields: vec!["title".to_string(), "body".to_string()],
    })
}

/// POST /notepad/create - create a note owned by the acting user.
#[utoipa::path(
    post,
    path = "/notepad/create",
    request_body = NoteForm,
    responses(
        (status = 200, description = "Note created", body = NoteResponse),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_note_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(form): Json<NoteForm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let note = state
        .notes
        .create(user_id, &form.title, &form.body)
        .await
        .map_err(storage_failure)?;
    Ok(Json(NoteResponse::from(note)))
}

/// GET /notepad/{id} - note detail, ownership-gated.
#[utoipa::path(
    get,
    path = "/notepad/{id}",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "The note", body = NoteResponse),
        (status = 404, description = "No such note for this user"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn show_note_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(note_id): Path<Uuid>,
) -> Result<Response, (StatusCode, String)> {
    match state
        .notes
        .get_if_owned(user_id, note_id)
        .await
        .map_err(storage_failure)?
    {
        Access::Granted(note) => Ok(Json(NoteResponse::from(note)).into_response()),
        Access::Denied => Ok(opaque_not_found()),
    }
}

/// GET /notepad/edit/{id} - current values for the edit form, same gate as
/// the detail view.
#[utoipa::path(
    get,
    path = "/notepad/edit/{id}",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "The note to edit", body = NoteResponse),
        (status = 404, description = "No such note for this user"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn edit_form_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(note_id): Path<Uuid>,
) -> Result<Response, (StatusCode, String)> {
    show_note_handler(State(state), Extension(user_id), Path(note_id)).await
}

/// POST /notepad/edit/{id} - overwrite title/body if the acting user owns the
/// note. A denied edit writes nothing and still answers 200 with a generic
/// body, so probing edits reveal nothing about other users' note ids.
#[utoipa::path(
    post,
    path = "/notepad/edit/{id}",
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = NoteForm,
    responses(
        (status = 200, description = "Updated note, or a generic body when nothing was done"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_note_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(note_id): Path<Uuid>,
    Json(form): Json<NoteForm>,
) -> Result<Response, (StatusCode, String)> {
    match state
        .notes
        .update_if_owned(user_id, note_id, &form.title, &form.body)
        .await
        .map_err(storage_failure)?
    {
        Access::Granted(note) => Ok(Json(NoteResponse::from(note)).into_response()),
        Access::Denied => Ok(generic_ok()),
    }
}

/// POST /notepad/delete/{id} - delete if owned. The response is identical
/// whether the note was deleted, missing, or someone else's.
#[utoipa::path(
    post,
    path = "/notepad/delete/{id}",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "Generic acknowledgement", body = StatusResponse),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_note_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(note_id): Path<Uuid>,
) -> Result<Response, (StatusCode, String)> {
    state
        .notes
        .delete_if_owned(user_id, note_id)
        .await
        .map_err(storage_failure)?;
    Ok(generic_ok())
}

//! Note routes. Each handler is one [`api::NoteService`] call.

use api::{Error, NoteView, ShareInfo};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{json_body, Authenticated};
use crate::error::ApiError;
use crate::{AppState, Backend};

#[derive(Debug, Deserialize)]
pub struct CreateNote {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareNote {
    #[serde(default)]
    pub username_or_email: String,
    #[serde(default)]
    pub permission: String,
}

fn note_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| Error::invalid("Invalid note id").into())
}

pub async fn create<S: Backend>(
    State(state): State<AppState<S>>,
    Authenticated(caller): Authenticated,
    body: Result<Json<CreateNote>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteView>), ApiError> {
    let req = json_body(body)?;
    let note = state.notes.create(&caller, &req.title, &req.content).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn list_owned<S: Backend>(
    State(state): State<AppState<S>>,
    Authenticated(caller): Authenticated,
) -> Result<Json<Vec<NoteView>>, ApiError> {
    Ok(Json(state.notes.list_owned(&caller).await?))
}

pub async fn list_shared<S: Backend>(
    State(state): State<AppState<S>>,
    Authenticated(caller): Authenticated,
) -> Result<Json<Vec<NoteView>>, ApiError> {
    Ok(Json(state.notes.list_shared(&caller).await?))
}

pub async fn read<S: Backend>(
    State(state): State<AppState<S>>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<NoteView>, ApiError> {
    let id = note_id(&id)?;
    Ok(Json(state.notes.read(id, &caller).await?))
}

pub async fn update<S: Backend>(
    State(state): State<AppState<S>>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<UpdateNote>, JsonRejection>,
) -> Result<Json<NoteView>, ApiError> {
    let id = note_id(&id)?;
    let req = json_body(body)?;
    Ok(Json(
        state
            .notes
            .update(id, &caller, req.title, req.content)
            .await?,
    ))
}

pub async fn delete<S: Backend>(
    State(state): State<AppState<S>>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = note_id(&id)?;
    state.notes.delete(id, &caller).await?;
    Ok(Json(json!({ "message": "Note deleted" })))
}

pub async fn share<S: Backend>(
    State(state): State<AppState<S>>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<ShareNote>, JsonRejection>,
) -> Result<(StatusCode, Json<ShareInfo>), ApiError> {
    let id = note_id(&id)?;
    let req = json_body(body)?;
    let info = state
        .notes
        .share(id, &caller, &req.username_or_email, &req.permission)
        .await?;
    Ok((StatusCode::CREATED, Json(info)))
}

use axum::extract::State;
use axum::Json;
use store::AuditEvent;

use super::Authenticated;
use crate::error::ApiError;
use crate::{AppState, Backend};

/// The caller's own audit events, newest first.
pub async fn list<S: Backend>(
    State(state): State<AppState<S>>,
    Authenticated(caller): Authenticated,
) -> Result<Json<Vec<AuditEvent>>, ApiError> {
    Ok(Json(state.notes.audit().list_for(caller.id()).await?))
}

//! Account routes. A successful register or login stores the user id in the
//! session; logout flushes it.

use api::auth::SESSION_USER_ID_KEY;
use api::UserInfo;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;

use super::{json_body, session_user_id, SourceAddr};
use crate::error::ApiError;
use crate::{AppState, Backend};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

async fn start_session(session: &Session, user: &UserInfo) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session
        .insert(SESSION_USER_ID_KEY, user.id.to_string())
        .await?;
    Ok(())
}

pub async fn register<S: Backend>(
    State(state): State<AppState<S>>,
    session: Session,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    let req = json_body(body)?;
    let user = state
        .accounts
        .register(&req.name, &req.email, &req.password)
        .await?;
    start_session(&session, &user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login<S: Backend>(
    State(state): State<AppState<S>>,
    session: Session,
    SourceAddr(source): SourceAddr,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserInfo>, ApiError> {
    let req = json_body(body)?;
    let user = state
        .accounts
        .login(&req.email, &req.password, source.as_deref())
        .await?;
    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "Logged in");
    Ok(Json(user))
}

pub async fn logout(session: Session) -> Result<Json<Value>, ApiError> {
    session.flush().await?;
    Ok(Json(json!({ "message": "Logged out" })))
}

/// The session's user, or `null` when nobody is logged in.
pub async fn me<S: Backend>(
    State(state): State<AppState<S>>,
    session: Session,
) -> Result<Json<Option<UserInfo>>, ApiError> {
    let Some(user_id) = session_user_id(&session).await? else {
        return Ok(Json(None));
    };
    Ok(Json(state.accounts.find(user_id).await?))
}

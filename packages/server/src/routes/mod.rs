//! # Routes
//!
//! Every route lives under `/api` except the liveness check at `/`.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | `/api/auth/register` | [`auth::register`] |
//! | POST | `/api/auth/login` | [`auth::login`] |
//! | POST | `/api/auth/logout` | [`auth::logout`] |
//! | GET | `/api/auth/me` | [`auth::me`] |
//! | POST | `/api/notes` | [`notes::create`] |
//! | GET | `/api/notes/my` | [`notes::list_owned`] |
//! | GET | `/api/notes/shared` | [`notes::list_shared`] |
//! | GET, PUT, DELETE | `/api/notes/{id}` | [`notes::read`], [`notes::update`], [`notes::delete`] |
//! | POST | `/api/notes/{id}/share` | [`notes::share`] |
//! | GET | `/api/audit` | [`audit::list`] |
//!
//! Note routes and the audit route require a session; see [`Authenticated`].

use std::net::SocketAddr;

use api::auth::SESSION_USER_ID_KEY;
use api::{Caller, Error};
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use uuid::Uuid;

use crate::error::ApiError;
use crate::settings;
use crate::{AppState, Backend};

pub mod audit;
pub mod auth;
pub mod notes;

/// The `/api` routes plus the liveness check, without session or trace layers.
pub fn router<S: Backend>(state: AppState<S>) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register::<S>))
        .route("/auth/login", post(auth::login::<S>))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me::<S>))
        .route("/notes", post(notes::create::<S>))
        .route("/notes/my", get(notes::list_owned::<S>))
        .route("/notes/shared", get(notes::list_shared::<S>))
        .route(
            "/notes/{id}",
            get(notes::read::<S>)
                .put(notes::update::<S>)
                .delete(notes::delete::<S>),
        )
        .route("/notes/{id}/share", post(notes::share::<S>))
        .route("/audit", get(audit::list::<S>));

    Router::new()
        .route("/", get(health))
        .nest("/api", api)
        .with_state(state)
}

/// [`router`] wrapped in the session and request-tracing layers.
pub fn app<S, St>(state: AppState<S>, sessions: St, config: &settings::Session) -> Router
where
    S: Backend,
    St: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(sessions)
        .with_secure(config.secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            config.expiry_hours,
        )));

    router(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "Secure Notes Vault API running"
}

/// The caller's network address, for the audit trail.
///
/// The socket peer from [`ConnectInfo`], or the first `X-Forwarded-For` hop when
/// `server.trust_forwarded_for` is on. The header is client-controlled otherwise.
pub struct SourceAddr(pub Option<String>);

impl SourceAddr {
    fn from_parts(parts: &Parts, trust_forwarded_for: bool) -> Self {
        let forwarded = trust_forwarded_for
            .then(|| parts.headers.get("x-forwarded-for"))
            .flatten()
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self(forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        }))
    }
}

impl<S: Backend> FromRequestParts<AppState<S>> for SourceAddr {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, state.trust_forwarded_for))
    }
}

/// A request from a logged-in user. Rejects with 401 when there is no session
/// or the account behind it is gone.
pub struct Authenticated(pub Caller);

impl<S: Backend> FromRequestParts<AppState<S>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| Error::Unexpected(msg.to_string()))?;

        let Some(user_id) = session_user_id(&session).await? else {
            return Err(Error::Unauthorized("Not logged in".into()).into());
        };
        let identity = state.accounts.identity(user_id).await?;

        let mut caller = Caller::new(identity);
        caller.source_addr = SourceAddr::from_parts(parts, state.trust_forwarded_for).0;
        Ok(Self(caller))
    }
}

/// The user id stored at login. A malformed value counts as no session.
pub(crate) async fn session_user_id(session: &Session) -> Result<Option<Uuid>, ApiError> {
    let raw: Option<String> = session.get(SESSION_USER_ID_KEY).await?;
    Ok(raw.and_then(|id| Uuid::parse_str(&id).ok()))
}

/// Unwrap a JSON body, turning axum's rejection into a 400.
pub(crate) fn json_body<T>(body: Result<axum::Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|axum::Json(value)| value)
        .map_err(|e| Error::invalid(e.body_text()).into())
}

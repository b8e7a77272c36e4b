//! HTTP + WebSocket surface: chat widget sessions, public site endpoints,
//! admin CRUD and the change stream.

pub mod admin;
pub mod chat;
pub mod site;
pub mod ws;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::chat::SessionRegistry;
use crate::error::{ChatError, ConsultantError, DatabaseError, Error, LeadError};
use crate::lead::LeadSink;
use crate::store::ContentStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub store: Arc<dyn ContentStore>,
    /// Destination for contact-form leads; the registry holds the same sink.
    pub sink: Arc<dyn LeadSink>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, sink: Arc<dyn LeadSink>) -> Self {
        Self {
            registry: SessionRegistry::new(Arc::clone(&sink)),
            store,
            sink,
        }
    }
}

/// Build the full router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(chat::routes())
        .merge(site::routes())
        .merge(admin::routes())
        .merge(ws::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "servicex"
    }))
}

// ── Errors ──────────────────────────────────────────────────────────

/// Error returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    App(Error),
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::App(Error::Chat(e)) => match e {
                ChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
                ChatError::UnknownService(_) => StatusCode::BAD_REQUEST,
                ChatError::InputNotAccepted { .. }
                | ChatError::InvalidTransition { .. }
                | ChatError::NothingToRetry { .. } => StatusCode::CONFLICT,
            },
            Self::App(Error::Database(e)) | Self::App(Error::Lead(LeadError::Store(e))) => {
                database_status(e)
            }
            Self::App(Error::Lead(LeadError::Invalid(_))) => StatusCode::BAD_REQUEST,
            Self::App(Error::Lead(_)) => StatusCode::BAD_GATEWAY,
            Self::App(Error::Consultant(_)) => StatusCode::BAD_REQUEST,
            Self::App(Error::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn database_status(e: &DatabaseError) -> StatusCode {
    match e {
        DatabaseError::NotFound { .. } => StatusCode::NOT_FOUND,
        DatabaseError::Constraint(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::App(e) => e.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        };
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "Request rejected");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::App(e)
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        Self::App(e.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        Self::App(e.into())
    }
}

impl From<LeadError> for ApiError {
    fn from(e: LeadError) -> Self {
        Self::App(e.into())
    }
}

impl From<ConsultantError> for ApiError {
    fn from(e: ConsultantError) -> Self {
        Self::App(e.into())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (ChatError::SessionNotFound(Uuid::new_v4()).into(), StatusCode::NOT_FOUND),
            (
                ChatError::InputNotAccepted {
                    step: "done".into(),
                    input: "text".into(),
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (ChatError::UnknownService("seo".into()).into(), StatusCode::BAD_REQUEST),
            (LeadError::Invalid("name is required".into()).into(), StatusCode::BAD_REQUEST),
            (LeadError::Transport("refused".into()).into(), StatusCode::BAD_GATEWAY),
            (
                LeadError::Rejected {
                    status: 401,
                    body: String::new(),
                }
                .into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                DatabaseError::NotFound {
                    entity: "contacts".into(),
                    id: "7".into(),
                }
                .into(),
                StatusCode::NOT_FOUND,
            ),
            (DatabaseError::Constraint("slug".into()).into(), StatusCode::CONFLICT),
            (DatabaseError::Query("boom".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
            (
                LeadError::Store(DatabaseError::Query("boom".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ConsultantError::MissingField("industry").into(), StatusCode::BAD_REQUEST),
            (ApiError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err:?}");
        }
    }
}

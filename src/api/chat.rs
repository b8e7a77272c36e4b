//! Chat widget endpoints: one session per open widget.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use super::{ApiResult, AppState};
use crate::chat::{Affordance, ChatController, ChatInput, ChatMessage, ChatSession, ChatStep, Reply};

/// Snapshot of a session for rendering the whole widget.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub step: ChatStep,
    pub prompt: String,
    pub affordances: Vec<Affordance>,
    pub transcript: Vec<ChatMessage>,
    pub session: ChatSession,
}

impl SessionView {
    fn of(controller: &ChatController) -> Self {
        Self {
            id: controller.id(),
            step: controller.step(),
            prompt: controller.current_prompt(),
            affordances: controller.current_affordances(),
            transcript: controller.transcript(),
            session: controller.session().clone(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/chat/sessions", post(open_session))
        .route(
            "/api/chat/sessions/{id}",
            get(get_session).delete(close_session),
        )
        .route("/api/chat/sessions/{id}/input", post(submit_input))
        .route("/api/chat/sessions/{id}/reset", post(reset_session))
        .route("/api/chat/sessions/{id}/retry", post(retry_submission))
}

async fn open_session(State(state): State<AppState>) -> impl IntoResponse {
    let (_, handle) = state.registry.open().await;
    let view = SessionView::of(&*handle.lock().await);
    (StatusCode::CREATED, Json(view))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    let handle = state.registry.get(id).await?;
    let view = SessionView::of(&*handle.lock().await);
    Ok(Json(view))
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    // Surface a 404 for unknown sessions.
    state.registry.get(id).await?;
    state.registry.close(id).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_input(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ChatInput>,
) -> ApiResult<Json<Reply>> {
    let handle = state.registry.get(id).await?;
    let reply = handle.lock().await.submit(input).await?;
    Ok(Json(reply))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    let handle = state.registry.get(id).await?;
    let mut controller = handle.lock().await;
    controller.reset();
    Ok(Json(SessionView::of(&controller)))
}

async fn retry_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Reply>> {
    let handle = state.registry.get(id).await?;
    let reply = handle.lock().await.retry_submission().await?;
    Ok(Json(reply))
}

//! Admin console CRUD. No authentication is applied here; deployments
//! put these routes behind their own gateway.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use secrecy::SecretString;
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState};
use crate::store::model::{
    AdminUser, AdminUserUpdate, Announcement, AnnouncementUpdate, BlogPost, BlogPostUpdate,
    CareerApplication, Consultation, ConsultationStatus, Contact, ContactStatus, NewAdminUser,
    NewAnnouncement, NewBlogPost, PostStatus, Role,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/contacts", get(list_contacts))
        .route(
            "/api/admin/contacts/{id}",
            patch(update_contact).delete(delete_contact),
        )
        .route("/api/admin/posts", get(list_posts).post(create_post))
        .route(
            "/api/admin/posts/{id}",
            patch(update_post).delete(delete_post),
        )
        .route("/api/admin/users", get(list_users).post(create_user))
        .route(
            "/api/admin/users/{id}",
            patch(update_user).delete(delete_user),
        )
        .route(
            "/api/admin/announcements",
            get(list_announcements).post(create_announcement),
        )
        .route(
            "/api/admin/announcements/{id}",
            patch(update_announcement).delete(delete_announcement),
        )
        .route("/api/admin/consultations", get(list_consultations))
        .route("/api/admin/consultations/{id}", patch(update_consultation))
        .route("/api/admin/careers", get(list_applications))
        .route("/api/admin/careers/{id}", delete(delete_application))
}

#[derive(Debug, Deserialize)]
struct StatusBody<S> {
    status: S,
}

// ── Contacts ────────────────────────────────────────────────────────

async fn list_contacts(State(state): State<AppState>) -> ApiResult<Json<Vec<Contact>>> {
    Ok(Json(state.store.list_contacts().await?))
}

async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody<ContactStatus>>,
) -> ApiResult<Json<Contact>> {
    Ok(Json(state.store.update_contact_status(id, body.status).await?))
}

async fn delete_contact(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.store.delete_contact(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Blog posts ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct PostFilter {
    status: Option<PostStatus>,
}

async fn list_posts(
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> ApiResult<Json<Vec<BlogPost>>> {
    Ok(Json(state.store.list_posts(filter.status).await?))
}

async fn create_post(
    State(state): State<AppState>,
    Json(post): Json<NewBlogPost>,
) -> ApiResult<(StatusCode, Json<BlogPost>)> {
    if post.title.trim().is_empty() || post.slug.trim().is_empty() {
        return Err(ApiError::BadRequest("title and slug are required".into()));
    }
    let created = state.store.create_post(&post).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<BlogPostUpdate>,
) -> ApiResult<Json<BlogPost>> {
    Ok(Json(state.store.update_post(id, &update).await?))
}

async fn delete_post(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.store.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Users ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateUserRequest {
    username: String,
    email: String,
    role: Role,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default = "active_by_default")]
    is_active: bool,
    password: String,
}

fn active_by_default() -> bool {
    true
}

async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<AdminUser>>> {
    Ok(Json(state.store.list_users().await?))
}

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<AdminUser>)> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".into(),
        ));
    }
    let user = NewAdminUser {
        username: req.username,
        email: req.email,
        role: req.role,
        full_name: req.full_name,
        is_active: req.is_active,
        password: SecretString::from(req.password),
    };
    let created = state.store.create_user(&user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<AdminUserUpdate>,
) -> ApiResult<Json<AdminUser>> {
    Ok(Json(state.store.update_user(id, &update).await?))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.store.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Announcements ───────────────────────────────────────────────────

async fn list_announcements(State(state): State<AppState>) -> ApiResult<Json<Vec<Announcement>>> {
    Ok(Json(state.store.list_all_announcements().await?))
}

async fn create_announcement(
    State(state): State<AppState>,
    Json(announcement): Json<NewAnnouncement>,
) -> ApiResult<(StatusCode, Json<Announcement>)> {
    let created = state.store.create_announcement(&announcement).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<AnnouncementUpdate>,
) -> ApiResult<Json<Announcement>> {
    Ok(Json(state.store.update_announcement(id, &update).await?))
}

async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store.delete_announcement(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Consultations & careers ─────────────────────────────────────────

async fn list_consultations(State(state): State<AppState>) -> ApiResult<Json<Vec<Consultation>>> {
    Ok(Json(state.store.list_consultations().await?))
}

async fn update_consultation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody<ConsultationStatus>>,
) -> ApiResult<Json<Consultation>> {
    Ok(Json(
        state
            .store
            .update_consultation_status(id, body.status)
            .await?,
    ))
}

async fn list_applications(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CareerApplication>>> {
    Ok(Json(state.store.list_applications().await?))
}

async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store.delete_application(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Public site endpoints: contact popup, careers, consultant, blog and
//! announcement banners.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ApiError, ApiResult, AppState};
use crate::consultant::{self, ConsultationForm, DemoWebsite, Recommendation};
use crate::lead::ContactForm;
use crate::store::model::{Announcement, BlogPost, CareerApplication, NewCareerApplication, PostStatus};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact", post(submit_contact))
        .route("/api/careers", post(submit_application))
        .route("/api/consultant/recommendations", post(recommend))
        .route("/api/consultant/demo", post(generate_demo))
        .route("/api/posts", get(list_published_posts))
        .route("/api/posts/{slug}", get(view_post))
        .route("/api/announcements", get(list_announcements))
}

// ── Contact & careers ───────────────────────────────────────────────

async fn submit_contact(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let lead = form.into_lead()?;
    state.sink.submit_lead(&lead).await?;
    info!(lead_services = ?lead.services, "Contact form lead accepted");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"status": "received"})),
    ))
}

async fn submit_application(
    State(state): State<AppState>,
    Json(application): Json<NewCareerApplication>,
) -> ApiResult<(StatusCode, Json<CareerApplication>)> {
    application.validate().map_err(ApiError::BadRequest)?;
    let stored = state.store.create_application(&application).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

// ── Consultant ──────────────────────────────────────────────────────

async fn recommend(Json(form): Json<ConsultationForm>) -> ApiResult<Json<Vec<Recommendation>>> {
    form.validate()?;
    Ok(Json(consultant::recommendations(&form)))
}

#[derive(Debug, Serialize)]
pub struct DemoResponse {
    pub recommendations: Vec<Recommendation>,
    pub demo_website: DemoWebsite,
    /// Id of the stored consultation, absent if storing it failed.
    pub consultation_id: Option<i64>,
}

async fn generate_demo(
    State(state): State<AppState>,
    Json(form): Json<ConsultationForm>,
) -> ApiResult<Json<DemoResponse>> {
    form.validate()?;
    let recommendations = consultant::recommendations(&form);
    let demo_website = consultant::demo_website(&form);

    let record = form.to_record(&recommendations, Some(&demo_website));
    let consultation_id = match state.store.create_consultation(&record).await {
        Ok(stored) => Some(stored.id),
        Err(e) => {
            warn!(error = %e, business = %form.business_name, "Failed to store consultation");
            None
        }
    };

    Ok(Json(DemoResponse {
        recommendations,
        demo_website,
        consultation_id,
    }))
}

// ── Blog & announcements ────────────────────────────────────────────

async fn list_published_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<BlogPost>>> {
    let posts = state.store.list_posts(Some(PostStatus::Published)).await?;
    Ok(Json(posts))
}

async fn view_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<BlogPost>> {
    Ok(Json(state.store.view_post(&slug).await?))
}

#[derive(Debug, Default, Deserialize)]
struct AnnouncementQuery {
    #[serde(default)]
    homepage: bool,
}

async fn list_announcements(
    State(state): State<AppState>,
    Query(query): Query<AnnouncementQuery>,
) -> ApiResult<Json<Vec<Announcement>>> {
    Ok(Json(state.store.list_announcements(query.homepage).await?))
}

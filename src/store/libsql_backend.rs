//! libSQL backend for the content store.
//!
//! Holds one connection for all operations. Timestamps are written as
//! RFC 3339 text; JSON-valued columns are stored as serialized text.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::params::{IntoParams, Params};
use libsql::{Connection, Database as LibSqlDatabase, Row, Value, params};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::changes::{ChangeFeed, ChangeOp};
use super::migrations;
use super::model::{
    AdminUser, AdminUserUpdate, Announcement, AnnouncementUpdate, BlogPost, BlogPostUpdate,
    CareerApplication, Consultation, ConsultationStatus, Contact, ContactStatus, Entity,
    NewAdminUser, NewAnnouncement, NewBlogPost, NewCareerApplication, NewConsultation,
    PostStatus,
};
use super::traits::ContentStore;
use crate::error::{DatabaseError, LeadError};
use crate::lead::{LeadRecord, LeadSink};

/// libSQL-backed [`ContentStore`].
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    changes: ChangeFeed,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
            changes: ChangeFeed::new(),
        };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn query_all<T>(
        &self,
        op: &str,
        sql: &str,
        params: impl IntoParams,
        map: fn(&Row) -> Result<T, DatabaseError>,
    ) -> Result<Vec<T>, DatabaseError> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?
        {
            out.push(map(&row)?);
        }
        Ok(out)
    }

    async fn query_one<T>(
        &self,
        op: &str,
        sql: &str,
        params: impl IntoParams,
        map: fn(&Row) -> Result<T, DatabaseError>,
    ) -> Result<Option<T>, DatabaseError> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?
        {
            Some(row) => Ok(Some(map(&row)?)),
            None => Ok(None),
        }
    }

    /// Run an `INSERT ... RETURNING id` and hand back the new row id.
    async fn insert_returning_id(
        &self,
        op: &str,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<i64, DatabaseError> {
        self.query_one(op, sql, params, |row| {
            row.get::<i64>(0).map_err(|e| DatabaseError::Query(format!("insert id: {e}")))
        })
        .await?
        .ok_or_else(|| DatabaseError::Query(format!("{op}: insert returned no id")))
    }

    /// Execute a statement that must touch exactly one row identified by `id`.
    async fn execute_for_id(
        &self,
        op: &str,
        entity: Entity,
        id: i64,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<(), DatabaseError> {
        let changed = self
            .conn
            .execute(sql, params)
            .await
            .map_err(|e| map_write_error(op, e))?;
        if changed == 0 {
            return Err(not_found(entity, id));
        }
        Ok(())
    }

    /// Apply a partial update built from `(column, value)` pairs.
    async fn update_columns(
        &self,
        op: &str,
        entity: Entity,
        id: i64,
        columns: Vec<(&'static str, Value)>,
    ) -> Result<(), DatabaseError> {
        let mut assignments = Vec::with_capacity(columns.len() + 1);
        let mut values = Vec::with_capacity(columns.len() + 2);
        for (column, value) in columns {
            values.push(value);
            assignments.push(format!("{column} = ?{}", values.len()));
        }
        values.push(Value::Text(Utc::now().to_rfc3339()));
        assignments.push(format!("updated_at = ?{}", values.len()));
        values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            entity.table(),
            assignments.join(", "),
            values.len()
        );
        self.execute_for_id(op, entity, id, &sql, Params::Positional(values))
            .await
    }

    async fn delete_row(&self, op: &str, entity: Entity, id: i64) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", entity.table());
        self.execute_for_id(op, entity, id, &sql, params![id]).await?;
        info!(entity = %entity, id, "Row deleted");
        self.changes.publish(entity, ChangeOp::Delete);
        Ok(())
    }

    async fn get_contact(&self, id: i64) -> Result<Contact, DatabaseError> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1");
        self.query_one("get_contact", &sql, params![id], row_to_contact)
            .await?
            .ok_or_else(|| not_found(Entity::Contacts, id))
    }

    async fn get_post(&self, id: i64) -> Result<BlogPost, DatabaseError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE id = ?1");
        self.query_one("get_post", &sql, params![id], row_to_post)
            .await?
            .ok_or_else(|| not_found(Entity::BlogPosts, id))
    }

    async fn get_user(&self, id: i64) -> Result<AdminUser, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users WHERE id = ?1");
        self.query_one("get_user", &sql, params![id], row_to_user)
            .await?
            .ok_or_else(|| not_found(Entity::AdminUsers, id))
    }

    async fn get_announcement(&self, id: i64) -> Result<Announcement, DatabaseError> {
        let sql = format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = ?1");
        self.query_one("get_announcement", &sql, params![id], row_to_announcement)
            .await?
            .ok_or_else(|| not_found(Entity::Announcements, id))
    }

    async fn get_consultation(&self, id: i64) -> Result<Consultation, DatabaseError> {
        let sql = format!("SELECT {CONSULTATION_COLUMNS} FROM ai_consultations WHERE id = ?1");
        self.query_one("get_consultation", &sql, params![id], row_to_consultation)
            .await?
            .ok_or_else(|| not_found(Entity::Consultations, id))
    }

    async fn get_application(&self, id: i64) -> Result<CareerApplication, DatabaseError> {
        let sql = format!("SELECT {CAREER_COLUMNS} FROM careers WHERE id = ?1");
        self.query_one("get_application", &sql, params![id], row_to_application)
            .await?
            .ok_or_else(|| not_found(Entity::Careers, id))
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn not_found(entity: Entity, id: i64) -> DatabaseError {
    DatabaseError::NotFound {
        entity: entity.to_string(),
        id: id.to_string(),
    }
}

fn map_write_error(op: &str, e: libsql::Error) -> DatabaseError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        DatabaseError::Constraint(format!("{op}: {message}"))
    } else {
        DatabaseError::Query(format!("{op}: {message}"))
    }
}

fn text(row: &Row, idx: i32) -> Result<String, DatabaseError> {
    row.get::<String>(idx)
        .map_err(|e| DatabaseError::Query(format!("column {idx}: {e}")))
}

fn int(row: &Row, idx: i32) -> Result<i64, DatabaseError> {
    row.get::<i64>(idx)
        .map_err(|e| DatabaseError::Query(format!("column {idx}: {e}")))
}

/// Nullable text column.
fn opt_col(row: &Row, idx: i32) -> Option<String> {
    row.get::<String>(idx).ok()
}

fn parse_col<T: std::str::FromStr<Err = String>>(row: &Row, idx: i32) -> Result<T, DatabaseError> {
    text(row, idx)?
        .parse()
        .map_err(DatabaseError::Serialization)
}

fn json_col(row: &Row, idx: i32) -> Result<Option<serde_json::Value>, DatabaseError> {
    opt_col(row, idx)
        .map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| DatabaseError::Serialization(format!("column {idx}: {e}")))
}

fn opt_text(s: Option<&str>) -> Value {
    match s {
        Some(s) => Value::Text(s.to_string()),
        None => Value::Null,
    }
}

fn opt_json(v: Option<&serde_json::Value>) -> Value {
    match v {
        Some(v) => Value::Text(v.to_string()),
        None => Value::Null,
    }
}

fn flag(b: bool) -> Value {
    Value::Integer(i64::from(b))
}

/// Hex SHA-256 digest of an admin password.
fn password_digest(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ── Row mapping ─────────────────────────────────────────────────────

const CONTACT_COLUMNS: &str = "id, name, email, phone, company, website, services, budget, timeline, message, status, created_at, updated_at";

fn row_to_contact(row: &Row) -> Result<Contact, DatabaseError> {
    let services = text(row, 6)?;
    Ok(Contact {
        id: int(row, 0)?,
        name: text(row, 1)?,
        email: text(row, 2)?,
        phone: text(row, 3)?,
        company: opt_col(row, 4),
        website: opt_col(row, 5),
        services: serde_json::from_str(&services)
            .map_err(|e| DatabaseError::Serialization(format!("contact services: {e}")))?,
        budget: opt_col(row, 7),
        timeline: opt_col(row, 8),
        message: opt_col(row, 9),
        status: parse_col(row, 10)?,
        created_at: parse_datetime(&text(row, 11)?),
        updated_at: parse_datetime(&text(row, 12)?),
    })
}

const POST_COLUMNS: &str = "id, title, slug, excerpt, content, category, author, featured_image, status, views, created_at, updated_at";

fn row_to_post(row: &Row) -> Result<BlogPost, DatabaseError> {
    Ok(BlogPost {
        id: int(row, 0)?,
        title: text(row, 1)?,
        slug: text(row, 2)?,
        excerpt: opt_col(row, 3),
        content: text(row, 4)?,
        category: text(row, 5)?,
        author: text(row, 6)?,
        featured_image: opt_col(row, 7),
        status: parse_col(row, 8)?,
        views: int(row, 9)?,
        created_at: parse_datetime(&text(row, 10)?),
        updated_at: parse_datetime(&text(row, 11)?),
    })
}

const USER_COLUMNS: &str = "id, username, email, role, full_name, is_active, created_at, updated_at";

fn row_to_user(row: &Row) -> Result<AdminUser, DatabaseError> {
    Ok(AdminUser {
        id: int(row, 0)?,
        username: text(row, 1)?,
        email: text(row, 2)?,
        role: parse_col(row, 3)?,
        full_name: opt_col(row, 4),
        is_active: int(row, 5)? != 0,
        created_at: parse_datetime(&text(row, 6)?),
        updated_at: parse_datetime(&text(row, 7)?),
    })
}

const ANNOUNCEMENT_COLUMNS: &str = "id, title, content, type, is_active, show_on_homepage, created_by, created_at, updated_at";

fn row_to_announcement(row: &Row) -> Result<Announcement, DatabaseError> {
    Ok(Announcement {
        id: int(row, 0)?,
        title: text(row, 1)?,
        content: text(row, 2)?,
        kind: parse_col(row, 3)?,
        is_active: int(row, 4)? != 0,
        show_on_homepage: int(row, 5)? != 0,
        created_by: int(row, 6)?,
        created_at: parse_datetime(&text(row, 7)?),
        updated_at: parse_datetime(&text(row, 8)?),
    })
}

const CONSULTATION_COLUMNS: &str = "id, business_name, industry, business_type, target_audience, goals, budget, timeline, current_website, competitors, special_requirements, preferred_colors, design_style, recommendations, demo_website, status, created_at, updated_at";

fn row_to_consultation(row: &Row) -> Result<Consultation, DatabaseError> {
    Ok(Consultation {
        id: int(row, 0)?,
        business_name: text(row, 1)?,
        industry: text(row, 2)?,
        business_type: text(row, 3)?,
        target_audience: opt_col(row, 4),
        goals: opt_col(row, 5),
        budget: opt_col(row, 6),
        timeline: opt_col(row, 7),
        current_website: opt_col(row, 8),
        competitors: opt_col(row, 9),
        special_requirements: opt_col(row, 10),
        preferred_colors: opt_col(row, 11),
        design_style: opt_col(row, 12),
        recommendations: json_col(row, 13)?,
        demo_website: json_col(row, 14)?,
        status: parse_col(row, 15)?,
        created_at: parse_datetime(&text(row, 16)?),
        updated_at: parse_datetime(&text(row, 17)?),
    })
}

const CAREER_COLUMNS: &str = "id, name, email, phone, type, team, why, q1, q2, status, resume, created_at, updated_at";

fn row_to_application(row: &Row) -> Result<CareerApplication, DatabaseError> {
    Ok(CareerApplication {
        id: int(row, 0)?,
        name: text(row, 1)?,
        email: text(row, 2)?,
        phone: text(row, 3)?,
        kind: parse_col(row, 4)?,
        team: text(row, 5)?,
        why: text(row, 6)?,
        q1: opt_col(row, 7),
        q2: opt_col(row, 8),
        status: text(row, 9)?,
        resume: opt_col(row, 10),
        created_at: parse_datetime(&text(row, 11)?),
        updated_at: parse_datetime(&text(row, 12)?),
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl ContentStore for LibSqlStore {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(&self.conn).await
    }

    fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    // ── Contacts ────────────────────────────────────────────────────

    async fn create_contact(&self, lead: &LeadRecord) -> Result<Contact, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let services = serde_json::to_string(&lead.services)
            .map_err(|e| DatabaseError::Serialization(format!("contact services: {e}")))?;

        let id = self
            .insert_returning_id(
                "create_contact",
                "INSERT INTO contacts (name, email, phone, company, website, services, budget, timeline, message, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11) RETURNING id",
                params![
                    lead.name.as_str(),
                    lead.email.as_str(),
                    lead.phone.as_str(),
                    opt_text(lead.company.as_deref()),
                    opt_text(lead.website.as_deref()),
                    services,
                    opt_text(lead.budget.as_deref()),
                    opt_text(lead.timeline.as_deref()),
                    lead.message.as_str(),
                    ContactStatus::New.as_str(),
                    now,
                ],
            )
            .await?;

        info!(contact_id = id, lead_services = ?lead.services, "Contact created");
        self.changes.publish(Entity::Contacts, ChangeOp::Insert);
        self.get_contact(id).await
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, DatabaseError> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at DESC, id DESC");
        self.query_all("list_contacts", &sql, (), row_to_contact).await
    }

    async fn update_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> Result<Contact, DatabaseError> {
        self.update_columns(
            "update_contact_status",
            Entity::Contacts,
            id,
            vec![("status", Value::Text(status.as_str().into()))],
        )
        .await?;
        debug!(contact_id = id, status = %status, "Contact status updated");
        self.changes.publish(Entity::Contacts, ChangeOp::Update);
        self.get_contact(id).await
    }

    async fn delete_contact(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_row("delete_contact", Entity::Contacts, id).await
    }

    // ── Blog posts ──────────────────────────────────────────────────

    async fn create_post(&self, post: &NewBlogPost) -> Result<BlogPost, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let id = self
            .insert_returning_id(
                "create_post",
                "INSERT INTO blog_posts (title, slug, excerpt, content, category, author, featured_image, status, views, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?9) RETURNING id",
                params![
                    post.title.as_str(),
                    post.slug.as_str(),
                    opt_text(post.excerpt.as_deref()),
                    post.content.as_str(),
                    post.category.as_str(),
                    post.author.as_str(),
                    opt_text(post.featured_image.as_deref()),
                    post.status.as_str(),
                    now,
                ],
            )
            .await
            .map_err(|e| match e {
                DatabaseError::Query(m) if m.contains("UNIQUE") => DatabaseError::Constraint(m),
                other => other,
            })?;

        info!(post_id = id, slug = %post.slug, "Blog post created");
        self.changes.publish(Entity::BlogPosts, ChangeOp::Insert);
        self.get_post(id).await
    }

    async fn list_posts(&self, status: Option<PostStatus>) -> Result<Vec<BlogPost>, DatabaseError> {
        match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {POST_COLUMNS} FROM blog_posts WHERE status = ?1 ORDER BY created_at DESC, id DESC"
                );
                self.query_all("list_posts", &sql, params![status.as_str()], row_to_post)
                    .await
            }
            None => {
                let sql = format!("SELECT {POST_COLUMNS} FROM blog_posts ORDER BY created_at DESC, id DESC");
                self.query_all("list_posts", &sql, (), row_to_post).await
            }
        }
    }

    async fn view_post(&self, slug: &str) -> Result<BlogPost, DatabaseError> {
        let changed = self
            .conn
            .execute(
                "UPDATE blog_posts SET views = views + 1 WHERE slug = ?1",
                params![slug],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("view_post: {e}")))?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                entity: Entity::BlogPosts.to_string(),
                id: slug.to_string(),
            });
        }

        let sql = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = ?1");
        let post = self
            .query_one("view_post", &sql, params![slug], row_to_post)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: Entity::BlogPosts.to_string(),
                id: slug.to_string(),
            })?;
        debug!(slug, views = post.views, "Blog post viewed");
        self.changes.publish(Entity::BlogPosts, ChangeOp::Update);
        Ok(post)
    }

    async fn update_post(&self, id: i64, update: &BlogPostUpdate) -> Result<BlogPost, DatabaseError> {
        let mut columns = Vec::new();
        if let Some(v) = &update.title {
            columns.push(("title", Value::Text(v.clone())));
        }
        if let Some(v) = &update.slug {
            columns.push(("slug", Value::Text(v.clone())));
        }
        if let Some(v) = &update.excerpt {
            columns.push(("excerpt", Value::Text(v.clone())));
        }
        if let Some(v) = &update.content {
            columns.push(("content", Value::Text(v.clone())));
        }
        if let Some(v) = &update.category {
            columns.push(("category", Value::Text(v.clone())));
        }
        if let Some(v) = &update.author {
            columns.push(("author", Value::Text(v.clone())));
        }
        if let Some(v) = &update.featured_image {
            columns.push(("featured_image", Value::Text(v.clone())));
        }
        if let Some(v) = update.status {
            columns.push(("status", Value::Text(v.as_str().into())));
        }

        self.update_columns("update_post", Entity::BlogPosts, id, columns)
            .await?;
        self.changes.publish(Entity::BlogPosts, ChangeOp::Update);
        self.get_post(id).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_row("delete_post", Entity::BlogPosts, id).await
    }

    // ── Admin users ─────────────────────────────────────────────────

    async fn create_user(&self, user: &NewAdminUser) -> Result<AdminUser, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let digest = password_digest(user.password.expose_secret());
        let id = self
            .insert_returning_id(
                "create_user",
                "INSERT INTO admin_users (username, email, role, full_name, is_active, password_hash, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING id",
                params![
                    user.username.as_str(),
                    user.email.as_str(),
                    user.role.as_str(),
                    opt_text(user.full_name.as_deref()),
                    flag(user.is_active),
                    digest,
                    now,
                ],
            )
            .await
            .map_err(|e| match e {
                DatabaseError::Query(m) if m.contains("UNIQUE") => DatabaseError::Constraint(m),
                other => other,
            })?;

        info!(user_id = id, username = %user.username, role = %user.role, "Admin user created");
        self.changes.publish(Entity::AdminUsers, ChangeOp::Insert);
        self.get_user(id).await
    }

    async fn list_users(&self) -> Result<Vec<AdminUser>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users ORDER BY created_at DESC, id DESC");
        self.query_all("list_users", &sql, (), row_to_user).await
    }

    async fn update_user(&self, id: i64, update: &AdminUserUpdate) -> Result<AdminUser, DatabaseError> {
        let mut columns = Vec::new();
        if let Some(v) = &update.username {
            columns.push(("username", Value::Text(v.clone())));
        }
        if let Some(v) = &update.email {
            columns.push(("email", Value::Text(v.clone())));
        }
        if let Some(v) = update.role {
            columns.push(("role", Value::Text(v.as_str().into())));
        }
        if let Some(v) = &update.full_name {
            columns.push(("full_name", Value::Text(v.clone())));
        }
        if let Some(v) = update.is_active {
            columns.push(("is_active", flag(v)));
        }

        self.update_columns("update_user", Entity::AdminUsers, id, columns)
            .await?;
        self.changes.publish(Entity::AdminUsers, ChangeOp::Update);
        self.get_user(id).await
    }

    async fn delete_user(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_row("delete_user", Entity::AdminUsers, id).await
    }

    // ── Announcements ───────────────────────────────────────────────

    async fn create_announcement(
        &self,
        announcement: &NewAnnouncement,
    ) -> Result<Announcement, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let id = self
            .insert_returning_id(
                "create_announcement",
                "INSERT INTO announcements (title, content, type, is_active, show_on_homepage, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING id",
                params![
                    announcement.title.as_str(),
                    announcement.content.as_str(),
                    announcement.kind.as_str(),
                    flag(announcement.is_active),
                    flag(announcement.show_on_homepage),
                    announcement.created_by,
                    now,
                ],
            )
            .await?;

        info!(announcement_id = id, kind = %announcement.kind, "Announcement created");
        self.changes.publish(Entity::Announcements, ChangeOp::Insert);
        self.get_announcement(id).await
    }

    async fn list_announcements(&self, homepage_only: bool) -> Result<Vec<Announcement>, DatabaseError> {
        let filter = if homepage_only {
            "is_active = 1 AND show_on_homepage = 1"
        } else {
            "is_active = 1"
        };
        let sql = format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE {filter} ORDER BY created_at DESC, id DESC"
        );
        self.query_all("list_announcements", &sql, (), row_to_announcement)
            .await
    }

    async fn list_all_announcements(&self) -> Result<Vec<Announcement>, DatabaseError> {
        let sql = format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY created_at DESC, id DESC");
        self.query_all("list_all_announcements", &sql, (), row_to_announcement)
            .await
    }

    async fn update_announcement(
        &self,
        id: i64,
        update: &AnnouncementUpdate,
    ) -> Result<Announcement, DatabaseError> {
        let mut columns = Vec::new();
        if let Some(v) = &update.title {
            columns.push(("title", Value::Text(v.clone())));
        }
        if let Some(v) = &update.content {
            columns.push(("content", Value::Text(v.clone())));
        }
        if let Some(v) = update.kind {
            columns.push(("type", Value::Text(v.as_str().into())));
        }
        if let Some(v) = update.is_active {
            columns.push(("is_active", flag(v)));
        }
        if let Some(v) = update.show_on_homepage {
            columns.push(("show_on_homepage", flag(v)));
        }

        self.update_columns("update_announcement", Entity::Announcements, id, columns)
            .await?;
        self.changes.publish(Entity::Announcements, ChangeOp::Update);
        self.get_announcement(id).await
    }

    async fn delete_announcement(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_row("delete_announcement", Entity::Announcements, id)
            .await
    }

    // ── AI consultations ────────────────────────────────────────────

    async fn create_consultation(
        &self,
        c: &NewConsultation,
    ) -> Result<Consultation, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let id = self
            .insert_returning_id(
                "create_consultation",
                "INSERT INTO ai_consultations (business_name, industry, business_type, target_audience, goals, budget, timeline, current_website, competitors, special_requirements, preferred_colors, design_style, recommendations, demo_website, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16) RETURNING id",
                params![
                    c.business_name.as_str(),
                    c.industry.as_str(),
                    c.business_type.as_str(),
                    opt_text(c.target_audience.as_deref()),
                    opt_text(c.goals.as_deref()),
                    opt_text(c.budget.as_deref()),
                    opt_text(c.timeline.as_deref()),
                    opt_text(c.current_website.as_deref()),
                    opt_text(c.competitors.as_deref()),
                    opt_text(c.special_requirements.as_deref()),
                    opt_text(c.preferred_colors.as_deref()),
                    opt_text(c.design_style.as_deref()),
                    opt_json(c.recommendations.as_ref()),
                    opt_json(c.demo_website.as_ref()),
                    ConsultationStatus::New.as_str(),
                    now,
                ],
            )
            .await?;

        info!(consultation_id = id, business = %c.business_name, "Consultation stored");
        self.changes.publish(Entity::Consultations, ChangeOp::Insert);
        self.get_consultation(id).await
    }

    async fn list_consultations(&self) -> Result<Vec<Consultation>, DatabaseError> {
        let sql = format!(
            "SELECT {CONSULTATION_COLUMNS} FROM ai_consultations ORDER BY created_at DESC, id DESC"
        );
        self.query_all("list_consultations", &sql, (), row_to_consultation)
            .await
    }

    async fn update_consultation_status(
        &self,
        id: i64,
        status: ConsultationStatus,
    ) -> Result<Consultation, DatabaseError> {
        self.update_columns(
            "update_consultation_status",
            Entity::Consultations,
            id,
            vec![("status", Value::Text(status.as_str().into()))],
        )
        .await?;
        self.changes.publish(Entity::Consultations, ChangeOp::Update);
        self.get_consultation(id).await
    }

    // ── Careers ─────────────────────────────────────────────────────

    async fn create_application(
        &self,
        application: &NewCareerApplication,
    ) -> Result<CareerApplication, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let id = self
            .insert_returning_id(
                "create_application",
                "INSERT INTO careers (name, email, phone, type, team, why, q1, q2, status, resume, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'new', ?9, ?10, ?10) RETURNING id",
                params![
                    application.name.as_str(),
                    application.email.as_str(),
                    application.phone.as_str(),
                    application.kind.as_str(),
                    application.team.as_str(),
                    application.why.as_str(),
                    opt_text(application.q1.as_deref()),
                    opt_text(application.q2.as_deref()),
                    opt_text(application.resume.as_deref()),
                    now,
                ],
            )
            .await?;

        info!(application_id = id, kind = %application.kind, team = %application.team, "Career application received");
        self.changes.publish(Entity::Careers, ChangeOp::Insert);
        self.get_application(id).await
    }

    async fn list_applications(&self) -> Result<Vec<CareerApplication>, DatabaseError> {
        let sql = format!("SELECT {CAREER_COLUMNS} FROM careers ORDER BY created_at DESC, id DESC");
        self.query_all("list_applications", &sql, (), row_to_application)
            .await
    }

    async fn delete_application(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_row("delete_application", Entity::Careers, id)
            .await
    }
}

/// Chat and contact-form leads land directly in the `contacts` table.
#[async_trait]
impl LeadSink for LibSqlStore {
    async fn submit_lead(&self, lead: &LeadRecord) -> Result<(), LeadError> {
        self.create_contact(lead).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;
    use crate::store::changes::ChangeObserver;
    use crate::store::model::{AnnouncementKind, CareerKind, Role};

    async fn test_store() -> LibSqlStore {
        LibSqlStore::new_memory().await.unwrap()
    }

    fn chat_lead() -> LeadRecord {
        LeadRecord::from_chat("Asha", "9123456789", "support", "Flow: support\nDetails: site is down".into())
    }

    fn new_post(slug: &str, status: PostStatus) -> NewBlogPost {
        NewBlogPost {
            title: "Launching in Pune".into(),
            slug: slug.into(),
            excerpt: None,
            content: "Body".into(),
            category: "News".into(),
            author: "Team".into(),
            featured_image: None,
            status,
        }
    }

    // ── Contacts ────────────────────────────────────────────────────

    #[tokio::test]
    async fn contact_created_with_status_new() {
        let store = test_store().await;
        let contact = store.create_contact(&chat_lead()).await.unwrap();

        assert_eq!(contact.name, "Asha");
        assert_eq!(contact.email, "-");
        assert_eq!(contact.services, vec!["support".to_string()]);
        assert_eq!(contact.status, ContactStatus::New);
        assert!(contact.message.unwrap().contains("site is down"));
    }

    #[tokio::test]
    async fn contacts_listed_newest_first() {
        let store = test_store().await;
        let first = store.create_contact(&chat_lead()).await.unwrap();
        let second = store.create_contact(&chat_lead()).await.unwrap();

        let listed = store.list_contacts().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn contact_status_update_and_delete() {
        let store = test_store().await;
        let contact = store.create_contact(&chat_lead()).await.unwrap();

        let updated = store
            .update_contact_status(contact.id, ContactStatus::Converted)
            .await
            .unwrap();
        assert_eq!(updated.status, ContactStatus::Converted);

        store.delete_contact(contact.id).await.unwrap();
        assert!(store.list_contacts().await.unwrap().is_empty());
        assert!(matches!(
            store.delete_contact(contact.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_missing_contact_is_not_found() {
        let store = test_store().await;
        let result = store.update_contact_status(42, ContactStatus::Closed).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn store_is_a_lead_sink() {
        let store = test_store().await;
        store.submit_lead(&chat_lead()).await.unwrap();
        assert_eq!(store.list_contacts().await.unwrap().len(), 1);
    }

    // ── Blog posts ──────────────────────────────────────────────────

    #[tokio::test]
    async fn view_post_increments_views() {
        let store = test_store().await;
        let post = store
            .create_post(&new_post("pune-launch", PostStatus::Published))
            .await
            .unwrap();
        assert_eq!(post.views, 0);

        assert_eq!(store.view_post("pune-launch").await.unwrap().views, 1);
        assert_eq!(store.view_post("pune-launch").await.unwrap().views, 2);
        assert!(matches!(
            store.view_post("missing").await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn list_posts_filters_by_status() {
        let store = test_store().await;
        store
            .create_post(&new_post("a", PostStatus::Published))
            .await
            .unwrap();
        store
            .create_post(&new_post("b", PostStatus::Draft))
            .await
            .unwrap();

        assert_eq!(store.list_posts(None).await.unwrap().len(), 2);
        let published = store.list_posts(Some(PostStatus::Published)).await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].slug, "a");
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_constraint_error() {
        let store = test_store().await;
        store
            .create_post(&new_post("same", PostStatus::Draft))
            .await
            .unwrap();
        let result = store.create_post(&new_post("same", PostStatus::Draft)).await;
        assert!(matches!(result, Err(DatabaseError::Constraint(_))));
    }

    #[tokio::test]
    async fn partial_post_update_keeps_other_fields() {
        let store = test_store().await;
        let post = store
            .create_post(&new_post("draft-one", PostStatus::Draft))
            .await
            .unwrap();

        let update = BlogPostUpdate {
            status: Some(PostStatus::Published),
            excerpt: Some("Short".into()),
            ..Default::default()
        };
        let updated = store.update_post(post.id, &update).await.unwrap();
        assert_eq!(updated.status, PostStatus::Published);
        assert_eq!(updated.excerpt.as_deref(), Some("Short"));
        assert_eq!(updated.title, post.title);
        assert_eq!(updated.slug, "draft-one");
    }

    // ── Admin users ─────────────────────────────────────────────────

    #[tokio::test]
    async fn user_password_is_stored_as_digest() {
        let store = test_store().await;
        let user = store
            .create_user(&NewAdminUser {
                username: "ravi".into(),
                email: "ravi@example.com".into(),
                role: Role::Editor,
                full_name: Some("Ravi K".into()),
                is_active: true,
                password: SecretString::from("hunter2"),
            })
            .await
            .unwrap();
        assert_eq!(user.role, Role::Editor);

        let mut rows = store
            .conn
            .query("SELECT password_hash FROM admin_users WHERE id = ?1", params![user.id])
            .await
            .unwrap();
        let hash: String = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, "hunter2");
        assert_eq!(hash, password_digest("hunter2"));

        let updated = store
            .update_user(
                user.id,
                &AdminUserUpdate {
                    is_active: Some(false),
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.username, "ravi");

        store.delete_user(user.id).await.unwrap();
        assert!(store.list_users().await.unwrap().is_empty());
    }

    // ── Announcements ───────────────────────────────────────────────

    #[tokio::test]
    async fn announcement_visibility() {
        let store = test_store().await;
        let banner = store
            .create_announcement(&NewAnnouncement {
                title: "Festive offer".into(),
                content: "20% off".into(),
                kind: AnnouncementKind::Success,
                is_active: true,
                show_on_homepage: true,
                created_by: 1,
            })
            .await
            .unwrap();
        let internal = store
            .create_announcement(&NewAnnouncement {
                title: "Maintenance".into(),
                content: "Sunday".into(),
                kind: AnnouncementKind::Warning,
                is_active: true,
                show_on_homepage: false,
                created_by: 1,
            })
            .await
            .unwrap();

        assert_eq!(store.list_announcements(false).await.unwrap().len(), 2);
        let homepage = store.list_announcements(true).await.unwrap();
        assert_eq!(homepage.len(), 1);
        assert_eq!(homepage[0].id, banner.id);

        store
            .update_announcement(
                internal.id,
                &AnnouncementUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.list_announcements(false).await.unwrap().len(), 1);
        assert_eq!(store.list_all_announcements().await.unwrap().len(), 2);
    }

    // ── Consultations ───────────────────────────────────────────────

    #[tokio::test]
    async fn consultation_json_round_trips_through_columns() {
        let store = test_store().await;
        let stored = store
            .create_consultation(&NewConsultation {
                business_name: "Chai Point".into(),
                industry: "Food".into(),
                business_type: "Restaurant".into(),
                recommendations: Some(serde_json::json!([{"title": "Web"}])),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(stored.status, ConsultationStatus::New);
        assert_eq!(
            stored.recommendations.unwrap()[0]["title"],
            serde_json::json!("Web")
        );
        assert!(stored.demo_website.is_none());

        let updated = store
            .update_consultation_status(stored.id, ConsultationStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(updated.status, ConsultationStatus::InProgress);
    }

    // ── Careers ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn career_application_lifecycle() {
        let store = test_store().await;
        let app = store
            .create_application(&NewCareerApplication {
                name: "Neha".into(),
                email: "neha@example.com".into(),
                phone: "9000000000".into(),
                kind: CareerKind::Team,
                team: "Engineering".into(),
                why: "Build things".into(),
                q1: Some("Rust".into()),
                q2: None,
                resume: None,
            })
            .await
            .unwrap();
        assert_eq!(app.status, "new");
        assert_eq!(app.kind, CareerKind::Team);

        assert_eq!(store.list_applications().await.unwrap().len(), 1);
        store.delete_application(app.id).await.unwrap();
        assert!(store.list_applications().await.unwrap().is_empty());
    }

    // ── Change feed ─────────────────────────────────────────────────

    #[tokio::test]
    async fn mutations_notify_entity_observers() {
        let store = test_store().await;
        let count = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&count);
        let observer: Arc<dyn ChangeObserver> = Arc::new(move |entity: Entity| {
            assert_eq!(entity, Entity::Contacts);
            observed.fetch_add(1, Ordering::SeqCst);
        });
        let sub = store.changes().subscribe(Entity::Contacts, observer);

        let contact = store.create_contact(&chat_lead()).await.unwrap();
        store
            .update_contact_status(contact.id, ContactStatus::Contacted)
            .await
            .unwrap();
        store
            .create_post(&new_post("unrelated", PostStatus::Draft))
            .await
            .unwrap();
        store.delete_contact(contact.id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(count.load(Ordering::SeqCst) >= 3);
        sub.unsubscribe();
    }

    #[tokio::test]
    async fn failed_mutation_publishes_nothing() {
        let store = test_store().await;
        let mut rx = store.changes().receiver();
        let _ = store.delete_post(99).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("servicex.db");

        {
            let store = LibSqlStore::new_local(&path).await.unwrap();
            store.create_contact(&chat_lead()).await.unwrap();
        }

        let reopened = LibSqlStore::new_local(&path).await.unwrap();
        assert_eq!(reopened.list_contacts().await.unwrap().len(), 1);
    }
}

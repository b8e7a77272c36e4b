//! `ContentStore` trait: async CRUD for every admin-managed entity plus
//! the change feed that announces mutations.

use async_trait::async_trait;

use super::changes::ChangeFeed;
use super::model::{
    AdminUser, AdminUserUpdate, Announcement, AnnouncementUpdate, BlogPost, BlogPostUpdate,
    CareerApplication, Consultation, ConsultationStatus, Contact, ContactStatus, NewAdminUser,
    NewAnnouncement, NewBlogPost, NewCareerApplication, NewConsultation, PostStatus,
};
use crate::error::DatabaseError;
use crate::lead::LeadRecord;

/// Backend-agnostic content store. Every successful mutation publishes a
/// signal for its entity on [`ContentStore::changes`].
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    /// Feed of change signals for this store.
    fn changes(&self) -> &ChangeFeed;

    // ── Contacts ────────────────────────────────────────────────────

    /// Insert a lead with status `new`.
    async fn create_contact(&self, lead: &LeadRecord) -> Result<Contact, DatabaseError>;

    /// All contacts, newest first.
    async fn list_contacts(&self) -> Result<Vec<Contact>, DatabaseError>;

    async fn update_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> Result<Contact, DatabaseError>;

    async fn delete_contact(&self, id: i64) -> Result<(), DatabaseError>;

    // ── Blog posts ──────────────────────────────────────────────────

    async fn create_post(&self, post: &NewBlogPost) -> Result<BlogPost, DatabaseError>;

    /// Posts newest first, optionally filtered by status.
    async fn list_posts(&self, status: Option<PostStatus>) -> Result<Vec<BlogPost>, DatabaseError>;

    /// Fetch a post by slug and count the view. The returned post carries
    /// the incremented view count.
    async fn view_post(&self, slug: &str) -> Result<BlogPost, DatabaseError>;

    async fn update_post(&self, id: i64, update: &BlogPostUpdate) -> Result<BlogPost, DatabaseError>;

    async fn delete_post(&self, id: i64) -> Result<(), DatabaseError>;

    // ── Admin users ─────────────────────────────────────────────────

    async fn create_user(&self, user: &NewAdminUser) -> Result<AdminUser, DatabaseError>;

    async fn list_users(&self) -> Result<Vec<AdminUser>, DatabaseError>;

    async fn update_user(&self, id: i64, update: &AdminUserUpdate) -> Result<AdminUser, DatabaseError>;

    async fn delete_user(&self, id: i64) -> Result<(), DatabaseError>;

    // ── Announcements ───────────────────────────────────────────────

    async fn create_announcement(
        &self,
        announcement: &NewAnnouncement,
    ) -> Result<Announcement, DatabaseError>;

    /// Active announcements, newest first. With `homepage_only`, only the
    /// ones flagged for the homepage banner.
    async fn list_announcements(&self, homepage_only: bool) -> Result<Vec<Announcement>, DatabaseError>;

    /// Every announcement regardless of state, for the admin console.
    async fn list_all_announcements(&self) -> Result<Vec<Announcement>, DatabaseError>;

    async fn update_announcement(
        &self,
        id: i64,
        update: &AnnouncementUpdate,
    ) -> Result<Announcement, DatabaseError>;

    async fn delete_announcement(&self, id: i64) -> Result<(), DatabaseError>;

    // ── AI consultations ────────────────────────────────────────────

    async fn create_consultation(
        &self,
        consultation: &NewConsultation,
    ) -> Result<Consultation, DatabaseError>;

    async fn list_consultations(&self) -> Result<Vec<Consultation>, DatabaseError>;

    async fn update_consultation_status(
        &self,
        id: i64,
        status: ConsultationStatus,
    ) -> Result<Consultation, DatabaseError>;

    // ── Careers ─────────────────────────────────────────────────────

    async fn create_application(
        &self,
        application: &NewCareerApplication,
    ) -> Result<CareerApplication, DatabaseError>;

    async fn list_applications(&self) -> Result<Vec<CareerApplication>, DatabaseError>;

    async fn delete_application(&self, id: i64) -> Result<(), DatabaseError>;
}

//! Admin-managed entities: contacts, blog posts, users, announcements,
//! AI consultations and career applications.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// The tables the content store manages. Change notifications are keyed
/// by entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Contacts,
    BlogPosts,
    AdminUsers,
    Announcements,
    Consultations,
    Careers,
}

impl Entity {
    pub const ALL: [Entity; 6] = [
        Entity::Contacts,
        Entity::BlogPosts,
        Entity::AdminUsers,
        Entity::Announcements,
        Entity::Consultations,
        Entity::Careers,
    ];

    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::BlogPosts => "blog_posts",
            Self::AdminUsers => "admin_users",
            Self::Announcements => "announcements",
            Self::Consultations => "ai_consultations",
            Self::Careers => "careers",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Generates `as_str`, `FromStr` and `Display` for a snake_case status enum.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} value: {other}", stringify!($name))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ── Contacts ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    New,
    Contacted,
    Converted,
    Closed,
}

string_enum!(ContactStatus {
    New => "new",
    Contacted => "contacted",
    Converted => "converted",
    Closed => "closed",
});

/// A lead row, created by the chat widget or the contact form.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub website: Option<String>,
    pub services: Vec<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub message: Option<String>,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Blog posts ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Published,
}

string_enum!(PostStatus {
    Draft => "draft",
    Published => "published",
});

#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub author: String,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub author: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    pub status: PostStatus,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub featured_image: Option<String>,
    pub status: Option<PostStatus>,
}

// ── Admin users ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Editor,
}

string_enum!(Role {
    Admin => "admin",
    Editor => "editor",
});

/// Admin console account. The password digest is never read back.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAdminUser {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub password: SecretString,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

// ── Announcements ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementKind {
    Info,
    Warning,
    Success,
    Error,
}

string_enum!(AnnouncementKind {
    Info => "info",
    Warning => "warning",
    Success => "success",
    Error => "error",
});

#[derive(Debug, Clone, Serialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub is_active: bool,
    pub show_on_homepage: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub show_on_homepage: bool,
    pub created_by: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AnnouncementKind>,
    pub is_active: Option<bool>,
    pub show_on_homepage: Option<bool>,
}

fn default_true() -> bool {
    true
}

// ── AI consultations ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    New,
    InProgress,
    Completed,
    Contacted,
}

string_enum!(ConsultationStatus {
    New => "new",
    InProgress => "in_progress",
    Completed => "completed",
    Contacted => "contacted",
});

#[derive(Debug, Clone, Serialize)]
pub struct Consultation {
    pub id: i64,
    pub business_name: String,
    pub industry: String,
    pub business_type: String,
    pub target_audience: Option<String>,
    pub goals: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub current_website: Option<String>,
    pub competitors: Option<String>,
    pub special_requirements: Option<String>,
    pub preferred_colors: Option<String>,
    pub design_style: Option<String>,
    pub recommendations: Option<serde_json::Value>,
    pub demo_website: Option<serde_json::Value>,
    pub status: ConsultationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewConsultation {
    pub business_name: String,
    pub industry: String,
    pub business_type: String,
    pub target_audience: Option<String>,
    pub goals: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub current_website: Option<String>,
    pub competitors: Option<String>,
    pub special_requirements: Option<String>,
    pub preferred_colors: Option<String>,
    pub design_style: Option<String>,
    pub recommendations: Option<serde_json::Value>,
    pub demo_website: Option<serde_json::Value>,
}

// ── Careers ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerKind {
    Team,
    Internship,
}

string_enum!(CareerKind {
    Team => "team",
    Internship => "internship",
});

/// Application from the "join the team" or internship page.
#[derive(Debug, Clone, Serialize)]
pub struct CareerApplication {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub kind: CareerKind,
    pub team: String,
    pub why: String,
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub status: String,
    /// Resume as a data URL, if one was attached.
    pub resume: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCareerApplication {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub kind: CareerKind,
    pub team: String,
    pub why: String,
    #[serde(default)]
    pub q1: Option<String>,
    #[serde(default)]
    pub q2: Option<String>,
    #[serde(default)]
    pub resume: Option<String>,
}

impl NewCareerApplication {
    /// Check the fields the application pages mark as required.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("team", &self.team),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        Ok(())
    }
}

//! Lead records and the sink trait that persists them.
//!
//! A lead is a prospective-customer inquiry. The chat controller and the
//! contact form both produce a [`LeadRecord`]; where it ends up (the local
//! content store or the hosted backend) is decided by the [`LeadSink`]
//! handed to them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LeadError;

/// Placeholder stored in `email` when the flow never asked for one.
pub const EMAIL_PLACEHOLDER: &str = "-";

/// The finalized inquiry handed to a [`LeadSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub services: Vec<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
}

impl LeadRecord {
    /// A lead with only the fields the chat widget collects.
    pub fn from_chat(name: &str, phone: &str, service: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            phone: phone.to_string(),
            email: EMAIL_PLACEHOLDER.to_string(),
            services: vec![service.to_string()],
            message,
            company: None,
            website: None,
            budget: None,
            timeline: None,
        }
    }
}

/// Accepts finalized lead records. Append-only from the caller's side.
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn submit_lead(&self, lead: &LeadRecord) -> Result<(), LeadError>;
}

/// The "get a free consultation" form submitted from the site popup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub payment_option: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub agree_to_terms: bool,
}

impl ContactForm {
    /// Validate the form and turn it into a lead.
    pub fn into_lead(self) -> Result<LeadRecord, LeadError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                return Err(LeadError::Invalid(format!("{field} is required")));
            }
        }
        if self.services.is_empty() {
            return Err(LeadError::Invalid(
                "select at least one service".to_string(),
            ));
        }
        if !self.agree_to_terms {
            return Err(LeadError::Invalid(
                "terms must be accepted".to_string(),
            ));
        }

        let message = format!(
            "{}\n\nPayment Preference: {}",
            self.message.unwrap_or_default(),
            self.payment_option.unwrap_or_default()
        );

        Ok(LeadRecord {
            name: self.name,
            phone: self.phone,
            email: self.email,
            services: self.services,
            message,
            company: non_empty(self.company),
            website: non_empty(self.website),
            budget: non_empty(self.budget),
            timeline: non_empty(self.timeline),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> ContactForm {
        ContactForm {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            phone: "9876543210".to_string(),
            company: Some(String::new()),
            website: Some("https://ravi.example".to_string()),
            services: vec!["Web Development".to_string()],
            budget: Some("Under ₹25,000".to_string()),
            timeline: None,
            payment_option: Some("Full Payment".to_string()),
            message: Some("Need a shop".to_string()),
            agree_to_terms: true,
        }
    }

    #[test]
    fn chat_lead_uses_email_placeholder() {
        let lead = LeadRecord::from_chat("Asha", "9123456789", "support", "x".into());
        assert_eq!(lead.email, EMAIL_PLACEHOLDER);
        assert_eq!(lead.services, vec!["support".to_string()]);
        assert!(lead.company.is_none());
    }

    #[test]
    fn contact_form_builds_lead() {
        let lead = filled_form().into_lead().unwrap();
        assert_eq!(lead.email, "ravi@example.com");
        assert_eq!(lead.message, "Need a shop\n\nPayment Preference: Full Payment");
        // Blank optional fields are dropped
        assert!(lead.company.is_none());
        assert_eq!(lead.website.as_deref(), Some("https://ravi.example"));
        assert_eq!(lead.budget.as_deref(), Some("Under ₹25,000"));
    }

    #[test]
    fn contact_form_requires_services_and_terms() {
        let mut form = filled_form();
        form.services.clear();
        assert!(matches!(form.into_lead(), Err(LeadError::Invalid(_))));

        let mut form = filled_form();
        form.agree_to_terms = false;
        assert!(matches!(form.into_lead(), Err(LeadError::Invalid(_))));

        let mut form = filled_form();
        form.email = "  ".to_string();
        let err = form.into_lead().unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn optional_fields_skipped_in_json() {
        let lead = LeadRecord::from_chat("Asha", "9123456789", "web", "m".into());
        let json = serde_json::to_value(&lead).unwrap();
        assert!(json.get("company").is_none());
        assert_eq!(json["email"], "-");
    }
}

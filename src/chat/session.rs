//! Per-widget conversation data and the lead it turns into.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::state::{Flow, Language};
use crate::lead::LeadRecord;

/// Indian mobile: 10 digits, first digit 6-9.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("phone pattern is valid"));

/// Whether `phone` is acceptable in the phone step. The input is checked
/// as typed, without trimming.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Data collected during one chat session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatSession {
    pub language: Language,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_service: Option<String>,
    pub details: String,
    pub submitted: bool,
}

impl ChatSession {
    /// A fresh session that keeps the previous session's language.
    pub fn restart(&self) -> Self {
        Self {
            language: self.language,
            ..Self::default()
        }
    }

    /// Assemble the lead for this session. Returns `None` until a flow and
    /// its details have been collected.
    pub fn lead(&self) -> Option<LeadRecord> {
        let flow = self.flow?;
        if self.details.trim().is_empty() {
            return None;
        }
        let lead = match flow {
            Flow::ServiceInquiry => {
                let service = self.selected_service.as_deref()?;
                LeadRecord::from_chat(
                    &self.name,
                    &self.phone,
                    service,
                    format!("Service: {service}\nDetails: {}", self.details),
                )
            }
            Flow::Support | Flow::Order => LeadRecord::from_chat(
                &self.name,
                &self.phone,
                flow.tag(),
                format!("Flow: {}\nDetails: {}", flow.tag(), self.details),
            ),
        };
        Some(lead)
    }
}

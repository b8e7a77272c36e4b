//! Lead sink that posts to a hosted PostgREST-style backend.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::error::LeadError;
use crate::lead::{LeadRecord, LeadSink};

/// Writes leads into the backend's `contacts` table over its REST API.
pub struct RestLeadSink {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl RestLeadSink {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn contacts_url(&self) -> String {
        format!("{}/rest/v1/contacts", self.base_url)
    }
}

#[async_trait]
impl LeadSink for RestLeadSink {
    async fn submit_lead(&self, lead: &LeadRecord) -> Result<(), LeadError> {
        let key = self.api_key.expose_secret();
        let resp = self
            .client
            .post(self.contacts_url())
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=minimal")
            .json(&[lead])
            .send()
            .await
            .map_err(|e| LeadError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Backend rejected lead");
            return Err(LeadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(lead_services = ?lead.services, "Lead posted to backend");
        Ok(())
    }
}

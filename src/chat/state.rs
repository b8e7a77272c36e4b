//! Chat step machine: which question the widget is currently asking.

use serde::{Deserialize, Serialize};

/// The steps of the lead-capture conversation.
///
/// Progresses SelectLanguage → CollectName → CollectPhone → ChooseFlow →
/// (CollectServiceDetails | CollectFlowDetails) → Submitting → Done.
/// `Done` only leads back to `SelectLanguage` through a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStep {
    SelectLanguage,
    CollectName,
    CollectPhone,
    ChooseFlow,
    CollectServiceDetails,
    CollectFlowDetails,
    Submitting,
    Done,
}

impl ChatStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ChatStep) -> bool {
        use ChatStep::*;
        matches!(
            (self, target),
            (SelectLanguage, CollectName)
                | (CollectName, CollectPhone)
                | (CollectPhone, ChooseFlow)
                | (ChooseFlow, CollectServiceDetails)
                | (ChooseFlow, CollectFlowDetails)
                | (CollectServiceDetails, Submitting)
                | (CollectFlowDetails, Submitting)
                | (Submitting, Done)
        )
    }

    /// Whether this step waits for free text from the user.
    pub fn accepts_text(&self) -> bool {
        matches!(
            self,
            Self::CollectName
                | Self::CollectPhone
                | Self::CollectServiceDetails
                | Self::CollectFlowDetails
        )
    }

    /// Whether the session is finished (only a reset leaves this step).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl Default for ChatStep {
    fn default() -> Self {
        Self::SelectLanguage
    }
}

impl std::fmt::Display for ChatStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SelectLanguage => "select_language",
            Self::CollectName => "collect_name",
            Self::CollectPhone => "collect_phone",
            Self::ChooseFlow => "choose_flow",
            Self::CollectServiceDetails => "collect_service_details",
            Self::CollectFlowDetails => "collect_flow_details",
            Self::Submitting => "submitting",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// Language picked at the start of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    En,
    Hi,
    Other,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Hi, Language::Other];

    /// Label shown on the picker button.
    pub fn label(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hinglish",
            Self::Other => "Other",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::En
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Branch of the conversation, chosen once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    ServiceInquiry,
    Support,
    Order,
}

impl Flow {
    /// Tag stored in the lead's `services` list for support/order flows.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ServiceInquiry => "service",
            Self::Support => "support",
            Self::Order => "order",
        }
    }
}

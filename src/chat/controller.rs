//! ChatController: drives one chat widget session from language pick to
//! a submitted lead.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::catalog::{self, ORDER_LABEL, SERVICES, SUPPORT_LABEL};
use super::prompts::{decorate, templates};
use super::session::{ChatSession, is_valid_phone};
use super::state::{ChatStep, Flow, Language};
use crate::error::ChatError;
use crate::lead::LeadSink;

/// One discrete user action in the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatInput {
    Language { code: Language },
    Text { text: String },
    Service { key: String },
    Support,
    Order,
    StartOver,
}

impl ChatInput {
    fn kind(&self) -> &'static str {
        match self {
            Self::Language { .. } => "language",
            Self::Text { .. } => "text",
            Self::Service { .. } => "service",
            Self::Support => "support",
            Self::Order => "order",
            Self::StartOver => "start_over",
        }
    }
}

/// Something the widget may offer the user in the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Affordance {
    Language {
        code: Language,
        label: &'static str,
        selected: bool,
    },
    Text {
        placeholder: String,
    },
    Service {
        key: &'static str,
        label: &'static str,
        price: &'static str,
    },
    Support {
        label: &'static str,
    },
    Order {
        label: &'static str,
    },
    Retry,
    StartOver {
        label: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Bot,
    User,
}

/// A line in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub from: Speaker,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Toast-style notification produced by a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Outcome of one input event.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub step: ChatStep,
    pub prompt: String,
    pub affordances: Vec<Affordance>,
    /// Messages appended to the transcript by this input, bot lines decorated.
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

/// Conversation controller for a single widget.
///
/// Owns its session exclusively. Callers feed one input at a time; the
/// only await point is the lead sink call made on entering `Submitting`.
pub struct ChatController {
    id: Uuid,
    step: ChatStep,
    session: ChatSession,
    transcript: Vec<ChatMessage>,
    sink: Arc<dyn LeadSink>,
    /// Set when the last sink call failed; enables retry.
    submit_failed: bool,
}

impl ChatController {
    pub fn new(sink: Arc<dyn LeadSink>) -> Self {
        Self::with_session(sink, ChatSession::default())
    }

    fn with_session(sink: Arc<dyn LeadSink>, session: ChatSession) -> Self {
        let mut controller = Self {
            id: Uuid::new_v4(),
            step: ChatStep::SelectLanguage,
            session,
            transcript: Vec::new(),
            sink,
            submit_failed: false,
        };
        controller.greet();
        controller
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> ChatStep {
        self.step
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn language(&self) -> Language {
        self.session.language
    }

    /// Localized prompt for the current step.
    pub fn current_prompt(&self) -> String {
        let t = templates(self.session.language);
        let text = match self.step {
            ChatStep::SelectLanguage => t.select_language.to_string(),
            ChatStep::CollectName => t.ask_name.to_string(),
            ChatStep::CollectPhone => t.ask_phone.to_string(),
            ChatStep::ChooseFlow => t.show_services.to_string(),
            ChatStep::CollectServiceDetails => t.ask_details(self.selected_service_label()),
            ChatStep::CollectFlowDetails => match self.session.flow {
                Some(Flow::Order) => t.ask_order.to_string(),
                _ => t.ask_support.to_string(),
            },
            ChatStep::Submitting if self.submit_failed => t.submit_failed.to_string(),
            ChatStep::Submitting => String::new(),
            ChatStep::Done => t.thank_you.to_string(),
        };
        if text.is_empty() {
            return text;
        }
        decorate(self.session.language, &text)
    }

    /// Inputs the widget should offer in the current step.
    pub fn current_affordances(&self) -> Vec<Affordance> {
        let t = templates(self.session.language);
        match self.step {
            ChatStep::SelectLanguage => Language::ALL
                .iter()
                .map(|&code| Affordance::Language {
                    code,
                    label: code.label(),
                    selected: code == self.session.language,
                })
                .collect(),
            ChatStep::CollectName
            | ChatStep::CollectPhone
            | ChatStep::CollectServiceDetails
            | ChatStep::CollectFlowDetails => vec![Affordance::Text {
                placeholder: self.current_prompt(),
            }],
            ChatStep::ChooseFlow => {
                let mut options: Vec<Affordance> = SERVICES
                    .iter()
                    .map(|s| Affordance::Service {
                        key: s.key,
                        label: s.label,
                        price: s.price,
                    })
                    .collect();
                options.push(Affordance::Support {
                    label: SUPPORT_LABEL,
                });
                options.push(Affordance::Order { label: ORDER_LABEL });
                options
            }
            ChatStep::Submitting if self.submit_failed => vec![
                Affordance::Retry,
                Affordance::StartOver {
                    label: t.start_over,
                },
            ],
            ChatStep::Submitting => Vec::new(),
            ChatStep::Done => vec![Affordance::StartOver {
                label: t.start_over,
            }],
        }
    }

    /// Full transcript, bot lines decorated for the session language.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.render(0)
    }

    /// Apply one user input.
    ///
    /// Empty text in a text step is ignored without error. Input of the
    /// wrong kind for the step is rejected and changes nothing.
    pub async fn submit(&mut self, input: ChatInput) -> Result<Reply, ChatError> {
        let start = self.transcript.len();
        debug!(session_id = %self.id, step = %self.step, input = input.kind(), "Chat input");

        match (self.step, input) {
            (ChatStep::SelectLanguage, ChatInput::Language { code }) => {
                self.session.language = code;
                self.push_user(code.label());
                self.advance(ChatStep::CollectName)?;
                self.push_bot(templates(code).ask_name);
                Ok(self.reply(start, None, None))
            }

            (step, ChatInput::Text { text }) if step.accepts_text() => {
                if text.trim().is_empty() {
                    return Ok(self.reply(start, None, None));
                }
                self.accept_text(step, text, start).await
            }

            (ChatStep::ChooseFlow, ChatInput::Service { key }) => {
                let service =
                    catalog::find(&key).ok_or_else(|| ChatError::UnknownService(key.clone()))?;
                self.session.flow = Some(Flow::ServiceInquiry);
                self.session.selected_service = Some(service.key.to_string());
                self.push_user(service.label);
                self.advance(ChatStep::CollectServiceDetails)?;
                let prompt = templates(self.session.language).ask_details(service.label);
                self.push_bot(&prompt);
                Ok(self.reply(start, None, None))
            }

            (ChatStep::ChooseFlow, ChatInput::Support) => {
                self.choose_flow(Flow::Support, SUPPORT_LABEL)?;
                Ok(self.reply(start, None, None))
            }

            (ChatStep::ChooseFlow, ChatInput::Order) => {
                self.choose_flow(Flow::Order, ORDER_LABEL)?;
                Ok(self.reply(start, None, None))
            }

            (step, ChatInput::StartOver) if step.is_terminal() => {
                self.reset();
                Ok(self.reply(0, None, None))
            }

            (ChatStep::Submitting, ChatInput::StartOver) if self.submit_failed => {
                self.reset();
                Ok(self.reply(0, None, None))
            }

            (step, input) => Err(ChatError::InputNotAccepted {
                step: step.to_string(),
                input: input.kind().to_string(),
            }),
        }
    }

    /// Re-issue the lead after a failed sink call.
    pub async fn retry_submission(&mut self) -> Result<Reply, ChatError> {
        if self.step != ChatStep::Submitting || !self.submit_failed {
            return Err(ChatError::NothingToRetry {
                step: self.step.to_string(),
            });
        }
        let start = self.transcript.len();
        info!(session_id = %self.id, "Retrying lead submission");
        let notice = self.submit_lead().await?;
        Ok(self.reply(start, None, Some(notice)))
    }

    /// Start a brand-new session, keeping the selected language.
    pub fn reset(&mut self) {
        debug!(session_id = %self.id, language = %self.session.language, "Chat reset");
        self.session = self.session.restart();
        self.step = ChatStep::SelectLanguage;
        self.submit_failed = false;
        self.transcript.clear();
        self.greet();
    }

    // ── internals ───────────────────────────────────────────────────

    async fn accept_text(
        &mut self,
        step: ChatStep,
        text: String,
        start: usize,
    ) -> Result<Reply, ChatError> {
        let t = templates(self.session.language);
        match step {
            ChatStep::CollectName => {
                self.push_user(&text);
                self.session.name = text;
                self.advance(ChatStep::CollectPhone)?;
                self.push_bot(t.ask_phone);
                Ok(self.reply(start, None, None))
            }
            ChatStep::CollectPhone => {
                if !is_valid_phone(&text) {
                    debug!(session_id = %self.id, "Rejected phone number");
                    return Ok(self.reply(start, Some(t.phone_invalid.to_string()), None));
                }
                self.push_user(&text);
                self.session.phone = text;
                self.advance(ChatStep::ChooseFlow)?;
                self.push_bot(t.show_services);
                self.push_bot(&catalog::price_list());
                Ok(self.reply(start, None, None))
            }
            ChatStep::CollectServiceDetails | ChatStep::CollectFlowDetails => {
                self.push_user(&text);
                self.session.details = text;
                self.advance(ChatStep::Submitting)?;
                let notice = self.submit_lead().await?;
                Ok(self.reply(start, None, Some(notice)))
            }
            other => Err(ChatError::InputNotAccepted {
                step: other.to_string(),
                input: "text".to_string(),
            }),
        }
    }

    fn choose_flow(&mut self, flow: Flow, label: &str) -> Result<(), ChatError> {
        self.session.flow = Some(flow);
        self.push_user(label);
        self.advance(ChatStep::CollectFlowDetails)?;
        let t = templates(self.session.language);
        let prompt = match flow {
            Flow::Order => t.ask_order,
            _ => t.ask_support,
        };
        self.push_bot(prompt);
        Ok(())
    }

    /// Hand the assembled lead to the sink. Stays in `Submitting` on failure.
    async fn submit_lead(&mut self) -> Result<Notice, ChatError> {
        let lead = self
            .session
            .lead()
            .ok_or_else(|| ChatError::InvalidTransition {
                from: self.step.to_string(),
                to: ChatStep::Done.to_string(),
            })?;

        self.session.submitted = true;
        let t = templates(self.session.language);

        match self.sink.submit_lead(&lead).await {
            Ok(()) => {
                info!(
                    session_id = %self.id,
                    lead_services = ?lead.services,
                    "Chat lead submitted"
                );
                self.submit_failed = false;
                self.advance(ChatStep::Done)?;
                self.push_bot(t.thank_you);
                Ok(Notice {
                    level: NoticeLevel::Success,
                    text: decorate(self.session.language, t.thank_you),
                })
            }
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Lead submission failed");
                self.submit_failed = true;
                Ok(Notice {
                    level: NoticeLevel::Error,
                    text: decorate(self.session.language, t.submit_failed),
                })
            }
        }
    }

    fn advance(&mut self, target: ChatStep) -> Result<(), ChatError> {
        if !self.step.can_transition_to(target) {
            return Err(ChatError::InvalidTransition {
                from: self.step.to_string(),
                to: target.to_string(),
            });
        }
        debug!(session_id = %self.id, from = %self.step, to = %target, "Chat step");
        self.step = target;
        Ok(())
    }

    fn greet(&mut self) {
        let t = templates(self.session.language);
        self.push_bot(t.welcome);
        self.push_bot(t.select_language);
    }

    fn selected_service_label(&self) -> &str {
        let key = self.session.selected_service.as_deref().unwrap_or_default();
        catalog::find(key).map(|s| s.label).unwrap_or(key)
    }

    fn push_bot(&mut self, text: &str) {
        self.transcript.push(ChatMessage {
            from: Speaker::Bot,
            text: text.to_string(),
        });
    }

    fn push_user(&mut self, text: &str) {
        self.transcript.push(ChatMessage {
            from: Speaker::User,
            text: text.to_string(),
        });
    }

    fn render(&self, start: usize) -> Vec<ChatMessage> {
        self.transcript[start.min(self.transcript.len())..]
            .iter()
            .map(|m| match m.from {
                Speaker::Bot => ChatMessage {
                    from: Speaker::Bot,
                    text: decorate(self.session.language, &m.text),
                },
                Speaker::User => m.clone(),
            })
            .collect()
    }

    fn reply(&self, start: usize, error: Option<String>, notice: Option<Notice>) -> Reply {
        Reply {
            step: self.step,
            prompt: self.current_prompt(),
            affordances: self.current_affordances(),
            messages: self.render(start),
            error,
            notice,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::chat::prompts::{EN, HI, OTHER_LANGUAGE_MARKER};
    use crate::error::LeadError;
    use crate::lead::LeadRecord;

    /// Sink that records every lead and can be told to fail.
    #[derive(Default)]
    struct RecordingSink {
        leads: Mutex<Vec<LeadRecord>>,
        fail: AtomicBool,
    }

    impl RecordingSink {
        fn count(&self) -> usize {
            self.leads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LeadSink for RecordingSink {
        async fn submit_lead(&self, lead: &LeadRecord) -> Result<(), LeadError> {
            self.leads.lock().unwrap().push(lead.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(LeadError::Transport("backend unreachable".into()));
            }
            Ok(())
        }
    }

    fn text(s: &str) -> ChatInput {
        ChatInput::Text { text: s.to_string() }
    }

    async fn to_choose_flow(chat: &mut ChatController, lang: Language) {
        chat.submit(ChatInput::Language { code: lang }).await.unwrap();
        chat.submit(text("Asha")).await.unwrap();
        chat.submit(text("9123456789")).await.unwrap();
        assert_eq!(chat.step(), ChatStep::ChooseFlow);
    }

    #[tokio::test]
    async fn support_path_submits_once() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink.clone());
        let mut visited = vec![chat.step()];

        for input in [
            ChatInput::Language { code: Language::En },
            text("Asha"),
            text("9123456789"),
            ChatInput::Support,
            text("site is down"),
        ] {
            let reply = chat.submit(input).await.unwrap();
            visited.push(reply.step);
        }

        assert_eq!(
            visited,
            vec![
                ChatStep::SelectLanguage,
                ChatStep::CollectName,
                ChatStep::CollectPhone,
                ChatStep::ChooseFlow,
                ChatStep::CollectFlowDetails,
                ChatStep::Done,
            ]
        );
        assert_eq!(chat.step(), ChatStep::Done);
        assert!(chat.session().submitted);

        let leads = sink.leads.lock().unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Asha");
        assert_eq!(leads[0].phone, "9123456789");
        assert_eq!(leads[0].services, vec!["support".to_string()]);
        assert!(leads[0].message.contains("site is down"));
    }

    #[tokio::test]
    async fn service_path_uses_service_key() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink.clone());
        to_choose_flow(&mut chat, Language::En).await;

        let reply = chat
            .submit(ChatInput::Service { key: "branding".into() })
            .await
            .unwrap();
        assert_eq!(reply.step, ChatStep::CollectServiceDetails);
        assert_eq!(reply.prompt, EN.ask_details("Branding"));

        let reply = chat.submit(text("new logo")).await.unwrap();
        assert_eq!(reply.step, ChatStep::Done);
        assert_eq!(reply.notice.unwrap().level, NoticeLevel::Success);

        let leads = sink.leads.lock().unwrap();
        assert_eq!(leads[0].services, vec!["branding".to_string()]);
        assert_eq!(leads[0].message, "Service: branding\nDetails: new logo");
    }

    #[tokio::test]
    async fn unknown_service_is_rejected() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink);
        to_choose_flow(&mut chat, Language::En).await;

        let err = chat
            .submit(ChatInput::Service { key: "seo".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::UnknownService(_)));
        assert_eq!(chat.step(), ChatStep::ChooseFlow);
        assert!(chat.session().flow.is_none());
    }

    #[tokio::test]
    async fn invalid_phone_keeps_step() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink);
        chat.submit(ChatInput::Language { code: Language::En }).await.unwrap();
        chat.submit(text("Asha")).await.unwrap();

        for bad in ["5876543210", "987654321", "98765432100"] {
            let reply = chat.submit(text(bad)).await.unwrap();
            assert_eq!(reply.step, ChatStep::CollectPhone);
            assert_eq!(reply.error.as_deref(), Some(EN.phone_invalid));
            assert!(reply.messages.is_empty());
            assert!(chat.session().phone.is_empty());
        }

        let reply = chat.submit(text("8876543210")).await.unwrap();
        assert_eq!(reply.step, ChatStep::ChooseFlow);
        assert!(reply.error.is_none());
        assert_eq!(chat.session().phone, "8876543210");
    }

    #[tokio::test]
    async fn hindi_phone_error_is_localized() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink);
        chat.submit(ChatInput::Language { code: Language::Hi }).await.unwrap();
        chat.submit(text("Asha")).await.unwrap();
        let reply = chat.submit(text("123")).await.unwrap();
        assert_eq!(reply.error.as_deref(), Some(HI.phone_invalid));
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink.clone());
        chat.submit(ChatInput::Language { code: Language::En }).await.unwrap();

        let before = chat.session().clone();
        let transcript_len = chat.transcript().len();
        for blank in ["", "   "] {
            let reply = chat.submit(text(blank)).await.unwrap();
            assert_eq!(reply.step, ChatStep::CollectName);
            assert!(reply.messages.is_empty());
            assert!(reply.error.is_none());
        }
        assert_eq!(chat.session(), &before);
        assert_eq!(chat.transcript().len(), transcript_len);

        chat.submit(text("Asha")).await.unwrap();
        // Blank phone is ignored, not rejected
        let reply = chat.submit(text("  ")).await.unwrap();
        assert_eq!(reply.step, ChatStep::CollectPhone);
        assert!(reply.error.is_none());
        assert!(chat.session().phone.is_empty());

        chat.submit(text("9123456789")).await.unwrap();
        chat.submit(ChatInput::Order).await.unwrap();
        let reply = chat.submit(text("")).await.unwrap();
        assert_eq!(reply.step, ChatStep::CollectFlowDetails);
        assert_eq!(sink.count(), 0);
    }

    #[tokio::test]
    async fn blank_service_details_do_not_submit() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink.clone());
        to_choose_flow(&mut chat, Language::En).await;
        chat.submit(ChatInput::Service { key: "web".into() }).await.unwrap();

        for blank in ["", " \t "] {
            let reply = chat.submit(text(blank)).await.unwrap();
            assert_eq!(reply.step, ChatStep::CollectServiceDetails);
            assert!(reply.messages.is_empty());
            assert!(reply.notice.is_none());
        }
        assert!(!chat.session().submitted);
        assert_eq!(sink.count(), 0);
    }

    #[tokio::test]
    async fn flow_cannot_change_once_chosen() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink);
        to_choose_flow(&mut chat, Language::En).await;
        chat.submit(ChatInput::Order).await.unwrap();

        for input in [
            ChatInput::Support,
            ChatInput::Service { key: "web".into() },
            ChatInput::Language { code: Language::Hi },
        ] {
            let err = chat.submit(input).await.unwrap_err();
            assert!(matches!(err, ChatError::InputNotAccepted { .. }));
        }
        assert_eq!(chat.session().flow, Some(Flow::Order));
        assert_eq!(chat.session().language, Language::En);
    }

    #[tokio::test]
    async fn failed_submission_stays_and_never_resubmits_on_input() {
        let sink = Arc::new(RecordingSink::default());
        sink.fail.store(true, Ordering::SeqCst);
        let mut chat = ChatController::new(sink.clone());
        to_choose_flow(&mut chat, Language::En).await;
        chat.submit(ChatInput::Support).await.unwrap();

        let reply = chat.submit(text("site is down")).await.unwrap();
        assert_eq!(reply.step, ChatStep::Submitting);
        let notice = reply.notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.text, EN.submit_failed);
        assert!(chat.session().submitted);
        assert_eq!(sink.count(), 1);

        // Same input again does not reach the sink
        let err = chat.submit(text("site is down")).await.unwrap_err();
        assert!(matches!(err, ChatError::InputNotAccepted { .. }));
        assert_eq!(sink.count(), 1);
        assert!(chat.current_affordances().contains(&Affordance::Retry));

        // Explicit retry goes through once the backend is back
        sink.fail.store(false, Ordering::SeqCst);
        let reply = chat.retry_submission().await.unwrap();
        assert_eq!(reply.step, ChatStep::Done);
        assert_eq!(sink.count(), 2);

        let err = chat.retry_submission().await.unwrap_err();
        assert!(matches!(err, ChatError::NothingToRetry { .. }));
        assert_eq!(sink.count(), 2);
    }

    #[tokio::test]
    async fn start_over_after_failure() {
        let sink = Arc::new(RecordingSink::default());
        sink.fail.store(true, Ordering::SeqCst);
        let mut chat = ChatController::new(sink);
        to_choose_flow(&mut chat, Language::Hi).await;
        chat.submit(ChatInput::Order).await.unwrap();
        chat.submit(text("order 17")).await.unwrap();

        let reply = chat.submit(ChatInput::StartOver).await.unwrap();
        assert_eq!(reply.step, ChatStep::SelectLanguage);
        assert_eq!(chat.language(), Language::Hi);
        assert!(!chat.session().submitted);
    }

    #[tokio::test]
    async fn start_over_once_done() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink.clone());
        to_choose_flow(&mut chat, Language::En).await;
        chat.submit(ChatInput::Support).await.unwrap();
        chat.submit(text("login broken")).await.unwrap();
        assert!(chat.step().is_terminal());

        let reply = chat.submit(ChatInput::StartOver).await.unwrap();
        assert_eq!(reply.step, ChatStep::SelectLanguage);
        assert!(!chat.session().submitted);
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test]
    async fn reset_preserves_language_only() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink);
        to_choose_flow(&mut chat, Language::Hi).await;
        chat.submit(ChatInput::Support).await.unwrap();
        chat.submit(text("login broken")).await.unwrap();
        assert_eq!(chat.step(), ChatStep::Done);
        assert_eq!(
            chat.current_affordances(),
            vec![Affordance::StartOver {
                label: HI.start_over
            }]
        );

        chat.reset();
        assert_eq!(chat.step(), ChatStep::SelectLanguage);
        let session = chat.session();
        assert_eq!(session.language, Language::Hi);
        assert!(session.name.is_empty());
        assert!(session.phone.is_empty());
        assert!(session.flow.is_none());
        assert!(session.details.is_empty());
        assert!(!session.submitted);
        assert_eq!(chat.transcript()[0].text, HI.welcome);
    }

    #[tokio::test]
    async fn done_rejects_data_input() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink.clone());
        to_choose_flow(&mut chat, Language::En).await;
        chat.submit(ChatInput::Support).await.unwrap();
        chat.submit(text("site is down")).await.unwrap();

        let err = chat.submit(text("another")).await.unwrap_err();
        assert!(matches!(err, ChatError::InputNotAccepted { .. }));
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test]
    async fn hindi_prompts_come_from_hindi_table() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink);
        let reply = chat
            .submit(ChatInput::Language { code: Language::Hi })
            .await
            .unwrap();
        assert_eq!(reply.prompt, HI.ask_name);
        assert_eq!(chat.current_prompt(), HI.ask_name);
        assert_ne!(chat.current_prompt(), EN.ask_name);
    }

    #[tokio::test]
    async fn other_language_uses_english_with_marker() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink);
        let reply = chat
            .submit(ChatInput::Language { code: Language::Other })
            .await
            .unwrap();
        assert_eq!(
            reply.prompt,
            format!("{OTHER_LANGUAGE_MARKER}{}", EN.ask_name)
        );
        // User echo is not decorated, bot lines are
        assert_eq!(reply.messages[0].from, Speaker::User);
        assert_eq!(reply.messages[0].text, "Other");
        assert!(reply.messages[1].text.starts_with(OTHER_LANGUAGE_MARKER));
        assert!(
            chat.transcript()
                .iter()
                .filter(|m| m.from == Speaker::Bot)
                .all(|m| m.text.starts_with(OTHER_LANGUAGE_MARKER))
        );
    }

    #[tokio::test]
    async fn affordances_follow_step() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink);
        let langs = chat.current_affordances();
        assert_eq!(langs.len(), 3);
        assert!(langs.contains(&Affordance::Language {
            code: Language::En,
            label: "English",
            selected: true,
        }));

        to_choose_flow(&mut chat, Language::En).await;
        let options = chat.current_affordances();
        assert_eq!(options.len(), SERVICES.len() + 2);
        assert!(options.contains(&Affordance::Support {
            label: SUPPORT_LABEL
        }));
        assert!(options.contains(&Affordance::Order { label: ORDER_LABEL }));
    }

    #[tokio::test]
    async fn price_list_follows_phone() {
        let sink = Arc::new(RecordingSink::default());
        let mut chat = ChatController::new(sink);
        chat.submit(ChatInput::Language { code: Language::En }).await.unwrap();
        chat.submit(text("Asha")).await.unwrap();
        let reply = chat.submit(text("9123456789")).await.unwrap();
        let texts: Vec<&str> = reply.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts[0], "9123456789");
        assert_eq!(texts[1], EN.show_services);
        assert_eq!(texts[2], catalog::price_list());
    }
}

//! Lead-capture chat widget.
//!
//! A short scripted conversation: pick a language, give a name and a
//! phone number, then either pick a service or ask for support / order
//! help, describe it, and the lead is handed to a [`LeadSink`].
//!
//! [`LeadSink`]: crate::lead::LeadSink

pub mod catalog;
pub mod controller;
pub mod prompts;
pub mod registry;
pub mod session;
pub mod state;

pub use controller::{Affordance, ChatController, ChatInput, ChatMessage, Notice, NoticeLevel, Reply, Speaker};
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{ChatSession, is_valid_phone};
pub use state::{ChatStep, Flow, Language};

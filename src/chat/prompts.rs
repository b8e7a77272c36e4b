//! Localized bot strings for the chat widget.
//!
//! Only `en` and `hi` have their own tables. `other` reads the `en` table
//! and every bot message is wrapped with [`OTHER_LANGUAGE_MARKER`].

use super::state::Language;

/// Prefix put on bot messages when the user picked "other".
pub const OTHER_LANGUAGE_MARKER: &str = "🌐 (Other language) ";

/// One language's set of bot strings.
pub struct Templates {
    pub welcome: &'static str,
    pub select_language: &'static str,
    pub ask_name: &'static str,
    pub ask_phone: &'static str,
    pub show_services: &'static str,
    pub ask_support: &'static str,
    pub ask_order: &'static str,
    pub thank_you: &'static str,
    pub phone_invalid: &'static str,
    pub submit_failed: &'static str,
    pub start_over: &'static str,
    ask_details: fn(&str) -> String,
}

impl Templates {
    /// "Tell us more about your needs for <service>".
    pub fn ask_details(&self, service_label: &str) -> String {
        (self.ask_details)(service_label)
    }
}

pub static EN: Templates = Templates {
    welcome: "Hi! I am Global Servicex Bot. How can I help you today?",
    select_language: "Please select your preferred language:",
    ask_name: "First, may I know your name?",
    ask_phone: "Thanks! Can you share your phone number?",
    show_services: "Here are our main services:",
    ask_support: "Please describe your issue. Our support team will help you.",
    ask_order: "Please provide your order details.",
    thank_you: "Thank you! Your request has been submitted. Our team will contact you soon.",
    phone_invalid: "Please enter a valid 10-digit Indian mobile number (starts with 6-9).",
    submit_failed: "Sorry, we could not submit your request. Please try again.",
    start_over: "Start Over",
    ask_details: |service| format!("Please tell us more about your needs for {service}."),
};

pub static HI: Templates = Templates {
    welcome: "Namaste! Main Global Servicex Bot hoon. Kaise madad kar sakta hoon?",
    select_language: "Apni pasandida bhasha chunein:",
    ask_name: "Aap apna naam dijiye.",
    ask_phone: "Dhanyavaad! Apna phone number batayein.",
    show_services: "Hamari mukhya sevayein yeh hain:",
    ask_support: "Kripya apni samasya batayein. Hamari support team madad karegi.",
    ask_order: "Order ki jankari dein.",
    thank_you: "Shukriya! Aapka request mil gaya. Hamari team jald sampark karegi.",
    phone_invalid: "Sahi 10-ank ka phone number dijiye (6-9 se shuru).",
    submit_failed: "Maaf kijiye, aapka request submit nahi ho paya. Kripya dobara koshish karein.",
    start_over: "Phir Se Shuru Karein",
    ask_details: |service| format!("{service} ke liye apni jarurat batayein."),
};

/// Template table for a language.
pub fn templates(language: Language) -> &'static Templates {
    match language {
        Language::Hi => &HI,
        Language::En | Language::Other => &EN,
    }
}

/// Apply the per-language decoration to a bot-authored message.
///
/// Only `other` gets a marker. `hi` already has its own table, so its
/// lines go out undecorated and match that table exactly.
pub fn decorate(language: Language, text: &str) -> String {
    match language {
        Language::Other => format!("{OTHER_LANGUAGE_MARKER}{text}"),
        Language::En | Language::Hi => text.to_string(),
    }
}

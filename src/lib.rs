//! servicex: lead-capture chat widget, content store and site API for a
//! small services agency.

pub mod api;
pub mod chat;
pub mod config;
pub mod consultant;
pub mod error;
pub mod lead;
pub mod rest_sink;
pub mod store;

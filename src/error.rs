//! Error types for servicex.

use uuid::Uuid;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Lead submission error: {0}")]
    Lead(#[from] LeadError),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("Consultant error: {0}")]
    Consultant(#[from] ConsultantError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised while handing a lead to a sink.
#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    #[error("Invalid lead: {0}")]
    Invalid(String),

    #[error("Backend rejected lead with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),
}

/// Conversation controller errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Input {input} is not accepted in step {step}")]
    InputNotAccepted { step: String, input: String },

    #[error("Cannot move from step {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Nothing to retry in step {step}")]
    NothingToRetry { step: String },

    #[error("Chat session {0} not found")]
    SessionNotFound(Uuid),
}

/// Consultant form errors.
#[derive(Debug, thiserror::Error)]
pub enum ConsultantError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

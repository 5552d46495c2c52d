//! Error handling for the admin client

use std::fmt;
use thiserror::Error;

/// Unified error type for the admin client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT decoding errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Token store I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The API answered 401; stored credentials have been cleared
    #[error("Unauthorized: session expired or invalid")]
    Unauthorized,

    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// First server message, or the raw body
        message: String,
    },

    /// Client-side validation failed; nothing was sent
    #[error("{message}")]
    Validation {
        /// Key of the first failing field
        field: String,
        /// Message of the first failing rule
        message: String,
    },

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid configuration (entity schemas or client options)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lookup of an entity, record or route failed
    #[error("Not found: {0}")]
    NotFound(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(msg: T) -> Self {
        Error::NotFound(msg.to_string())
    }

    /// Create a new validation error for a field
    pub fn validation<K: fmt::Display, T: fmt::Display>(field: K, msg: T) -> Self {
        Error::Validation {
            field: field.to_string(),
            message: msg.to_string(),
        }
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// Whether this error means the session is gone
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized)
    }

    /// The message shown to the user in notifications and form errors
    pub fn user_message(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            Error::Validation { message, .. } => message.clone(),
            Error::Auth(message) | Error::General(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

//! # Error Handling
//!
//! Crate-wide error types for the Trayline auth service, built with
//! `thiserror`. Service and repository layers return [`Error`]; the HTTP
//! boundary maps it onto status codes in `api::error`.

use std::fmt;

/// Custom result type for Trayline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Trayline auth service
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication and authorization errors
    #[error("Authentication error: {message}")]
    Auth {
        message: String,
        error_type: AuthErrorType,
    },

    /// Resource not found errors
    #[error("Resource not found: {resource} '{id}'")]
    NotFound { resource: String, id: String },

    /// Resource conflict errors (e.g. already exists)
    #[error("Resource conflict: {message}")]
    Conflict { message: String, resource: String },

    /// Network transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Authentication error subtypes
///
/// The token subtypes are deliberately distinct: a structurally broken token,
/// a token whose HMAC does not verify, and a token that verified but is past
/// its expiry are different failures internally even though the HTTP boundary
/// renders all of them as 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorType {
    MissingToken,
    MalformedToken,
    BadSignature,
    ExpiredToken,
    InvalidCredentials,
    InsufficientRole,
}

impl fmt::Display for AuthErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorType::MissingToken => write!(f, "missing_token"),
            AuthErrorType::MalformedToken => write!(f, "malformed_token"),
            AuthErrorType::BadSignature => write!(f, "bad_signature"),
            AuthErrorType::ExpiredToken => write!(f, "expired_token"),
            AuthErrorType::InvalidCredentials => write!(f, "invalid_credentials"),
            AuthErrorType::InsufficientRole => write!(f, "insufficient_role"),
        }
    }
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create an authentication error
    pub fn auth<S: Into<String>>(message: S, error_type: AuthErrorType) -> Self {
        Self::Auth { message: message.into(), error_type }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound { resource: resource.into(), id: id.into() }
    }

    /// Create a conflict error
    pub fn conflict<M: Into<String>, R: Into<String>>(message: M, resource: R) -> Self {
        Self::Conflict { message: message.into(), resource: resource.into() }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create an internal server error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true when the error carries the given auth subtype.
    pub fn is_auth(&self, kind: AuthErrorType) -> bool {
        matches!(self, Error::Auth { error_type, .. } if *error_type == kind)
    }
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}

//! Error types for the complaint tracker
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to a front end as plain messages.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("You must be logged in to perform this action")]
    NotAuthenticated,

    #[error("Your role does not permit this action")]
    Forbidden,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Password cannot be changed for demo account {0}")]
    DemoAccountLocked(String),

    #[error("Complaint not found: {0}")]
    ComplaintNotFound(String),

    #[error("{0}")]
    Generic(String),
}

/// The four failure classes every mutator distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// No session where one is required, or the wrong role
    Authorization,
    /// Unknown id or bad credentials
    Validation,
    /// Operation refused by a fixed rule
    Policy,
    /// Storage or serialization fault
    Unexpected,
}

impl AppError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::NotAuthenticated | AppError::Forbidden => ErrorClass::Authorization,
            AppError::InvalidCredentials
            | AppError::IncorrectPassword
            | AppError::AccountNotFound(_)
            | AppError::ComplaintNotFound(_) => ErrorClass::Validation,
            AppError::DemoAccountLocked(_) => ErrorClass::Policy,
            AppError::Database(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Storage(_)
            | AppError::Generic(_) => ErrorClass::Unexpected,
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

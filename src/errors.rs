use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProvisioningError>;

/// Field-scoped error, returned in bulk from input validation and
/// individually from upstream calls where the failing field is known.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum ProvisioningError {
    #[error("input validation failed with {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Field(FieldError),

    #[error("Ledger API error: {0}")]
    LedgerApi(String),

    #[error("Ripple-REST error: {0}")]
    RestGateway(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ProvisioningError {
    /// Field the error is scoped to, where one is inferable.
    pub fn field(&self) -> Option<&str> {
        match self {
            ProvisioningError::Field(e) => Some(&e.field),
            _ => None,
        }
    }
}

use thiserror::Error;

/// Business errors for the booking lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid interval: start must strictly precede end")]
    InvalidInterval,
    #[error("item is not available for booking")]
    ItemUnavailable,
    #[error("booking is already approved")]
    InvalidTransition,
    #[error("Unknown state: {0}")]
    InvalidState(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl BookingError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        Self::NotFound(format!("{} {} not found", entity, id))
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            BookingError::NotFound(_) => 2001,
            BookingError::Forbidden(_) => 2002,
            BookingError::InvalidInterval => 2003,
            BookingError::ItemUnavailable => 2004,
            BookingError::InvalidTransition => 2005,
            BookingError::InvalidState(_) => 2006,
            BookingError::Repository(_) => 2200,
        }
    }
}

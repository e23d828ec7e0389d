use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Repository error: {0}")]
    Repository(#[from] eyre::Report),
}

impl BookingError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        BookingError::Validation(message.into())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_state - {0}")]
    InvalidState(String),
    #[error("unknown_status - {0}")]
    UnknownStatus(String),
    #[error("invalid_argument - {0}")]
    InvalidArgument(String),
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
}

impl AppError {
    pub fn invalid_state<M: Into<String>>(message: M) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn unknown_status<M: Into<String>>(message: M) -> Self {
        Self::UnknownStatus(message.into())
    }

    pub fn invalid_argument<M: Into<String>>(message: M) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidState(_) => "invalid_state",
            Self::UnknownStatus(_) => "unknown_status",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidState(message)
            | Self::UnknownStatus(message)
            | Self::InvalidArgument(message)
            | Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::Io(message) => message,
        }
    }
}

use thiserror::Error;

/// Failure taxonomy for an analysis request.
///
/// Only [`IntelError::user_message`] is meant for callers; the wrapped upstream and internal
/// errors carry detail for logs and error reporting.
#[derive(Debug, Error)]
pub enum IntelError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("places upstream failed: {0:#}")]
    Upstream(#[source] anyhow::Error),

    #[error("internal error: {0:#}")]
    Internal(#[source] anyhow::Error),
}

pub type IntelResult<T> = Result<T, IntelError>;

impl IntelError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Upstream(_) => "upstream",
            Self::Internal(_) => "internal",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Upstream(_) => {
                "Places service is unavailable right now. Please try again later.".to_string()
            }
            Self::Internal(_) => "Analysis failed. Please try again or contact support.".to_string(),
        }
    }

    /// The underlying error for reporting, if this is not a plain validation failure.
    pub fn report_source(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Validation(_) => None,
            Self::Upstream(err) | Self::Internal(err) => Some(err),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FinTrackError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Remote error ({status}): {message}")]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid {table} record: {message}")]
    InvalidRecord { table: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FinTrackError {
    /// Build a remote error from an HTTP status and message.
    pub fn remote(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            code,
            message: message.into(),
        }
    }

    /// True when the data API rejected a request because a column does not exist.
    ///
    /// PostgREST reports `42703` (undefined column, raised by Postgres) for
    /// filters and `PGRST204` for unknown columns in a payload.
    pub fn is_undefined_column(&self) -> bool {
        matches!(
            self,
            Self::Remote { code: Some(code), .. } if code == "42703" || code == "PGRST204"
        )
    }

    /// Text suitable for a user-facing notification.
    ///
    /// Remote and validation errors already carry a human-readable message;
    /// everything else falls back to the `Display` output.
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote { message, .. } => message.clone(),
            Self::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FinTrackError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Content request to {url} returned status {status}")]
    ContentStatusError { url: String, status: u16 },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl SiteError {
    /// Short sentence suitable for printing to an end user.
    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::HttpError(_) | SiteError::ContentStatusError { .. } => {
                "Could not load site content, check the content location".to_string()
            }
            SiteError::IoError(e) => format!("File access failed: {}", e),
            SiteError::SerializationError(_) => "Site data is not valid JSON".to_string(),
            SiteError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            SiteError::ConfigValidationError { message, .. } => message.clone(),
            SiteError::StorageError { message } => format!("Saving failed: {}", message),
            SiteError::ValidationError { message } => message.clone(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SiteError::ValidationError { .. })
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

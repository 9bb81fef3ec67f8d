use thiserror::Error;

#[derive(Error, Debug)]
pub enum WidgetFeedError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API response error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid feed data: {message}")]
    InvalidFeedData { message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, WidgetFeedError>;

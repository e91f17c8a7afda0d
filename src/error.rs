use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown difficulty level: {0}")]
    UnknownDifficulty(u8),

    #[error("Question not found: {0}")]
    QuestionNotFound(String),

    #[error("No candidate passed the quality check after {attempts} attempts")]
    ExhaustedCandidates { attempts: usize },

    #[error("Delivery failed for {failed} of {attempted} destinations: {details}")]
    Delivery {
        failed: usize,
        attempted: usize,
        details: String,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

use thiserror::Error;

use crate::constants::{INVALID_FORMAT_MESSAGE, MISSING_FILE_MESSAGE};

#[derive(Error, Debug)]
pub enum ForwarderError {
    #[error("{}", MISSING_FILE_MESSAGE)]
    MissingFile,

    #[error("{}", INVALID_FORMAT_MESSAGE)]
    InvalidFormat { filename: String },

    #[error("Malformed upload: {0}")]
    InvalidUpload(String),

    #[error("Upload exceeds the size limit")]
    UploadTooLarge,

    #[error("File is not valid UTF-8: {0}")]
    Decoding(#[from] std::str::Utf8Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid {expected} value '{value}' for field '{field}' on line {line}")]
    Conversion {
        line: u64,
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Downstream response could not be decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ForwarderError>;

impl ForwarderError {
    /// HTTP status reported to the uploader for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ForwarderError::MissingFile
            | ForwarderError::InvalidFormat { .. }
            | ForwarderError::InvalidUpload(_) => 400,
            ForwarderError::UploadTooLarge => 413,
            _ => 500,
        }
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwarderError::MissingFile => "missing_file",
            ForwarderError::InvalidFormat { .. } => "invalid_format",
            ForwarderError::InvalidUpload(_) => "invalid_upload",
            ForwarderError::UploadTooLarge => "too_large",
            ForwarderError::Decoding(_) => "decoding",
            ForwarderError::Csv(_) => "csv",
            ForwarderError::Conversion { .. } => "conversion",
            ForwarderError::Http(_) => "http",
            ForwarderError::Json(_) => "downstream_json",
            ForwarderError::Toml(_) | ForwarderError::Io(_) | ForwarderError::Config(_) => {
                "config"
            }
        }
    }
}

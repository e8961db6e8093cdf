use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid content at {path}: {message}")]
    InvalidContent { path: String, message: String },

    #[error("File too large ({size} bytes, max {limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Invalid file type `{0}` (only .txt and .md supported)")]
    UnsupportedFileType(String),

    #[error("File is not valid UTF-8 text")]
    InvalidEncoding,
}

impl ParseError {
    pub fn invalid_content(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidContent {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn file_too_large(size: usize, limit: usize) -> Self {
        Self::FileTooLarge { size, limit }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::InvalidJson(e.to_string())
    }
}

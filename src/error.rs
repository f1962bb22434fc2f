//! Error types for the scaffolder and the notes server.
//!
//! Every error carries a wire shape (`ErrorBody`) of `{code, message, status}`.
//! Variants that do not name a protocol code report `internal_error`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::mcp::protocol::error_codes;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Protocol Errors =====
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    InvalidUri(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    MissingArgument(String),

    #[error("Unknown method: {0}")]
    MethodNotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    // ===== Generator Errors =====
    #[error("Directory {} already exists", .0.display())]
    DirectoryExists(PathBuf),

    #[error("Template directory not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Template error in {path}: {message}")]
    Template { path: String, message: String },

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    // ===== Upstream Errors =====
    #[error("RTM API error: {0}")]
    Rtm(String),

    // ===== I/O Errors =====
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // ===== Internal Errors =====
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error codes reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    InvalidRequest,
    InvalidUri,
    InternalError,
    UnknownTool,
    InvalidArgument,
    MissingArgument,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "not_found",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::InvalidUri => "invalid_uri",
            ErrorCode::InternalError => "internal_error",
            ErrorCode::UnknownTool => "unknown_tool",
            ErrorCode::InvalidArgument => "invalid_argument",
            ErrorCode::MissingArgument => "missing_argument",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl ErrorBody {
    /// Fallback shape for failures whose origin is not a crate error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InternalError.to_string(),
            message: message.into(),
            status: 500,
        }
    }
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            status: err.status(),
        }
    }
}

impl Error {
    /// Create a template error for the given template path.
    pub fn template(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Protocol error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::InvalidRequest(_) | Self::MethodNotFound(_) | Self::Parse(_) => {
                ErrorCode::InvalidRequest
            }
            Self::InvalidUri(_) => ErrorCode::InvalidUri,
            Self::UnknownTool(_) => ErrorCode::UnknownTool,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::MissingArgument(_) => ErrorCode::MissingArgument,
            _ => ErrorCode::InternalError,
        }
    }

    /// HTTP-style status for this error. Client errors default to 400.
    pub fn status(&self) -> u16 {
        match self.code() {
            ErrorCode::NotFound => 404,
            ErrorCode::InternalError => 500,
            _ => 400,
        }
    }

    /// JSON-RPC error code used when this error answers a request.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Self::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            Self::Parse(_) => error_codes::PARSE_ERROR,
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            Self::NotFound(_) => error_codes::RESOURCE_NOT_FOUND,
            Self::InvalidUri(_)
            | Self::UnknownTool(_)
            | Self::InvalidArgument(_)
            | Self::MissingArgument(_) => error_codes::INVALID_PARAMS,
            _ => error_codes::INTERNAL_ERROR,
        }
    }

    /// Wire shape of this error.
    pub fn body(&self) -> ErrorBody {
        ErrorBody::from(self)
    }
}

//! Custom error types for skillsheet.
//!
//! Failures are scoped per input file: the batch loop catches a
//! [`SheetError`] for one file and keeps going with the rest.

use thiserror::Error;

/// Main error type for skillsheet operations
#[derive(Error, Debug)]
pub enum SheetError {
    /// Payload bytes contain no parseable JSON record
    #[error("Payload parse error: {message}")]
    Parse { message: String },

    /// A required template sheet could not be located
    #[error("Template error: sheet '{sheet}' not found")]
    Template { sheet: String },

    /// A single file's conversion failed
    #[error("Conversion failed for '{file}': {message}")]
    Conversion { file: String, message: String },

    /// Track mode resolved no track from the payload
    #[error("Track mode: no track found in the payload")]
    NoTracks,

    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Workbook read/write error wrapper
    #[error("Workbook error: {message}")]
    Workbook { message: String },

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<umya_spreadsheet::XlsxError> for SheetError {
    fn from(e: umya_spreadsheet::XlsxError) -> Self {
        Self::Workbook {
            message: format!("{:?}", e),
        }
    }
}

impl SheetError {
    /// Create a payload parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a template lookup error
    pub fn template(sheet: impl Into<String>) -> Self {
        Self::Template {
            sheet: sheet.into(),
        }
    }

    /// Create a conversion error tagged with its source file
    pub fn conversion(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Check whether this error is scoped to a single input file.
    ///
    /// Per-file errors are collected as batch warnings; anything else
    /// indicates a broken template or environment and is worth surfacing
    /// more loudly.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Conversion { .. } | Self::Template { .. } | Self::NoTracks
        )
    }
}

/// Type alias for skillsheet results
pub type Result<T> = std::result::Result<T, SheetError>;

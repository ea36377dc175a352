use serde::Serialize;
use thiserror::Error;

/// Main error type for the barcode range service.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum BarcodeError {
    #[error("{context}: {source}")]
    WithContextError {
        context: String,
        #[source]
        source: Box<BarcodeError>,
    },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    #[error("{0}")]
    UnifiedReaderError(#[from] crate::helpers::reader::UnifiedReaderError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Import and storage errors
    #[error("{0}")]
    ValidationError(#[from] crate::normalizer::ValidationError),

    #[error("{0}")]
    StorageError(#[from] crate::database::StorageError),

    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

/// Client-facing classification of a failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rows of the uploaded sheet are malformed or incomplete
    Validation,
    /// The range store could not be read or written
    Storage,
    /// The upload could not be read or decoded as a workbook
    Spreadsheet,
    /// The service settings are invalid (bad sheet pattern, unreadable config)
    Configuration,
}

impl BarcodeError {
    /// Classifies the error for the boundary layer, looking through context wrappers.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            BarcodeError::WithContextError { source, .. } => source.failure_kind(),
            BarcodeError::ValidationError(_) => FailureKind::Validation,
            BarcodeError::StorageError(_) => FailureKind::Storage,
            BarcodeError::ConfigError(_) | BarcodeError::PatternError(_) => FailureKind::Configuration,
            _ => FailureKind::Spreadsheet,
        }
    }
}

/// Serializable failure response handed to clients.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&BarcodeError> for ErrorResponse {
    fn from(error: &BarcodeError) -> Self {
        ErrorResponse {
            kind: error.failure_kind(),
            message: error.to_string(),
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, BarcodeError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| BarcodeError::WithContextError {
            context: message.to_owned(),
            source: Box::new(e),
        })
    }
}

use std::fmt::Formatter;

#[derive(Debug)]
pub enum AuditError {
    IoError(std::io::Error),
    PdfError(lopdf::Error),
    PageNotFound { index: usize, page_count: usize },
    InvalidPattern { pattern: String, source: regex::Error },
}

impl std::fmt::Display for AuditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            AuditError::IoError(e) => write!(f, "IO error: {}", e),
            AuditError::PdfError(e) => write!(f, "PDF error: {}", e),
            AuditError::PageNotFound { index, page_count } => write!(
                f,
                "page index {} out of range (document has {} pages)",
                index, page_count
            ),
            AuditError::InvalidPattern { pattern, source } => {
                write!(f, "invalid font pattern {:?}: {}", pattern, source)
            }
        }
    }
}

impl std::error::Error for AuditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuditError::IoError(e) => Some(e),
            AuditError::PdfError(e) => Some(e),
            AuditError::PageNotFound { .. } => None,
            AuditError::InvalidPattern { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for AuditError {
    fn from(e: std::io::Error) -> Self {
        AuditError::IoError(e)
    }
}

impl From<lopdf::Error> for AuditError {
    fn from(e: lopdf::Error) -> Self {
        AuditError::PdfError(e)
    }
}

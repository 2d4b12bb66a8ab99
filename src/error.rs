use std::fmt;

pub type Result<T> = std::result::Result<T, CopydeskError>;

/// Crate-wide error type.
#[derive(Debug)]
pub enum CopydeskError {
    /// Catch-all for failures that need no dedicated variant.
    Generic(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Db(rusqlite::Error),
    /// An offset falls outside the text being operated on, lands off a
    /// character boundary, or a recorded edit no longer matches the text.
    InvalidRange(String),
    /// Two change groups cover overlapping spans at apply time.
    Overlap(String),
    /// The document's revision moved past the suggestion's base revision,
    /// so the suggestion's recorded offsets can no longer be trusted.
    StaleSuggestion {
        base_revision: u64,
        document_revision: u64,
    },
    /// A persisted record is missing.
    NotFound(String),
}

impl fmt::Display for CopydeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopydeskError::Generic(msg) => write!(f, "{}", msg),
            CopydeskError::Io(e) => write!(f, "io error: {}", e),
            CopydeskError::Json(e) => write!(f, "json error: {}", e),
            CopydeskError::Db(e) => write!(f, "database error: {}", e),
            CopydeskError::InvalidRange(msg) => write!(f, "invalid range: {}", msg),
            CopydeskError::Overlap(msg) => write!(f, "overlapping change groups: {}", msg),
            CopydeskError::StaleSuggestion {
                base_revision,
                document_revision,
            } => write!(
                f,
                "suggestion is out of date (document is at revision {}, suggestion was computed at revision {}); regenerate the suggestion",
                document_revision, base_revision
            ),
            CopydeskError::NotFound(what) => write!(f, "{} not found", what),
        }
    }
}

impl std::error::Error for CopydeskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CopydeskError::Io(e) => Some(e),
            CopydeskError::Json(e) => Some(e),
            CopydeskError::Db(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CopydeskError {
    fn from(e: std::io::Error) -> Self {
        CopydeskError::Io(e)
    }
}

impl From<serde_json::Error> for CopydeskError {
    fn from(e: serde_json::Error) -> Self {
        CopydeskError::Json(e)
    }
}

impl From<rusqlite::Error> for CopydeskError {
    fn from(e: rusqlite::Error) -> Self {
        CopydeskError::Db(e)
    }
}

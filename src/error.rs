use thiserror::Error;

/// Main error type for nautex operations
#[derive(Error, Debug)]
pub enum NautexError {
    #[error("index has no {0} structure")]
    MissingStructure(String),

    #[error("index already has a {0} structure")]
    StructureExists(String),

    #[error("index version {0} predates aligned term ids")]
    UnsupportedVersion(String),

    #[error("lexicon term ids are not strictly ascending in scan order")]
    UnalignedTermIds,

    #[error("malformed bit stream: {0}")]
    MalformedStream(String),

    #[error("posting list {index} out of range ({count} posting lists)")]
    TermOutOfRange { index: usize, count: usize },

    #[error("build cancelled at pass boundary")]
    Cancelled,

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("properties error: {0}")]
    Properties(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("term dictionary error: {0}")]
    TermDictionary(String),
}

/// Result type alias for nautex operations
pub type Result<T> = std::result::Result<T, NautexError>;

impl NautexError {
    /// Check if this error is a build precondition that left the index untouched
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            NautexError::MissingStructure(_)
                | NautexError::StructureExists(_)
                | NautexError::UnsupportedVersion(_)
                | NautexError::UnalignedTermIds
        )
    }
}

impl From<fst::Error> for NautexError {
    fn from(e: fst::Error) -> Self {
        NautexError::TermDictionary(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NautexError::MissingStructure("inverted".to_string());
        assert_eq!(err.to_string(), "index has no inverted structure");

        let err = NautexError::TermOutOfRange { index: 5, count: 3 };
        assert_eq!(
            err.to_string(),
            "posting list 5 out of range (3 posting lists)"
        );
    }

    #[test]
    fn test_precondition_errors() {
        assert!(NautexError::StructureExists("direct".to_string()).is_precondition());
        assert!(NautexError::UnalignedTermIds.is_precondition());
        assert!(!NautexError::MalformedStream("eof".to_string()).is_precondition());
    }
}

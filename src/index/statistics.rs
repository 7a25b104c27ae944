//! Collection-wide statistics
//!
//! Immutable for the lifetime of a query or a build pass. Persisted inside
//! the index properties file.

use serde::{Deserialize, Serialize};

/// Statistics over the whole collection
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CollectionStatistics {
    /// Total number of documents
    pub num_docs: u32,
    /// Number of distinct terms in the lexicon
    pub num_terms: u32,
    /// Total number of tokens (sum of document lengths)
    pub num_tokens: u64,
    /// Total number of postings across all lists
    pub num_pointers: u64,
    /// Names of the indexed fields; empty when fields are not tracked
    pub field_names: Vec<String>,
    /// Tokens per field, parallel to `field_names`
    pub field_tokens: Vec<u64>,
}

impl CollectionStatistics {
    pub fn field_count(&self) -> usize {
        self.field_names.len()
    }

    pub fn has_fields(&self) -> bool {
        !self.field_names.is_empty()
    }

    /// Average document length in tokens
    pub fn average_doc_length(&self) -> f64 {
        if self.num_docs == 0 {
            0.0
        } else {
            self.num_tokens as f64 / self.num_docs as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_doc_length() {
        let stats = CollectionStatistics {
            num_docs: 4,
            num_tokens: 600,
            ..Default::default()
        };
        assert!((stats.average_doc_length() - 150.0).abs() < f64::EPSILON);

        let empty = CollectionStatistics::default();
        assert_eq!(empty.average_doc_length(), 0.0);
    }

    #[test]
    fn test_field_count() {
        let mut stats = CollectionStatistics::default();
        assert!(!stats.has_fields());

        stats.field_names = vec!["title".to_string(), "body".to_string()];
        assert_eq!(stats.field_count(), 2);
        assert!(stats.has_fields());
    }
}

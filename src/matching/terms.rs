//! Query terms and their resolution into matching entries

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::MatchingConfig;
use crate::error::Result;
use crate::index::{CollectionStatistics, EntryStatistics, InvertedIndex, Lexicon};
use crate::matching::models::{Bm25, WeightingModel};
use crate::postings::{OrPostingCursor, PostingCursor};

/// One term of a parsed query, possibly composite
///
/// A synonym group opens every alternative's posting list and behaves as a
/// single effective term with summed statistics.
#[derive(Clone, Debug)]
pub enum QueryTerm {
    Single(String),
    Synonym(Vec<String>),
}

impl QueryTerm {
    /// Resolve into a matching entry, or `None` when the term matches
    /// nothing (unseen in the lexicon, or dropped by the low-IDF policy)
    pub fn resolve(
        &self,
        lexicon: &Lexicon,
        inverted: &InvertedIndex,
        collection: &CollectionStatistics,
        config: &MatchingConfig,
        properties: &QueryTermProperties,
    ) -> Result<Option<MatchingEntry>> {
        let (cursor, statistics): (Box<dyn PostingCursor>, EntryStatistics) = match self {
            QueryTerm::Single(term) => {
                let entry = match lexicon.get(term) {
                    Some(entry) => entry,
                    None => {
                        debug!("term {:?} not found in lexicon", term);
                        return Ok(None);
                    }
                };
                if config.ignore_low_idf_terms
                    && entry.doc_frequency > config.low_idf_cutoff(collection.num_docs)
                {
                    debug!(
                        "term {:?} dropped: df {} exceeds low-idf cutoff",
                        term, entry.doc_frequency
                    );
                    return Ok(None);
                }
                (
                    Box::new(inverted.open_cursor(entry.pointer)),
                    entry.statistics(),
                )
            }
            QueryTerm::Synonym(alternatives) => {
                let mut cursors: Vec<Box<dyn PostingCursor>> = Vec::new();
                let mut statistics = EntryStatistics::default();
                for alt in alternatives {
                    let entry = match lexicon.get(alt) {
                        Some(entry) => entry,
                        None => {
                            debug!("synonym alternative {:?} not found in lexicon", alt);
                            continue;
                        }
                    };
                    statistics.add(&entry.statistics());
                    cursors.push(Box::new(inverted.open_cursor(entry.pointer)));
                }
                if cursors.is_empty() {
                    return Ok(None);
                }
                (
                    Box::new(OrPostingCursor::new(cursors, inverted.field_count())),
                    statistics,
                )
            }
        };

        Ok(Some(MatchingEntry {
            term: self.to_string(),
            cursor,
            statistics,
            models: properties.models.clone(),
            key_frequency: properties.weight,
            required: properties.required,
        }))
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTerm::Single(term) => write!(f, "{}", term),
            QueryTerm::Synonym(alternatives) => {
                write!(f, "#syn({})", alternatives.join(" "))
            }
        }
    }
}

/// Query-side attributes of one term
#[derive(Clone)]
pub struct QueryTermProperties {
    /// Query-side weight (e.g. repetition count in the query)
    pub weight: f64,
    /// MUST-match operand for the ranking driver's required mask
    pub required: bool,
    /// Weighting models applied to this term's cursor
    pub models: Vec<Arc<dyn WeightingModel>>,
}

impl Default for QueryTermProperties {
    fn default() -> Self {
        Self {
            weight: 1.0,
            required: false,
            models: vec![Arc::new(Bm25::default())],
        }
    }
}

impl QueryTermProperties {
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_models(mut self, models: Vec<Arc<dyn WeightingModel>>) -> Self {
        self.models = models;
        self
    }
}

/// The parsed query handed to the manager: terms in input order
#[derive(Default)]
pub struct MatchingQueryTerms {
    pub query_id: String,
    terms: Vec<(QueryTerm, QueryTermProperties)>,
}

impl MatchingQueryTerms {
    pub fn new(query_id: &str) -> Self {
        Self {
            query_id: query_id.to_string(),
            terms: Vec::new(),
        }
    }

    pub fn push(&mut self, term: QueryTerm, properties: QueryTermProperties) {
        self.terms.push((term, properties));
    }

    /// Append a single lexical token with default properties
    pub fn push_single(&mut self, term: &str) {
        self.push(
            QueryTerm::Single(term.to_string()),
            QueryTermProperties::default(),
        );
    }

    /// Append a synonym group with default properties
    pub fn push_synonym(&mut self, alternatives: &[&str]) {
        self.push(
            QueryTerm::Synonym(alternatives.iter().map(|s| s.to_string()).collect()),
            QueryTermProperties::default(),
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = &(QueryTerm, QueryTermProperties)> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// The per-term object produced during assembly: cursor, statistics,
/// models, query weight, and the required flag
pub struct MatchingEntry {
    pub term: String,
    pub cursor: Box<dyn PostingCursor>,
    pub statistics: EntryStatistics,
    pub models: Vec<Arc<dyn WeightingModel>>,
    pub key_frequency: f64,
    pub required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let single = QueryTerm::Single("cat".to_string());
        assert_eq!(single.to_string(), "cat");

        let syn = QueryTerm::Synonym(vec!["cat".to_string(), "kitten".to_string()]);
        assert_eq!(syn.to_string(), "#syn(cat kitten)");
    }

    #[test]
    fn test_query_terms_ordering() {
        let mut terms = MatchingQueryTerms::new("q1");
        terms.push_single("alpha");
        terms.push_synonym(&["beta", "gamma"]);
        assert_eq!(terms.len(), 2);

        let rendered: Vec<String> = terms.iter().map(|(t, _)| t.to_string()).collect();
        assert_eq!(rendered, vec!["alpha", "#syn(beta gamma)"]);
    }

    #[test]
    fn test_default_properties() {
        let props = QueryTermProperties::default();
        assert_eq!(props.weight, 1.0);
        assert!(!props.required);
        assert_eq!(props.models.len(), 1);
        assert_eq!(props.models[0].name(), "bm25");
    }
}

//! The posting-list manager
//!
//! Transforms a parsed query into a parallel-array representation suitable
//! for a term-at-a-time or document-at-a-time matching driver: one posting
//! cursor per effective term, plus its weighting models, merged statistics,
//! display string, query weight, and the required-term bitmask.
//!
//! Terms that resolve to nothing are skipped without leaving a hole, so the
//! arrays and the bits of the required mask index effective positions, not
//! original query positions.

use std::sync::Arc;

use tracing::info;

use crate::config::MatchingConfig;
use crate::error::{NautexError, Result};
use crate::index::{CollectionStatistics, DocumentIndex, EntryStatistics, Index};
use crate::matching::models::WeightingModel;
use crate::matching::plugins::resolve_plugins;
use crate::matching::terms::{MatchingEntry, MatchingQueryTerms};
use crate::postings::PostingCursor;

/// Per-query coordinator over the effective terms' posting cursors
pub struct PostingListManager {
    cursors: Vec<Box<dyn PostingCursor>>,
    models: Vec<Vec<Arc<dyn WeightingModel>>>,
    statistics: Vec<EntryStatistics>,
    term_strings: Vec<String>,
    key_frequencies: Vec<f64>,
    required_mask: u64,
    num_terms: usize,
    collection: CollectionStatistics,
    documents: DocumentIndex,
}

impl PostingListManager {
    /// Assemble a manager for one query
    ///
    /// Resolves every query term in input order, then runs the registered
    /// plugins named by the configuration.
    pub fn new(
        index: &Index,
        collection: &CollectionStatistics,
        terms: &MatchingQueryTerms,
        config: &MatchingConfig,
    ) -> Result<Self> {
        let lexicon = index.lexicon()?;
        let inverted = index.inverted_index()?;
        let documents = index.document_index()?;

        let mut manager = Self {
            cursors: Vec::new(),
            models: Vec::new(),
            statistics: Vec::new(),
            term_strings: Vec::new(),
            key_frequencies: Vec::new(),
            required_mask: 0,
            num_terms: 0,
            collection: collection.clone(),
            documents,
        };

        for (term, properties) in terms.iter() {
            let entry = match term.resolve(&lexicon, &inverted, collection, config, properties)? {
                Some(entry) => entry,
                None => continue,
            };
            manager.push_entry(entry);
        }

        info!(
            "query {} with {} terms has {} posting lists",
            terms.query_id,
            terms.len(),
            manager.cursors.len()
        );

        for plugin in resolve_plugins(&config.plugins) {
            plugin.process(terms, index, &mut manager);
        }

        Ok(manager)
    }

    /// Append an effective term; plugins use this to extend the lists
    pub fn push_entry(&mut self, entry: MatchingEntry) {
        if entry.required {
            self.required_mask |= 1 << self.cursors.len();
        }
        self.cursors.push(entry.cursor);
        self.models.push(entry.models);
        self.statistics.push(entry.statistics);
        self.term_strings.push(entry.term);
        self.key_frequencies.push(entry.key_frequency);
    }

    /// Finalise the term count; with `first_move`, advance every cursor one
    /// step so the first `id()` is valid. Call exactly once before scoring.
    pub fn prepare(&mut self, first_move: bool) -> Result<()> {
        self.num_terms = self.cursors.len();
        if first_move {
            for cursor in self.cursors.iter_mut() {
                cursor.next()?;
            }
        }
        Ok(())
    }

    /// Number of effective posting lists for this query
    pub fn len(&self) -> usize {
        self.num_terms
    }

    pub fn is_empty(&self) -> bool {
        self.num_terms == 0
    }

    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    /// Accessor bound: the live arrays. Plugins mutate the manager before
    /// `prepare`, when `num_terms` is still zero.
    fn check_bounds(&self, i: usize) -> Result<()> {
        if i >= self.cursors.len() {
            return Err(NautexError::TermOutOfRange {
                index: i,
                count: self.cursors.len(),
            });
        }
        Ok(())
    }

    /// Cursor of the i-th effective term, for the driver to advance
    pub fn cursor_mut(&mut self, i: usize) -> Result<&mut Box<dyn PostingCursor>> {
        self.check_bounds(i)?;
        Ok(&mut self.cursors[i])
    }

    /// Cursor of the i-th effective term, read-only
    pub fn cursor(&self, i: usize) -> Result<&dyn PostingCursor> {
        self.check_bounds(i)?;
        Ok(self.cursors[i].as_ref())
    }

    /// Merged statistics of the i-th effective term
    pub fn statistics(&self, i: usize) -> Result<&EntryStatistics> {
        self.check_bounds(i)?;
        Ok(&self.statistics[i])
    }

    /// Display string of the i-th effective term
    pub fn term(&self, i: usize) -> Result<&str> {
        self.check_bounds(i)?;
        Ok(&self.term_strings[i])
    }

    /// Query-side weight of the i-th effective term
    pub fn key_frequency(&self, i: usize) -> Result<f64> {
        self.check_bounds(i)?;
        Ok(self.key_frequencies[i])
    }

    pub fn set_key_frequency(&mut self, i: usize, weight: f64) -> Result<()> {
        self.check_bounds(i)?;
        self.key_frequencies[i] = weight;
        Ok(())
    }

    /// Bitmask with bit `i` set iff effective term `i` is a MUST-match
    /// operand
    pub fn required_mask(&self) -> u64 {
        self.required_mask
    }

    /// Score the i-th term's cursor at its current position: the query
    /// weight times the sum over the term's weighting models
    ///
    /// Only valid after `prepare`; the bound is the finalised term count.
    pub fn score(&self, i: usize) -> Result<f64> {
        if i >= self.num_terms {
            return Err(NautexError::TermOutOfRange {
                index: i,
                count: self.num_terms,
            });
        }
        let cursor = self.cursors[i].as_ref();
        let doc_length = self.documents.doc_length(cursor.id());
        let entry = &self.statistics[i];
        let total: f64 = self.models[i]
            .iter()
            .map(|m| m.score(cursor.frequency(), doc_length, entry, &self.collection))
            .sum();
        Ok(self.key_frequencies[i] * total)
    }

    /// Release every cursor; idempotent
    pub fn close(&mut self) {
        self.cursors.clear();
        self.num_terms = 0;
    }
}

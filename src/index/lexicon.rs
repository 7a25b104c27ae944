//! Term dictionary backed by an FST
//!
//! Maps term strings to lexicon entries. The FST value is the term's ordinal
//! in insertion (lexicographic) order, which is also its term id: the entry
//! table is indexed directly by term id. Indices written this way carry the
//! property `index.lexicon.termids = aligned`, which the transposition
//! requires.

use fst::{Map, MapBuilder};
use serde::{Deserialize, Serialize};

use super::index::Index;
use crate::error::{NautexError, Result};
use crate::postings::{BitPointer, TermId};

/// Statistics of one effective term: document frequency and collection
/// frequency. Composite terms merge these by summation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStatistics {
    /// Number of documents containing the term
    pub doc_frequency: u32,
    /// Total occurrences across the collection
    pub term_frequency: u64,
}

impl EntryStatistics {
    pub fn add(&mut self, other: &EntryStatistics) {
        self.doc_frequency += other.doc_frequency;
        self.term_frequency += other.term_frequency;
    }
}

/// One lexicon record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub term_id: TermId,
    pub doc_frequency: u32,
    pub term_frequency: u64,
    /// Location of the term's posting list in the inverted file
    pub pointer: BitPointer,
}

impl LexiconEntry {
    pub fn statistics(&self) -> EntryStatistics {
        EntryStatistics {
            doc_frequency: self.doc_frequency,
            term_frequency: self.term_frequency,
        }
    }
}

/// Read-side term dictionary
pub struct Lexicon {
    fst: Map<Vec<u8>>,
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    pub fn open(index: &Index) -> Result<Self> {
        if !index.has_structure("lexicon") {
            return Err(NautexError::MissingStructure("lexicon".to_string()));
        }
        let fst_bytes = std::fs::read(index.structure_path("lexicon", ".fst"))?;
        let entry_bytes = std::fs::read(index.structure_path("lexicon", ".entries"))?;
        let fst = Map::new(fst_bytes)?;
        let entries: Vec<LexiconEntry> = bincode::deserialize(&entry_bytes)?;
        Ok(Self { fst, entries })
    }

    /// Look up a term string
    pub fn get(&self, term: &str) -> Option<&LexiconEntry> {
        self.fst
            .get(term.as_bytes())
            .map(|ord| &self.entries[ord as usize])
    }

    /// Look up by term id
    pub fn entry(&self, term_id: TermId) -> Option<&LexiconEntry> {
        self.entries.get(term_id.as_usize())
    }

    /// Entries in term-id order
    pub fn iter(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Write-side term dictionary builder
///
/// Terms MUST be added in lexicographic order; the ordinal assigned to each
/// term becomes its term id.
pub(crate) struct LexiconBuilder {
    terms: Vec<String>,
    entries: Vec<LexiconEntry>,
}

impl LexiconBuilder {
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Next term id to be assigned
    pub fn next_term_id(&self) -> TermId {
        TermId(self.entries.len() as u32)
    }

    pub fn add(&mut self, term: &str, entry: LexiconEntry) -> Result<()> {
        if let Some(last) = self.terms.last() {
            if term <= last.as_str() {
                return Err(NautexError::TermDictionary(format!(
                    "term {:?} out of order after {:?}",
                    term, last
                )));
            }
        }
        debug_assert_eq!(entry.term_id, self.next_term_id());
        self.terms.push(term.to_string());
        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Write both lexicon files and register the structure
    pub fn write(self, index: &mut Index) -> Result<()> {
        let mut builder = MapBuilder::memory();
        for (ord, term) in self.terms.iter().enumerate() {
            builder.insert(term.as_bytes(), ord as u64)?;
        }
        let fst_bytes = builder.into_inner()?;
        std::fs::write(index.structure_path("lexicon", ".fst"), fst_bytes)?;
        std::fs::write(
            index.structure_path("lexicon", ".entries"),
            bincode::serialize(&self.entries)?,
        )?;
        index.add_structure("lexicon");
        index.set_property("index.lexicon.termids", "aligned");
        index.statistics_mut().num_terms = self.entries.len() as u32;
        Ok(())
    }
}

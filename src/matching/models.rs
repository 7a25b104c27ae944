//! Weighting model seam
//!
//! Models are stateless scorers: the manager hands them the term frequency
//! at the cursor position, the document length, and the term and collection
//! statistics. The mathematics beyond BM25 and TF-IDF live outside this
//! crate; anything implementing the trait plugs in.

use crate::index::{CollectionStatistics, EntryStatistics};

pub trait WeightingModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score one posting occurrence
    fn score(
        &self,
        tf: u32,
        doc_length: u32,
        entry: &EntryStatistics,
        collection: &CollectionStatistics,
    ) -> f64;
}

/// Okapi BM25 with the Robertson-Sparck-Jones idf
#[derive(Clone, Debug)]
pub struct Bm25 {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25 {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

impl WeightingModel for Bm25 {
    fn name(&self) -> &'static str {
        "bm25"
    }

    fn score(
        &self,
        tf: u32,
        doc_length: u32,
        entry: &EntryStatistics,
        collection: &CollectionStatistics,
    ) -> f64 {
        let n = collection.num_docs as f64;
        let df = entry.doc_frequency as f64;
        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

        let avgdl = collection.average_doc_length().max(1.0);
        let norm = 1.0 - self.b + self.b * (doc_length as f64 / avgdl);
        let tf = tf as f64;
        idf * (tf * (self.k1 + 1.0)) / (tf + self.k1 * norm)
    }
}

/// Plain term-frequency times inverse document frequency
#[derive(Clone, Copy, Debug, Default)]
pub struct TfIdf;

impl WeightingModel for TfIdf {
    fn name(&self) -> &'static str {
        "tf_idf"
    }

    fn score(
        &self,
        tf: u32,
        _doc_length: u32,
        entry: &EntryStatistics,
        collection: &CollectionStatistics,
    ) -> f64 {
        let n = collection.num_docs as f64;
        let df = entry.doc_frequency as f64;
        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
        tf as f64 * idf
    }
}

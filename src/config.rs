use serde::{Deserialize, Serialize};

/// Configuration for the inverted-to-direct transposition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranspositionConfig {
    /// Token budget per pass of the inverted file. Peak memory is roughly
    /// proportional to this: each pass materialises the direct postings for a
    /// window of documents whose cumulative length stays under the budget.
    pub process_tokens: u64,
}

impl Default for TranspositionConfig {
    fn default() -> Self {
        Self {
            process_tokens: 100_000_000,
        }
    }
}

impl TranspositionConfig {
    /// Set the token budget per pass
    pub fn with_process_tokens(mut self, tokens: u64) -> Self {
        self.process_tokens = tokens;
        self
    }
}

/// Configuration for query-time posting list assembly
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Drop terms with very low IDF (i.e. very frequent terms) during assembly
    pub ignore_low_idf_terms: bool,
    /// A term is considered low-IDF when its document frequency exceeds this
    /// fraction of the collection size
    pub low_idf_df_ratio: f64,
    /// Names of manager plugins to run after assembly, resolved against the
    /// process-wide plugin registry in this order
    pub plugins: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            ignore_low_idf_terms: true,
            low_idf_df_ratio: 0.75,
            plugins: Vec::new(),
        }
    }
}

impl MatchingConfig {
    /// Enable or disable low-IDF term filtering
    pub fn with_ignore_low_idf_terms(mut self, ignore: bool) -> Self {
        self.ignore_low_idf_terms = ignore;
        self
    }

    /// Set the document-frequency ratio above which a term counts as low-IDF
    pub fn with_low_idf_df_ratio(mut self, ratio: f64) -> Self {
        self.low_idf_df_ratio = ratio;
        self
    }

    /// Set the plugin names to run after assembly
    pub fn with_plugins(mut self, plugins: Vec<String>) -> Self {
        self.plugins = plugins;
        self
    }

    /// Document-frequency cutoff for the given collection size
    pub fn low_idf_cutoff(&self, num_docs: u32) -> u32 {
        (self.low_idf_df_ratio * num_docs as f64) as u32
    }
}

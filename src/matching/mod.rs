//! Query-time posting list assembly and scoring state
//!
//! A parsed query is a sequence of query terms, each possibly composite
//! (a synonym group). The posting-list manager resolves each term against
//! the lexicon, opens the posting cursors, attaches weighting models, and
//! exposes a uniform iteration-and-scoring surface to a ranking driver.

mod manager;
mod models;
mod plugins;
mod terms;

pub use manager::PostingListManager;
pub use models::{Bm25, TfIdf, WeightingModel};
pub use plugins::{register_plugin, ManagerPlugin, PluginFactory};
pub use terms::{MatchingEntry, MatchingQueryTerms, QueryTerm, QueryTermProperties};

//! The on-disk index: a directory of named structures plus properties

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::document::DocumentIndex;
use super::inverted::InvertedIndex;
use super::lexicon::Lexicon;
use super::statistics::CollectionStatistics;
use crate::error::Result;

/// Format version written into new indices. Versions before 2.0 did not
/// guarantee term ids aligned with lexicon scan order.
pub(crate) const INDEX_VERSION: &str = "2.1";

/// Persisted part of an index: structure registry, statistics, properties
#[derive(Debug, Serialize, Deserialize)]
struct IndexProperties {
    structures: BTreeSet<String>,
    statistics: CollectionStatistics,
    properties: BTreeMap<String, String>,
}

impl IndexProperties {
    fn new() -> Self {
        Self {
            structures: BTreeSet::new(),
            statistics: CollectionStatistics::default(),
            properties: BTreeMap::new(),
        }
    }
}

/// Handle to an on-disk index
///
/// Opens named structures by string key; reports whether a structure exists;
/// hands out readers over the lexicon, inverted file, and document index.
/// Mutations (structure registration, properties, statistics) live in memory
/// until `flush()`.
pub struct Index {
    path: PathBuf,
    prefix: String,
    properties: IndexProperties,
}

impl Index {
    /// Create a fresh index directory
    pub fn create<P: AsRef<Path>>(path: P, prefix: &str, field_names: Vec<String>) -> Result<Self> {
        fs::create_dir_all(&path)?;
        let mut properties = IndexProperties::new();
        properties
            .properties
            .insert("index.version".to_string(), INDEX_VERSION.to_string());
        let field_count = field_names.len();
        properties.statistics.field_names = field_names;
        properties.statistics.field_tokens = vec![0; field_count];
        let index = Self {
            path: path.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
            properties,
        };
        index.flush()?;
        Ok(index)
    }

    /// Open an existing index
    pub fn open<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let properties_path = path.join(format!("{}.properties.json", prefix));
        let bytes = fs::read(properties_path)?;
        let properties: IndexProperties = serde_json::from_slice(&bytes)?;
        Ok(Self {
            path,
            prefix: prefix.to_string(),
            properties,
        })
    }

    /// Persist the registry, statistics, and properties
    pub fn flush(&self) -> Result<()> {
        let properties_path = self.path.join(format!("{}.properties.json", self.prefix));
        let bytes = serde_json::to_vec_pretty(&self.properties)?;
        fs::write(properties_path, bytes)?;
        Ok(())
    }

    /// Path of the file backing a structure, e.g. `("inverted", ".bf")`
    pub fn structure_path(&self, name: &str, ext: &str) -> PathBuf {
        self.path.join(format!("{}.{}{}", self.prefix, name, ext))
    }

    pub fn has_structure(&self, name: &str) -> bool {
        self.properties.structures.contains(name)
    }

    /// Register a structure; persisted at the next `flush()`
    pub fn add_structure(&mut self, name: &str) {
        self.properties.structures.insert(name.to_string());
    }

    /// Unregister a structure; backing files are the caller's concern
    pub fn remove_structure(&mut self, name: &str) {
        self.properties.structures.remove(name);
    }

    /// Atomically replace the file behind `to` with the file behind `from`
    /// and fix up the registry
    pub fn rename_structure(&mut self, from: &str, to: &str, ext: &str) -> Result<()> {
        fs::rename(self.structure_path(from, ext), self.structure_path(to, ext))?;
        self.properties.structures.remove(from);
        self.properties.structures.insert(to.to_string());
        Ok(())
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.properties.get(key).map(String::as_str)
    }

    /// Property value, or `default` when unset
    pub fn property_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.property(key).unwrap_or(default)
    }

    pub fn set_property(&mut self, key: &str, value: &str) {
        self.properties
            .properties
            .insert(key.to_string(), value.to_string());
    }

    pub fn statistics(&self) -> &CollectionStatistics {
        &self.properties.statistics
    }

    pub fn statistics_mut(&mut self) -> &mut CollectionStatistics {
        &mut self.properties.statistics
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Load a structure's backing file fully into memory
    pub fn read_structure_bytes(&self, name: &str, ext: &str) -> Result<Arc<Vec<u8>>> {
        Ok(Arc::new(fs::read(self.structure_path(name, ext))?))
    }

    /// Load the lexicon
    pub fn lexicon(&self) -> Result<Lexicon> {
        Lexicon::open(self)
    }

    /// Load the inverted posting index
    pub fn inverted_index(&self) -> Result<InvertedIndex> {
        InvertedIndex::open(self, "inverted")
    }

    /// Load the direct posting index (present after transposition)
    pub fn direct_index(&self) -> Result<InvertedIndex> {
        InvertedIndex::open(self, "direct")
    }

    /// Load the document index for random access
    pub fn document_index(&self) -> Result<DocumentIndex> {
        DocumentIndex::open(self)
    }
}

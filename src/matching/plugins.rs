//! Process-wide manager plugin registry
//!
//! Plugins are registered explicitly under a name; the
//! `MatchingConfig::plugins` list resolves against this registry when a
//! manager is assembled, in list order. Unknown names are warned about and
//! skipped.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::warn;

use crate::index::Index;
use crate::matching::manager::PostingListManager;
use crate::matching::terms::MatchingQueryTerms;

/// Hook invoked after initial manager assembly; may mutate the manager's
/// lists through its public surface
pub trait ManagerPlugin: Send + Sync {
    fn process(&self, terms: &MatchingQueryTerms, index: &Index, manager: &mut PostingListManager);
}

pub type PluginFactory = fn() -> Box<dyn ManagerPlugin>;

static REGISTRY: Lazy<RwLock<HashMap<String, PluginFactory>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a plugin factory under a name; later registrations replace
/// earlier ones
pub fn register_plugin(name: &str, factory: PluginFactory) {
    REGISTRY.write().insert(name.to_string(), factory);
}

/// Instantiate the named plugins, preserving list order
pub(crate) fn resolve_plugins(names: &[String]) -> Vec<Box<dyn ManagerPlugin>> {
    let registry = REGISTRY.read();
    let mut plugins = Vec::with_capacity(names.len());
    for name in names {
        match registry.get(name) {
            Some(factory) => plugins.push(factory()),
            None => warn!("unknown posting list manager plugin {:?}", name),
        }
    }
    plugins
}

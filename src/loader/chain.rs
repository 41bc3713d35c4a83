use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use super::Loader;
use crate::Translations;
use crate::error::LoadError;
use crate::keys::replace_recursive;

/// Chain of translation loaders.
///
/// Loaders earlier in the chain win: on `load`, every member is asked in
/// order and each result only fills the gaps left by the members before it,
/// at every depth.
#[derive(Debug, Default, Clone)]
pub struct ChainLoader {
    loaders: Vec<Arc<dyn Loader>>,
}

impl ChainLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a loader to the end of the chain, or to the front when `prepend`.
    pub fn add_loader(&mut self, loader: Arc<dyn Loader>, prepend: bool) {
        if prepend {
            self.loaders.insert(0, loader);
        } else {
            self.loaders.push(loader);
        }
    }

    /// Remove the first member that is the same instance as `loader`.
    ///
    /// Returns whether a member was removed.
    pub fn remove_loader(&mut self, loader: &Arc<dyn Loader>) -> bool {
        match self.loaders.iter().position(|member| Arc::ptr_eq(member, loader)) {
            Some(index) => {
                self.loaders.remove(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn loaders(&self) -> &[Arc<dyn Loader>] {
        &self.loaders
    }
}

impl Loader for ChainLoader {
    fn load(
        &self,
        locale: &str,
        group: &str,
        namespace: Option<&str>,
    ) -> Result<Translations, LoadError> {
        let mut messages = Translations::new();
        for loader in &self.loaders {
            messages = replace_recursive(loader.load(locale, group, namespace)?, messages);
        }
        Ok(messages)
    }

    fn add_namespace(&self, namespace: &str, hint: &Path) {
        for loader in &self.loaders {
            loader.add_namespace(namespace, hint);
        }
    }

    fn add_json_path(&self, path: &Path) {
        for loader in &self.loaders {
            loader.add_json_path(path);
        }
    }

    /// Union of the members' namespaces; the first member to register a
    /// namespace keeps it.
    fn namespaces(&self) -> BTreeMap<String, PathBuf> {
        let mut namespaces = BTreeMap::new();
        for loader in &self.loaders {
            for (namespace, hint) in loader.namespaces() {
                namespaces.entry(namespace).or_insert(hint);
            }
        }
        namespaces
    }
}

//! Translation loaders
/// Ordered chain of loaders with override precedence
mod chain;
/// Lang directory backed loader
mod file;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{
    Path,
    PathBuf,
};

pub use chain::ChainLoader;
pub use file::FileLoader;
pub(crate) use file::read_json_file;

use crate::Translations;
use crate::error::LoadError;

/// Group and namespace value selecting the per-locale JSON catch-all.
pub const WILDCARD: &str = "*";

/// Source of translation lines for a (locale, group, namespace) scope.
pub trait Loader: Send + Sync + fmt::Debug {
    /// Load the messages for the given scope.
    ///
    /// `group == "*"` with `namespace == Some("*")` selects the JSON
    /// catch-all for the locale.
    fn load(
        &self,
        locale: &str,
        group: &str,
        namespace: Option<&str>,
    ) -> Result<Translations, LoadError>;

    /// Register a namespace and its hint path.
    fn add_namespace(&self, namespace: &str, hint: &Path);

    /// Register an additional directory holding `<locale>.json` files.
    fn add_json_path(&self, path: &Path);

    /// All registered namespaces with their hint paths.
    fn namespaces(&self) -> BTreeMap<String, PathBuf>;
}

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
};

use serde_json::Value;

use super::{
    Loader,
    WILDCARD,
};
use crate::Translations;
use crate::error::LoadError;
use crate::fs::Filesystem;
use crate::group::{
    GROUP_FILE_EXTENSION,
    JSON_FILE_EXTENSION,
    VENDOR_DIRECTORY,
};
use crate::keys::replace_recursive;

/// Loads translations from one or more lang roots.
///
/// Namespaced groups are overrides-only: a namespace resolves to
/// `<root>/vendor/<namespace>/...` once registered, and the registered hint
/// path is never read. Translations shipped inside installed packages are
/// therefore not picked up a second time next to their published copies.
#[derive(Debug)]
pub struct FileLoader {
    files: Arc<dyn Filesystem>,
    /// Lang roots, later entries override earlier ones
    paths: Vec<PathBuf>,
    json_paths: RwLock<Vec<PathBuf>>,
    hints: RwLock<BTreeMap<String, PathBuf>>,
}

impl FileLoader {
    #[must_use]
    pub fn new(files: Arc<dyn Filesystem>, path: impl Into<PathBuf>) -> Self {
        Self::with_paths(files, vec![path.into()])
    }

    #[must_use]
    pub fn with_paths(files: Arc<dyn Filesystem>, paths: Vec<PathBuf>) -> Self {
        Self {
            files,
            paths,
            json_paths: RwLock::new(Vec::new()),
            hints: RwLock::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn json_paths(&self) -> Vec<PathBuf> {
        self.json_paths.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn load_paths(&self, locale: &str, group: &str) -> Result<Translations, LoadError> {
        self.paths.iter().try_fold(Translations::new(), |output, path| {
            let full = path.join(locale).join(format!("{group}.{GROUP_FILE_EXTENSION}"));
            self.merge_group_file(output, &full)
        })
    }

    fn load_namespaced(
        &self,
        locale: &str,
        group: &str,
        namespace: &str,
    ) -> Result<Translations, LoadError> {
        let registered =
            self.hints.read().unwrap_or_else(PoisonError::into_inner).contains_key(namespace);
        if !registered {
            tracing::trace!(namespace, group, "Namespace not registered");
            return Ok(Translations::new());
        }

        self.paths.iter().try_fold(Translations::new(), |output, path| {
            let full = path
                .join(VENDOR_DIRECTORY)
                .join(namespace)
                .join(locale)
                .join(format!("{group}.{GROUP_FILE_EXTENSION}"));
            self.merge_group_file(output, &full)
        })
    }

    fn merge_group_file(&self, output: Translations, full: &Path) -> Result<Translations, LoadError> {
        if !self.files.exists(full) {
            return Ok(output);
        }
        tracing::debug!(path = %full.display(), "Loading group file");
        Ok(replace_recursive(output, self.files.get_require(full)?))
    }

    fn load_json_paths(&self, locale: &str) -> Result<Translations, LoadError> {
        let mut output = Translations::new();
        for path in self.json_paths().iter().chain(&self.paths) {
            let full = path.join(format!("{locale}.{JSON_FILE_EXTENSION}"));
            if !self.files.exists(&full) {
                continue;
            }
            tracing::debug!(path = %full.display(), "Loading JSON file");
            output.extend(read_json_file(self.files.as_ref(), &full)?);
        }
        Ok(output)
    }
}

impl Loader for FileLoader {
    fn load(
        &self,
        locale: &str,
        group: &str,
        namespace: Option<&str>,
    ) -> Result<Translations, LoadError> {
        match namespace {
            Some(WILDCARD) if group == WILDCARD => self.load_json_paths(locale),
            None | Some(WILDCARD) => self.load_paths(locale, group),
            Some(namespace) => self.load_namespaced(locale, group, namespace),
        }
    }

    fn add_namespace(&self, namespace: &str, hint: &Path) {
        self.hints
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(namespace.to_string(), hint.to_path_buf());
    }

    fn add_json_path(&self, path: &Path) {
        self.json_paths.write().unwrap_or_else(PoisonError::into_inner).push(path.to_path_buf());
    }

    fn namespaces(&self) -> BTreeMap<String, PathBuf> {
        self.hints.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Read a `<locale>.json` file, which must hold an object.
pub(crate) fn read_json_file(files: &dyn Filesystem, path: &Path) -> Result<Translations, LoadError> {
    let content =
        files.get(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    match serde_json::from_str(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(LoadError::NotAnObject { path: path.to_path_buf() }),
        Err(source) => Err(LoadError::Json { path: path.to_path_buf(), source }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::fs::LocalFilesystem;
    use crate::test_utils::write_file;

    fn loader(root: &Path) -> FileLoader {
        FileLoader::new(Arc::new(LocalFilesystem::new()), root)
    }

    #[googletest::test]
    fn test_load_group_file() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "en/messages.php", "<?php return ['welcome' => 'Hi'];");
        write_file(temp_dir.path(), "en/admin/users.php", "<?php return ['title' => 'Users'];");

        let loader = loader(temp_dir.path());

        let messages = loader.load("en", "messages", None).unwrap();
        expect_that!(messages.get("welcome"), some(eq(&json!("Hi"))));

        let users = loader.load("en", "admin/users", Some("*")).unwrap();
        expect_that!(users.get("title"), some(eq(&json!("Users"))));
    }

    #[rstest]
    #[case("nl", "messages", None)]
    #[case("en", "missing", None)]
    #[case("en", "*", Some("*"))]
    fn test_load_missing_file_is_empty(
        #[case] locale: &str,
        #[case] group: &str,
        #[case] namespace: Option<&str>,
    ) {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "en/messages.php", "<?php return ['welcome' => 'Hi'];");

        let result = loader(temp_dir.path()).load(locale, group, namespace).unwrap();

        assert!(result.is_empty());
    }

    #[googletest::test]
    fn test_load_malformed_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "en/messages.php", "<?php return ['welcome' => ];");
        write_file(temp_dir.path(), "en.json", "[\"not\", \"an object\"]");
        let loader = loader(temp_dir.path());

        expect_that!(
            matches!(loader.load("en", "messages", None), Err(LoadError::Literal { .. })),
            eq(true)
        );
        expect_that!(
            matches!(loader.load("en", "*", Some("*")), Err(LoadError::NotAnObject { .. })),
            eq(true)
        );
    }

    #[googletest::test]
    fn test_load_namespaced_requires_registration() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "vendor/acme/en/settings.php",
            "<?php return ['title' => 'Settings'];",
        );
        let package_lang = temp_dir.path().join("packages/acme/lang");
        write_file(&package_lang, "en/settings.php", "<?php return ['extra' => 'From package'];");
        let loader = loader(temp_dir.path());

        let before = loader.load("en", "settings", Some("acme")).unwrap();
        expect_that!(before.is_empty(), eq(true));

        loader.add_namespace("acme", &package_lang);
        let after = loader.load("en", "settings", Some("acme")).unwrap();

        expect_that!(after.get("title"), some(eq(&json!("Settings"))));
        // the package's own lang files are never read
        expect_that!(after.get("extra"), none());
    }

    #[googletest::test]
    fn test_load_json_merges_registered_json_paths() {
        let temp_dir = TempDir::new().unwrap();
        let extra = temp_dir.path().join("extra");
        write_file(temp_dir.path(), "lang/en.json", r#"{"Hello": "Hello", "Bye": "Bye"}"#);
        write_file(&extra, "en.json", r#"{"Hello": "Hi there", "Thanks": "Thanks"}"#);
        let loader = loader(&temp_dir.path().join("lang"));
        loader.add_json_path(&extra);

        let result = loader.load("en", "*", Some("*")).unwrap();

        // base paths are read after the registered JSON paths
        expect_that!(result.get("Hello"), some(eq(&json!("Hello"))));
        expect_that!(result.get("Bye"), some(eq(&json!("Bye"))));
        expect_that!(result.get("Thanks"), some(eq(&json!("Thanks"))));
        assert_eq!(loader.json_paths(), vec![extra]);
    }

    #[googletest::test]
    fn test_later_paths_override_earlier_paths() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first");
        let second = temp_dir.path().join("second");
        write_file(&first, "en/messages.php", "<?php return ['a' => '1', 'nested' => ['x' => '1', 'y' => '1']];");
        write_file(&second, "en/messages.php", "<?php return ['nested' => ['x' => '2']];");
        let loader = FileLoader::with_paths(Arc::new(LocalFilesystem::new()), vec![first, second]);

        let result = loader.load("en", "messages", None).unwrap();

        expect_that!(
            &Value::Object(result),
            eq(&json!({"a": "1", "nested": {"x": "2", "y": "1"}}))
        );
    }

    #[rstest]
    fn test_namespaces_returns_hints() {
        let loader = loader(Path::new("lang"));
        loader.add_namespace("acme", Path::new("packages/acme/lang"));
        loader.add_namespace("beta", Path::new("packages/beta/lang"));

        let namespaces = loader.namespaces();

        assert_eq!(namespaces.len(), 2);
        assert_eq!(namespaces.get("acme"), Some(&PathBuf::from("packages/acme/lang")));
    }
}

//! Read, save and merge workflows over the custom and default lang roots.

use std::collections::HashSet;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::Translations;
use crate::config::TranslatorSettings;
use crate::error::{
    ManagerError,
    SaveTranslationFileError,
    SerializeError,
};
use crate::fs::Filesystem;
use crate::group::{
    GROUP_FILE_EXTENSION,
    GroupIdentifier,
    JSON_FILE_EXTENSION,
    split_namespace,
};
use crate::keys::{
    flatten,
    unflatten,
};
use crate::literal;
use crate::loader::{
    Loader,
    WILDCARD,
    read_json_file,
};

/// Orchestrates reads through the loader chain and writes to the lang roots.
///
/// Edits go to the custom root (`path`); a merge writes the chained result
/// into the default root (`default_path`).
#[derive(Debug)]
pub struct ChainedTranslationManager {
    files: Arc<dyn Filesystem>,
    translation_loader: Arc<dyn Loader>,
    path: PathBuf,
    default_path: PathBuf,
    settings: TranslatorSettings,
}

impl ChainedTranslationManager {
    #[must_use]
    pub fn new(
        files: Arc<dyn Filesystem>,
        translation_loader: Arc<dyn Loader>,
        path: impl Into<PathBuf>,
        default_path: impl Into<PathBuf>,
        settings: TranslatorSettings,
    ) -> Self {
        Self {
            files,
            translation_loader,
            path: path.into(),
            default_path: default_path.into(),
            settings,
        }
    }

    /// Default lang root, where merges are written.
    #[must_use]
    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    /// List the groups found in the default lang root.
    ///
    /// Group files yield their group identifier; every JSON file yields the
    /// JSON group. Each group is listed once, in order of first appearance.
    #[must_use]
    pub fn get_translation_groups(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut groups = Vec::new();

        for file in self.files.all_files(&self.default_path) {
            let Ok(relative) = file.strip_prefix(&self.default_path) else {
                continue;
            };
            let extension = relative
                .extension()
                .and_then(|extension| extension.to_str())
                .map(str::to_ascii_lowercase);

            let group = match extension.as_deref() {
                Some(GROUP_FILE_EXTENSION) => match GroupIdentifier::from_lang_file(relative) {
                    Some(identifier) => identifier.to_string(),
                    None => {
                        tracing::debug!(path = %relative.display(), "Skipping unnamed group file");
                        continue;
                    }
                },
                Some(JSON_FILE_EXTENSION) => self.settings.json_group.clone(),
                _ => continue,
            };

            if seen.insert(group.clone()) {
                groups.push(group);
            }
        }

        tracing::debug!(count = groups.len(), "Found translation groups");
        groups
    }

    /// Resolved translations of a group through the loader chain, in
    /// dot-notation.
    ///
    /// # Errors
    /// A file in the chain cannot be read or parsed.
    pub fn get_translations_for_group(
        &self,
        locale: &str,
        group: &str,
    ) -> Result<Translations, ManagerError> {
        Ok(flatten(&self.load_resolved(locale, group)?))
    }

    /// Translations stored in the custom root for a group, as written.
    ///
    /// A group without a custom file yields an empty map.
    ///
    /// # Errors
    /// The custom file cannot be read or parsed.
    pub fn get_custom_translations(
        &self,
        locale: &str,
        group: &str,
    ) -> Result<Translations, ManagerError> {
        let path = self.group_path(locale, group, &self.path);
        if !self.files.exists(&path) {
            return Ok(Translations::new());
        }

        let translations = if self.is_json_group(group) {
            read_json_file(self.files.as_ref(), &path)?
        } else {
            self.files.get_require(&path)?
        };
        Ok(translations)
    }

    /// Set one translation in the custom root.
    ///
    /// `key` is stored as given; dotted keys are only expanded on write when
    /// `group_keys_in_array` is enabled.
    ///
    /// # Errors
    /// The custom file cannot be read, or the result cannot be written.
    pub fn save(
        &self,
        locale: &str,
        group: &str,
        key: &str,
        translation: &str,
    ) -> Result<(), ManagerError> {
        let mut translations = self.get_custom_translations(locale, group)?;
        translations.insert(key.to_string(), Value::String(translation.to_string()));

        self.save_group_translations(locale, group, &translations, &self.path)
    }

    /// Set one translation of the JSON group in the custom root.
    ///
    /// # Errors
    /// See [`Self::save`].
    pub fn save_json(&self, locale: &str, key: &str, translation: &str) -> Result<(), ManagerError> {
        self.save(locale, &self.settings.json_group, key, translation)
    }

    /// Write the chained translations of every group into the default root.
    ///
    /// Groups resolving to nothing are left alone. The custom root is only
    /// read.
    ///
    /// # Errors
    /// A file in the chain cannot be read, or a default file cannot be
    /// written.
    pub fn merge_chained_translations_into_default_translations(
        &self,
        locale: &str,
    ) -> Result<(), ManagerError> {
        self.ensure_directory(&self.default_path.join(locale))?;

        for group in self.get_translation_groups() {
            let translations = self.load_resolved(locale, &group)?;
            if translations.is_empty() {
                tracing::debug!(locale, group = %group, "Nothing to merge");
                continue;
            }
            self.save_group_translations(locale, &group, &translations, &self.default_path)?;
        }

        tracing::debug!(locale, path = %self.default_path.display(), "Merged translations");
        Ok(())
    }

    fn load_resolved(&self, locale: &str, group: &str) -> Result<Translations, ManagerError> {
        let (namespace, group) = split_namespace(group);
        let translations = if self.is_json_group(group) {
            self.translation_loader.load(locale, WILDCARD, Some(WILDCARD))?
        } else {
            self.translation_loader.load(locale, group, namespace)?
        };
        Ok(translations)
    }

    fn save_group_translations(
        &self,
        locale: &str,
        group: &str,
        translations: &Translations,
        root: &Path,
    ) -> Result<(), ManagerError> {
        let path = self.group_path(locale, group, root);

        let encoded = if self.is_json_group(group) {
            encode_json(translations)
        } else if self.settings.group_keys_in_array {
            literal::render_file(&unflatten(translations)).map_err(SerializeError::from)
        } else {
            literal::render_file(translations).map_err(SerializeError::from)
        };
        let contents = encoded
            .map_err(|source| SaveTranslationFileError::Serialize { path: path.clone(), source })?;

        if let Some(parent) = path.parent() {
            self.ensure_directory(parent)?;
        }
        self.files
            .put(&path, &contents)
            .map_err(|source| SaveTranslationFileError::Write { path: path.clone(), source })?;
        self.files.invalidate(&path);

        tracing::debug!(path = %path.display(), "Saved translation file");
        Ok(())
    }

    fn group_path(&self, locale: &str, group: &str, root: &Path) -> PathBuf {
        if self.is_json_group(group) {
            return root.join(format!("{locale}.{JSON_FILE_EXTENSION}"));
        }
        GroupIdentifier::parse(group).path_in(root, locale)
    }

    fn is_json_group(&self, group: &str) -> bool {
        group == self.settings.json_group
    }

    fn ensure_directory(&self, path: &Path) -> Result<(), ManagerError> {
        if self.files.exists(path) {
            return Ok(());
        }
        tracing::debug!(path = %path.display(), "Creating directory");
        self.files
            .make_directory(path)
            .map_err(|source| ManagerError::CreateDirectory { path: path.to_path_buf(), source })
    }
}

/// Key-sorted JSON with a 4-space indent and a trailing newline.
fn encode_json(translations: &Translations) -> Result<String, SerializeError> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    translations.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::{
        register,
        translations,
        write_file,
    };

    fn manager(app_root: &Path) -> Arc<ChainedTranslationManager> {
        register(app_root, &TranslatorSettings::default()).manager
    }

    #[googletest::test]
    fn test_get_translation_groups() {
        let temp_dir = TempDir::new().unwrap();
        let lang = temp_dir.path().join("lang");
        write_file(&lang, "en/messages.php", "<?php return [];");
        write_file(&lang, "en/vendor/acme/settings.php", "<?php return [];");
        write_file(&lang, "en.json", "{}");
        write_file(&lang, "nl.json", "{}");
        write_file(&lang, "nl/messages.php", "<?php return [];");
        write_file(&lang, "nl/admin/users.php", "<?php return [];");
        write_file(&lang, "vendor/beta/en/auth.PHP", "<?php return [];");
        write_file(&lang, "en/README.md", "");

        let groups = manager(temp_dir.path()).get_translation_groups();

        expect_that!(
            groups,
            elements_are![
                eq("messages"),
                eq("acme::settings"),
                eq("json-file"),
                eq("admin/users"),
                eq("beta::auth")
            ]
        );
    }

    #[rstest]
    fn test_get_translation_groups_missing_lang_directory() {
        let temp_dir = TempDir::new().unwrap();

        assert!(manager(temp_dir.path()).get_translation_groups().is_empty());
    }

    #[googletest::test]
    fn test_get_translations_for_group_is_chained_and_flat() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "lang/en/auth.php",
            "<?php return ['failed' => 'Wrong', 'errors' => ['throttle' => 'Slow']];",
        );
        write_file(temp_dir.path(), "lang-custom/en/auth.php", "<?php return ['failed' => 'Nope'];");
        write_file(temp_dir.path(), "lang/en.json", r#"{"Hello": "Hello"}"#);
        write_file(temp_dir.path(), "lang-custom/en.json", r#"{"Hello": "Hi"}"#);
        let manager = manager(temp_dir.path());

        let auth = manager.get_translations_for_group("en", "auth").unwrap();
        expect_that!(
            &Value::Object(auth),
            eq(&json!({"errors.throttle": "Slow", "failed": "Nope"}))
        );

        let json_group = manager.get_translations_for_group("en", "json-file").unwrap();
        expect_that!(json_group.get("Hello"), some(eq(&json!("Hi"))));
    }

    #[googletest::test]
    fn test_get_translations_for_namespaced_group() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "lang/vendor/acme/en/settings.php",
            "<?php return ['title' => 'Settings', 'save' => 'Save'];",
        );
        write_file(
            temp_dir.path(),
            "lang-custom/vendor/acme/en/settings.php",
            "<?php return ['title' => 'Preferences'];",
        );
        let settings = TranslatorSettings {
            namespaces: [("acme".to_string(), PathBuf::from("packages/acme/lang"))].into(),
            ..TranslatorSettings::default()
        };
        let manager = register(temp_dir.path(), &settings).manager;

        let result = manager.get_translations_for_group("en", "acme::settings").unwrap();

        expect_that!(
            &Value::Object(result),
            eq(&json!({"save": "Save", "title": "Preferences"}))
        );
    }

    #[rstest]
    #[case("messages")]
    #[case("json-file")]
    #[case("acme::admin/users")]
    fn test_get_custom_translations_missing_file_is_empty(#[case] group: &str) {
        let temp_dir = TempDir::new().unwrap();

        let result = manager(temp_dir.path()).get_custom_translations("en", group).unwrap();

        assert!(result.is_empty());
    }

    #[googletest::test]
    fn test_save_then_get_custom_translations() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());

        manager.save("en", "admin/users", "title", "Users").unwrap();
        manager.save("en", "admin/users", "form.name", "Name").unwrap();

        let result = manager.get_custom_translations("en", "admin/users").unwrap();
        expect_that!(
            &Value::Object(result),
            eq(&json!({"form.name": "Name", "title": "Users"}))
        );

        let written = fs::read_to_string(temp_dir.path().join("lang-custom/en/admin/users.php"))
            .unwrap();
        assert_eq!(
            written,
            "<?php\n\nreturn [\n    'form.name' => 'Name',\n    'title' => 'Users'\n];\n"
        );
    }

    #[googletest::test]
    fn test_save_groups_keys_in_array() {
        let temp_dir = TempDir::new().unwrap();
        let settings =
            TranslatorSettings { group_keys_in_array: true, ..TranslatorSettings::default() };
        let manager = register(temp_dir.path(), &settings).manager;

        manager.save("en", "messages", "form.name", "Name").unwrap();
        manager.save("en", "messages", "form.email", "Email").unwrap();
        manager.save("en", "messages", "Hello. World", "Sentence").unwrap();

        let result = manager.get_custom_translations("en", "messages").unwrap();
        expect_that!(
            &Value::Object(result),
            eq(&json!({"Hello. World": "Sentence", "form": {"email": "Email", "name": "Name"}}))
        );
    }

    #[googletest::test]
    fn test_save_json_writes_sorted_pretty_json() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());

        manager.save_json("nl", "Welcome", "Welkom").unwrap();
        manager.save_json("nl", "Bye", "Dag").unwrap();

        let written = fs::read_to_string(temp_dir.path().join("lang-custom/nl.json")).unwrap();
        assert_eq!(written, "{\n    \"Bye\": \"Dag\",\n    \"Welcome\": \"Welkom\"\n}\n");

        let result = manager.get_custom_translations("nl", "json-file").unwrap();
        expect_that!(result.get("Welcome"), some(eq(&json!("Welkom"))));
    }

    #[googletest::test]
    fn test_save_is_visible_through_chain_immediately() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "lang/en/messages.php", "<?php return ['welcome' => 'Hi'];");
        let manager = manager(temp_dir.path());

        manager.save("en", "messages", "welcome", "Hello").unwrap();
        let first = manager.get_translations_for_group("en", "messages").unwrap();
        manager.save("en", "messages", "welcome", "Hey").unwrap();
        let second = manager.get_translations_for_group("en", "messages").unwrap();

        expect_that!(&first["welcome"], eq(&json!("Hello")));
        expect_that!(&second["welcome"], eq(&json!("Hey")));
    }

    #[googletest::test]
    fn test_merge_writes_chained_translations_into_default() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "lang/en/messages.php",
            "<?php return ['welcome' => 'Hi', 'bye' => 'Bye'];",
        );
        write_file(temp_dir.path(), "lang/en.json", r#"{"Hello": "Hello"}"#);
        let custom_messages = write_file(
            temp_dir.path(),
            "lang-custom/en/messages.php",
            "<?php return ['welcome' => 'Hello'];",
        );
        write_file(temp_dir.path(), "lang-custom/en.json", r#"{"Hello": "Hi there"}"#);
        let custom_before = fs::read_to_string(&custom_messages).unwrap();
        let manager = manager(temp_dir.path());

        manager.merge_chained_translations_into_default_translations("en").unwrap();

        let messages = fs::read_to_string(temp_dir.path().join("lang/en/messages.php")).unwrap();
        assert_eq!(
            messages,
            "<?php\n\nreturn [\n    'bye' => 'Bye',\n    'welcome' => 'Hello'\n];\n"
        );
        let json = fs::read_to_string(temp_dir.path().join("lang/en.json")).unwrap();
        assert_eq!(json, "{\n    \"Hello\": \"Hi there\"\n}\n");
        assert_eq!(fs::read_to_string(&custom_messages).unwrap(), custom_before);
    }

    #[googletest::test]
    fn test_merge_skips_groups_without_translations_for_locale() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "lang/en/messages.php", "<?php return ['welcome' => 'Hi'];");
        let manager = manager(temp_dir.path());

        manager.merge_chained_translations_into_default_translations("nl").unwrap();

        expect_that!(temp_dir.path().join("lang/nl").is_dir(), eq(true));
        expect_that!(temp_dir.path().join("lang/nl/messages.php").exists(), eq(false));
    }

    #[rstest]
    fn test_merge_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write_file(
            temp_dir.path(),
            "lang/en/messages.php",
            "<?php return array('nested' => array('a' => 'A', 'b' => 'B'), 'x' => 'X');",
        );
        write_file(temp_dir.path(), "lang-custom/en/messages.php", "<?php return ['nested' => ['b' => 'b']];");
        let manager = manager(temp_dir.path());
        let target = temp_dir.path().join("lang/en/messages.php");

        manager.merge_chained_translations_into_default_translations("en").unwrap();
        let first = fs::read(&target).unwrap();
        manager.merge_chained_translations_into_default_translations("en").unwrap();
        let second = fs::read(&target).unwrap();

        assert_eq!(first, second);
        let merged = literal::parse(&String::from_utf8(second).unwrap()).unwrap();
        assert_eq!(Value::Object(merged), json!({"nested": {"a": "A", "b": "b"}, "x": "X"}));
    }

    #[rstest]
    fn test_save_reports_write_failure_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let manager = manager(temp_dir.path());
        // a file where the locale directory should go
        write_file(temp_dir.path(), "lang-custom/en", "");

        let result = manager.save("en", "messages", "welcome", "Hello");

        match result {
            Err(ManagerError::Save(error @ SaveTranslationFileError::Write { .. })) => {
                assert_eq!(error.path(), &temp_dir.path().join("lang-custom/en/messages.php"));
            }
            other => panic!("expected a write error, got {other:?}"),
        }
    }

    #[rstest]
    fn test_encode_json_keeps_unicode() {
        let encoded = encode_json(&translations(json!({"ü": "Grüße"}))).unwrap();

        assert_eq!(encoded, "{\n    \"ü\": \"Grüße\"\n}\n");
    }
}

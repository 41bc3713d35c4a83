//! Translation group identifiers
//!
//! A group names one lang file. It may carry a namespace prefix
//! (`acme::settings`) and subfolders (`admin/users`); both map onto the
//! directory layout of a lang root.

use std::fmt;
use std::path::{
    Component,
    Path,
    PathBuf,
};

/// Separates the namespace from the rest of a group identifier.
pub const NAMESPACE_SEPARATOR: &str = "::";
/// Separates subfolders from the leaf group name.
pub const PATH_SEPARATOR: char = '/';
/// Directory holding namespaced groups inside a lang root.
pub const VENDOR_DIRECTORY: &str = "vendor";
/// Extension of per-group structured-data files.
pub const GROUP_FILE_EXTENSION: &str = "php";
/// Extension of per-locale catch-all files.
pub const JSON_FILE_EXTENSION: &str = "json";

/// Parsed form of a group identifier such as `acme::admin/users`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupIdentifier {
    pub namespace: Option<String>,
    pub subfolders: Option<String>,
    pub name: String,
}

impl GroupIdentifier {
    /// Parse a group identifier.
    ///
    /// The namespace is split off first, at the first `::`. Subfolders are
    /// split off the remainder at the last `/`. Empty parts count as absent.
    ///
    /// # Examples
    /// ```
    /// use chained_translator::group::GroupIdentifier;
    ///
    /// let group = GroupIdentifier::parse("acme::admin/users");
    /// assert_eq!(group.namespace.as_deref(), Some("acme"));
    /// assert_eq!(group.subfolders.as_deref(), Some("admin"));
    /// assert_eq!(group.name, "users");
    /// ```
    #[must_use]
    pub fn parse(group: &str) -> Self {
        let (namespace, rest) = split_namespace(group);
        let (subfolders, name) = match rest.rsplit_once(PATH_SEPARATOR) {
            Some((subfolders, name)) => (non_empty(subfolders), name),
            None => (None, rest),
        };
        Self {
            namespace: namespace.map(str::to_string),
            subfolders: subfolders.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Derive the group of a structured-data file from its path relative to
    /// a lang root.
    ///
    /// - `en/messages.php` -> `messages`
    /// - `en/admin/users.php` -> `admin/users`
    /// - `vendor/acme/en/settings.php` -> `acme::settings`
    ///
    /// Returns `None` when the path has no usable file stem, or when a
    /// `vendor` directory is not followed by a namespace.
    #[must_use]
    pub fn from_lang_file(relative_path: &Path) -> Option<Self> {
        let name = relative_path.file_stem()?.to_str()?.to_string();
        let directories: Vec<&str> = relative_path
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|component| match component {
                        Component::Normal(segment) => segment.to_str(),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let (namespace, nested) =
            match directories.iter().position(|segment| *segment == VENDOR_DIRECTORY) {
                Some(index) => {
                    let mut after_vendor = directories.iter().skip(index + 1);
                    let namespace = after_vendor.next()?;
                    // the segment after the namespace is the locale
                    (Some((*namespace).to_string()), after_vendor.skip(1).copied().collect())
                }
                None => (None, directories.iter().skip(1).copied().collect::<Vec<_>>()),
            };

        let subfolders = nested.join("/");
        Some(Self { namespace, subfolders: non_empty(&subfolders).map(str::to_string), name })
    }

    /// Group without its namespace, as loaders expect it (`admin/users`).
    #[must_use]
    pub fn group(&self) -> String {
        match &self.subfolders {
            Some(subfolders) => format!("{subfolders}{PATH_SEPARATOR}{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Directory holding this group's file for `locale` under `root`:
    /// `<root>[/vendor/<namespace>]/<locale>[/<subfolders>]`.
    #[must_use]
    pub fn directory_in(&self, root: &Path, locale: &str) -> PathBuf {
        let mut directory = root.to_path_buf();
        if let Some(namespace) = &self.namespace {
            directory.push(VENDOR_DIRECTORY);
            directory.push(namespace);
        }
        directory.push(locale);
        if let Some(subfolders) = &self.subfolders {
            directory.extend(subfolders.split(PATH_SEPARATOR));
        }
        directory
    }

    /// Full path of this group's file for `locale` under `root`.
    #[must_use]
    pub fn path_in(&self, root: &Path, locale: &str) -> PathBuf {
        self.directory_in(root, locale).join(format!("{}.{GROUP_FILE_EXTENSION}", self.name))
    }
}

impl fmt::Display for GroupIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{namespace}{NAMESPACE_SEPARATOR}")?;
        }
        f.write_str(&self.group())
    }
}

/// Split a group identifier at the first `::`.
///
/// Returns the namespace (if any, and non-empty) and the remaining group.
#[must_use]
pub fn split_namespace(group: &str) -> (Option<&str>, &str) {
    match group.split_once(NAMESPACE_SEPARATOR) {
        Some((namespace, rest)) => (non_empty(namespace), rest),
        None => (None, group),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

//! Filesystem capability used by the loaders and the manager.

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Mutex,
    MutexGuard,
    PoisonError,
};
use std::time::SystemTime;
use std::{
    fmt,
    fs,
    io,
};

use ignore::WalkBuilder;

use crate::Translations;
use crate::error::LoadError;
use crate::literal;

/// File operations the translation store needs.
pub trait Filesystem: Send + Sync + fmt::Debug {
    fn exists(&self, path: &Path) -> bool;

    fn get(&self, path: &Path) -> io::Result<String>;

    /// Read and evaluate a structured-data group file.
    fn get_require(&self, path: &Path) -> Result<Translations, LoadError>;

    fn put(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Create `path` and any missing parents.
    fn make_directory(&self, path: &Path) -> io::Result<()>;

    /// Every file below `directory`, recursively, sorted by file name per
    /// directory. A missing directory yields an empty list.
    fn all_files(&self, directory: &Path) -> Vec<PathBuf>;

    /// Drop any cached evaluation of `path`.
    fn invalidate(&self, path: &Path);
}

/// Evaluated group file, valid while the file's mtime is unchanged.
#[derive(Debug, Clone)]
struct CompiledFile {
    modified: SystemTime,
    translations: Translations,
}

/// [`Filesystem`] backed by the local disk.
///
/// Evaluated group files are cached per path. A write must be followed by
/// [`Filesystem::invalidate`], since a rewrite within the mtime resolution
/// would otherwise be served stale.
#[derive(Debug, Default)]
pub struct LocalFilesystem {
    compiled: Mutex<HashMap<PathBuf, CompiledFile>>,
}

impl LocalFilesystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn compiled(&self) -> MutexGuard<'_, HashMap<PathBuf, CompiledFile>> {
        self.compiled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn is_cached(&self, path: &Path) -> bool {
        self.compiled().contains_key(path)
    }
}

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn get(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn get_require(&self, path: &Path) -> Result<Translations, LoadError> {
        let modified = fs::metadata(path).and_then(|metadata| metadata.modified()).ok();

        if let Some(modified) = modified {
            let compiled = self.compiled();
            if let Some(cached) = compiled.get(path)
                && cached.modified == modified
            {
                tracing::trace!(path = %path.display(), "Using cached group file");
                return Ok(cached.translations.clone());
            }
        }

        let source = fs::read_to_string(path)
            .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        let translations = literal::parse(&source)
            .map_err(|source| LoadError::Literal { path: path.to_path_buf(), source })?;

        if let Some(modified) = modified {
            self.compiled().insert(
                path.to_path_buf(),
                CompiledFile { modified, translations: translations.clone() },
            );
        }

        Ok(translations)
    }

    fn put(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn make_directory(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn all_files(&self, directory: &Path) -> Vec<PathBuf> {
        if !directory.is_dir() {
            tracing::debug!(directory = %directory.display(), "Lang directory not found");
            return Vec::new();
        }

        let mut files = Vec::new();
        for result in WalkBuilder::new(directory)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if entry.file_type().is_some_and(|ft| ft.is_file()) {
                files.push(entry.into_path());
            }
        }
        files
    }

    fn invalidate(&self, path: &Path) {
        self.compiled().remove(path);
    }
}

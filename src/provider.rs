//! Wires the loaders and the manager for an application root.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use crate::config::TranslatorSettings;
use crate::error::{
    ManagerError,
    SaveTranslationFileError,
};
use crate::fs::Filesystem;
use crate::loader::{
    ChainLoader,
    FileLoader,
    Loader,
};
use crate::manager::ChainedTranslationManager;

/// Contents of the `.gitignore` written into a new custom lang directory.
pub const CUSTOM_LANG_GITIGNORE: &str = "*\n!.gitignore\n";

/// The assembled translation stack.
///
/// The chain is `[custom, default]`, so custom translations override the
/// defaults.
#[derive(Debug, Clone)]
pub struct TranslatorServices {
    pub custom_lang_path: PathBuf,
    pub lang_path: PathBuf,
    pub custom_loader: Arc<FileLoader>,
    pub default_loader: Arc<FileLoader>,
    pub loader: Arc<ChainLoader>,
    pub manager: Arc<ChainedTranslationManager>,
}

impl TranslatorServices {
    /// Build the stack for `app_root`.
    ///
    /// Creates the custom lang directory when it does not exist yet, with a
    /// `.gitignore` if configured. The default lang directory is never
    /// created here.
    ///
    /// # Errors
    /// The custom directory or its `.gitignore` cannot be written.
    pub fn register(
        app_root: &Path,
        settings: &TranslatorSettings,
        files: Arc<dyn Filesystem>,
    ) -> Result<Self, ManagerError> {
        let custom_lang_path = app_root.join(&settings.custom_lang_directory_name);
        let lang_path = app_root.join(&settings.lang_directory_name);

        if !files.exists(&custom_lang_path) {
            create_custom_lang_directory(files.as_ref(), &custom_lang_path, settings)?;
        }

        let custom_loader = Arc::new(FileLoader::new(Arc::clone(&files), &custom_lang_path));
        let default_loader = Arc::new(FileLoader::new(Arc::clone(&files), &lang_path));

        let mut chain = ChainLoader::new();
        chain.add_loader(custom_loader.clone(), false);
        chain.add_loader(default_loader.clone(), false);
        for (namespace, hint) in &settings.namespaces {
            chain.add_namespace(namespace, &app_root.join(hint));
        }
        let loader = Arc::new(chain);

        let manager = Arc::new(ChainedTranslationManager::new(
            files,
            loader.clone(),
            &custom_lang_path,
            &lang_path,
            settings.clone(),
        ));

        tracing::debug!(
            custom = %custom_lang_path.display(),
            default = %lang_path.display(),
            "Registered translation services"
        );

        Ok(Self { custom_lang_path, lang_path, custom_loader, default_loader, loader, manager })
    }
}

fn create_custom_lang_directory(
    files: &dyn Filesystem,
    path: &Path,
    settings: &TranslatorSettings,
) -> Result<(), ManagerError> {
    tracing::info!(path = %path.display(), "Creating custom lang directory");
    files
        .make_directory(path)
        .map_err(|source| ManagerError::CreateDirectory { path: path.to_path_buf(), source })?;

    if settings.add_gitignore_to_custom_lang_directory {
        let gitignore = path.join(".gitignore");
        files
            .put(&gitignore, CUSTOM_LANG_GITIGNORE)
            .map_err(|source| SaveTranslationFileError::Write { path: gitignore, source })?;
    }
    Ok(())
}

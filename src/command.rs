//! Console commands.

use crate::error::ManagerError;
use crate::manager::ChainedTranslationManager;

/// Merge the chained translations of `locale` into the default lang root.
///
/// Returns `Ok(false)` when a translation file could not be saved; the
/// failure is logged. Read failures are returned as errors.
///
/// # Errors
/// A file in the chain cannot be read or parsed, or a directory cannot be
/// created.
pub fn merge_translations(
    manager: &ChainedTranslationManager,
    locale: &str,
) -> Result<bool, ManagerError> {
    match manager.merge_chained_translations_into_default_translations(locale) {
        Ok(()) => {
            tracing::info!(
                locale,
                path = %manager.default_path().display(),
                "The translations are merged into the default lang directory"
            );
            Ok(true)
        }
        Err(ManagerError::Save(error)) => {
            tracing::error!(locale, path = %error.path().display(), %error, "Could not save the merged translations");
            Ok(false)
        }
        Err(error) => Err(error),
    }
}

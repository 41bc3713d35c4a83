//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    ConfigError,
    TranslatorSettings,
};

/// 設定ファイル名（アプリケーションルート直下）
pub const CONFIG_FILE_NAME: &str = ".chained-translator.json";

/// アプリケーションルートから設定を読み込む
///
/// `.chained-translator.json` ファイルを探して読み込む
///
/// # Returns
/// - `Ok(Some(settings))`: 設定ファイルが見つかり、読み込みに成功
/// - `Ok(None)`: 設定ファイルが見つからない
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub(super) fn load_from_app_root(
    app_root: &Path,
) -> Result<Option<TranslatorSettings>, ConfigError> {
    let config_path = app_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "Configuration file not found");
        return Ok(None);
    }

    tracing::debug!(path = %config_path.display(), "Loading configuration");

    let content = std::fs::read_to_string(&config_path)?;
    let settings: TranslatorSettings = serde_json::from_str(&content)?;

    Ok(Some(settings))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    /// `load_from_app_root`: 設定ファイルが存在する場合
    #[rstest]
    fn test_load_from_app_root_with_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"json_group": "strings"}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let result = load_from_app_root(temp_dir.path());

        assert!(result.is_ok());
        let settings = result.unwrap();
        assert!(settings.is_some());
        assert_eq!(settings.unwrap().json_group, "strings");
    }

    /// `load_from_app_root`: 設定ファイルが存在しない場合
    #[rstest]
    fn test_load_from_app_root_no_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_app_root(temp_dir.path());

        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    /// `load_from_app_root`: JSON パースエラー
    #[rstest]
    fn test_load_from_app_root_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "invalid json").unwrap();

        let result = load_from_app_root(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}

//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    TranslatorSettings,
    loader,
};

/// アプリケーションルートとその設定を保持する
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: TranslatorSettings,

    /// アプリケーションのルートパス
    app_root: PathBuf,
}

impl ConfigManager {
    /// `app_root` の設定を読み込む
    ///
    /// 設定ファイルがなければデフォルト値を使う。
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load(app_root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let app_root = app_root.into();
        tracing::debug!(app_root = %app_root.display(), "Loading settings");

        let settings = loader::load_from_app_root(&app_root)?.map_or_else(
            TranslatorSettings::default,
            |loaded| {
                tracing::debug!(?loaded, "Loaded app settings");
                loaded
            },
        );

        // バリデーション
        settings.validate().map_err(ConfigError::ValidationErrors)?;
        tracing::debug!(?settings, "Settings loaded successfully");

        Ok(Self { current_settings: settings, app_root })
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &TranslatorSettings {
        &self.current_settings
    }

    /// アプリケーションルートを取得
    #[must_use]
    pub fn app_root(&self) -> &Path {
        &self.app_root
    }
}

//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use serde_json::{
    Map,
    Value,
};

use crate::Translations;
use crate::config::TranslatorSettings;
use crate::fs::{
    Filesystem,
    LocalFilesystem,
};
use crate::provider::TranslatorServices;

/// JSON オブジェクトを `Translations` に変換する（オブジェクト以外は空）
pub(crate) fn translations(value: Value) -> Translations {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// ルートからの相対パスにファイルを書き込む（親ディレクトリも作成）
pub(crate) fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// アプリケーションルートにサービス一式を構築する
pub(crate) fn register(app_root: &Path, settings: &TranslatorSettings) -> TranslatorServices {
    let files: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
    TranslatorServices::register(app_root, settings, files).unwrap()
}

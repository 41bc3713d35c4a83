//! chained-translator
//!
//! カスタム翻訳ディレクトリをデフォルトの翻訳より優先させる翻訳オーバーライド層。
//! ローダーチェーン、ドット記法への変換、翻訳ファイルの保存とマージを提供する。

pub mod command;
pub mod config;
pub mod error;
pub mod fs;
pub mod group;
pub mod keys;
pub mod literal;
pub mod loader;
pub mod manager;
pub mod provider;

mod test_utils;

pub use error::{
    LoadError,
    ManagerError,
    SaveTranslationFileError,
};
pub use loader::{
    ChainLoader,
    FileLoader,
    Loader,
};
pub use manager::ChainedTranslationManager;
pub use provider::TranslatorServices;

/// Translation tree or its dot-notation projection, keys always sorted.
pub type Translations = serde_json::Map<String, serde_json::Value>;

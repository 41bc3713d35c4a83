//! Error types shared by the loaders and the manager.

use std::path::PathBuf;
use std::string::FromUtf8Error;
use std::{
    fmt,
    io,
};

use thiserror::Error;

use crate::literal::ParseError;

/// Raised when a translation file exists but cannot be read into a map.
///
/// A missing file is never an error; loaders return an empty map instead.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read translation file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse translation file {}: {source}", .path.display())]
    Literal {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to parse JSON translation file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON translation file {} does not contain an object", .path.display())]
    NotAnObject { path: PathBuf },
}

/// Why translations could not be turned into file contents.
#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("Failed to write the array literal: {0}")]
    Literal(#[from] fmt::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encoded JSON is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Raised when a translation file could not be written.
#[derive(Error, Debug)]
pub enum SaveTranslationFileError {
    #[error("The translations could not be transformed to the translation file {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: SerializeError,
    },

    #[error("The translation file {} could not be saved: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SaveTranslationFileError {
    /// Path of the file that was being written.
    #[must_use]
    pub const fn path(&self) -> &PathBuf {
        match self {
            Self::Serialize { path, .. } | Self::Write { path, .. } => path,
        }
    }
}

/// Errors surfaced by [`crate::manager::ChainedTranslationManager`].
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Save(#[from] SaveTranslationFileError),

    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

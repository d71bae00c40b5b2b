//! # Bag Errors
//!
//! Every failure during a build aborts the whole build: no archive is
//! persisted for a partially staged tree. Verification problems inside a
//! readable archive are not errors; they are collected in a
//! [`BagReport`](crate::verify::BagReport).

use std::path::PathBuf;

use datapack_rdf::SerializationError;
use thiserror::Error;

/// Errors from building, reading, or configuring bags.
#[derive(Error, Debug)]
pub enum BagError {
    /// The staging directory could not be created.
    #[error("cannot create staging directory under {}: {source}", path.display())]
    Staging {
        /// Parent directory of the attempted staging tree.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A member references an external file that does not exist.
    #[error("member {id:?} references missing file {}", path.display())]
    MissingFile {
        /// Member identifier.
        id: String,
        /// The absent file.
        path: PathBuf,
    },

    /// Reading, copying, writing, or digesting a file failed.
    #[error("io error at {}: {source}", path.display())]
    Io {
        /// The file being processed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Two payload files would land on the same path under `data/`.
    #[error("payload path {path} claimed by both {first:?} and {second:?}")]
    DuplicatePayloadPath {
        /// Relative payload path.
        path: String,
        /// Identifier that claimed the path first.
        first: String,
        /// Identifier that collided with it.
        second: String,
    },

    /// Rendering the resource map failed.
    #[error("resource map serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    /// The zip writer or reader failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Configuration could not be loaded or holds an invalid value.
    #[error("configuration error: {0}")]
    Config(String),

    /// An archive is not a readable bag at all.
    #[error("not a bag: {0}")]
    Verification(String),
}

impl BagError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> BagError {
        let path = path.into();
        move |source| BagError::Io { path, source }
    }
}

/// Convenience alias for bag results.
pub type BagResult<T> = Result<T, BagError>;

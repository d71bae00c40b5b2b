//! # Package Members
//!
//! A [`Member`] is one content unit tracked by a package: an identifier
//! plus exactly one content source, either bytes held in memory or a path
//! to a file on disk. The byte store behind a member is an external
//! collaborator; [`MemberContent`] is the contract the archive builder
//! consumes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ValidationError;

/// Contract consumed by the archive builder for reading member content.
pub trait MemberContent {
    /// The member's unique identifier.
    fn identifier(&self) -> &str;

    /// Whether the content lives in an external file.
    fn has_external_file(&self) -> bool {
        self.external_path().is_some()
    }

    /// Path to the external file, when the member is file-backed.
    fn external_path(&self) -> Option<&Path>;

    /// Read the member's full content.
    fn read_bytes(&self) -> io::Result<Vec<u8>>;
}

/// Where a member's bytes come from. Exactly one source per member.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ContentSource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// One content-bearing member of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: String,
    source: ContentSource,
}

impl Member {
    /// Create a member backed by in-memory bytes.
    pub fn from_bytes(id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Result<Self, ValidationError> {
        Self::new(id, ContentSource::Bytes(bytes.into()))
    }

    /// Create a member backed by an external file.
    ///
    /// The file is not touched here; a missing file surfaces when the
    /// member is read or packaged.
    pub fn from_file(id: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, ValidationError> {
        Self::new(id, ContentSource::File(path.into()))
    }

    fn new(id: impl Into<String>, source: ContentSource) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier);
        }
        if id.chars().any(char::is_control) {
            return Err(ValidationError::ControlCharacter { value: id });
        }
        Ok(Self { id, source })
    }

    /// The member's identifier.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl MemberContent for Member {
    fn identifier(&self) -> &str {
        &self.id
    }

    fn external_path(&self) -> Option<&Path> {
        match &self.source {
            ContentSource::File(path) => Some(path),
            ContentSource::Bytes(_) => None,
        }
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            ContentSource::Bytes(bytes) => Ok(bytes.clone()),
            ContentSource::File(path) => fs::read(path),
        }
    }
}

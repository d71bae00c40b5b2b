//! # Error Types
//!
//! Validation errors shared by every datapack crate. Crates with I/O or
//! rendering failures define their own `thiserror` enums on top of
//! [`ValidationError`].
//!
//! ## Design
//!
//! - Validation errors abort only the offending call and carry the
//!   rejected value so callers can report it verbatim.
//! - Lookups of unknown identifiers never produce an error; they return
//!   `Option` or `bool`.

use thiserror::Error;

/// A relationship or member was rejected before insertion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Subject node type outside `{uri, blank}`.
    #[error("invalid subject node type {value:?}: expected one of uri, blank")]
    InvalidSubjectType {
        /// The rejected node type label.
        value: String,
    },

    /// Object node type outside `{uri, literal, blank}`.
    #[error("invalid object node type {value:?}: expected one of uri, literal, blank")]
    InvalidObjectType {
        /// The rejected node type label.
        value: String,
    },

    /// A relationship was inserted without a predicate IRI.
    #[error("predicate IRI must not be empty")]
    EmptyPredicate,

    /// A member or package identifier was empty.
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// A member identifier contained a line break or other control
    /// character, which cannot be written to a line-oriented tag file.
    #[error("identifier {value:?} contains a control character")]
    ControlCharacter {
        /// The rejected identifier.
        value: String,
    },
}

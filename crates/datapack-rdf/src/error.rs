//! Serialization error types.

use thiserror::Error;

/// Errors raised while rendering a resource map graph.
///
/// A failed serialization produces no output; the graph is untouched.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// The requested syntax name is not one of the supported writers.
    #[error("unsupported serialization syntax {name:?}: expected one of rdfxml, json, ntriples, turtle, dot")]
    UnsupportedSyntax {
        /// The rejected syntax name.
        name: String,
    },

    /// The XML writer failed.
    #[error("RDF/XML writer error: {0}")]
    Xml(String),

    /// The JSON writer failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the rendered bytes failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SerializationError {
    /// Whether the failure is caller input that will never succeed on retry.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnsupportedSyntax { .. })
    }
}

/// Result type alias for serialization.
pub type SerializationResult<T> = Result<T, SerializationError>;

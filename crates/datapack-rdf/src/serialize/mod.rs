//! # Resource Map Serialization
//!
//! Renders a [`Graph`] in one of five syntaxes. Every writer is a pure
//! function of (graph, options): identical input yields byte-identical
//! output, with no timestamps or generated ids of its own.
//!
//! | name | MIME type | notes |
//! |---|---|---|
//! | `rdfxml` | `application/rdf+xml` | default; the form accepted for repository upload |
//! | `json` | `application/json` | RDF/JSON, keys sorted |
//! | `ntriples` | `application/n-triples` | no prefixes |
//! | `turtle` | `text/turtle` | `@prefix` declarations from the namespace table |
//! | `dot` | `text/x-graphviz` | Graphviz digraph |

mod dot;
mod json;
mod ntriples;
mod rdfxml;
mod turtle;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SerializationError, SerializationResult};
use crate::graph::Graph;
use crate::vocab::Namespaces;

/// A supported output syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// RDF/XML.
    #[default]
    RdfXml,
    /// RDF/JSON.
    Json,
    /// N-Triples.
    NTriples,
    /// Turtle.
    Turtle,
    /// Graphviz DOT.
    Dot,
}

impl Syntax {
    /// All syntaxes, in documentation order.
    pub const ALL: [Syntax; 5] = [
        Syntax::RdfXml,
        Syntax::Json,
        Syntax::NTriples,
        Syntax::Turtle,
        Syntax::Dot,
    ];

    /// Short syntax name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RdfXml => "rdfxml",
            Self::Json => "json",
            Self::NTriples => "ntriples",
            Self::Turtle => "turtle",
            Self::Dot => "dot",
        }
    }

    /// Associated MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::RdfXml => "application/rdf+xml",
            Self::Json => "application/json",
            Self::NTriples => "application/n-triples",
            Self::Turtle => "text/turtle",
            Self::Dot => "text/x-graphviz",
        }
    }

    /// W3C format IRI, where one exists.
    pub fn syntax_uri(&self) -> Option<&'static str> {
        match self {
            Self::RdfXml => Some("http://www.w3.org/ns/formats/RDF_XML"),
            Self::Json => Some("http://www.w3.org/ns/formats/RDF_JSON"),
            Self::NTriples => Some("http://www.w3.org/ns/formats/N-Triples"),
            Self::Turtle => Some("http://www.w3.org/ns/formats/Turtle"),
            Self::Dot => None,
        }
    }

    /// Conventional file extension, without the dot.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::RdfXml => "rdf",
            Self::Json => "json",
            Self::NTriples => "nt",
            Self::Turtle => "ttl",
            Self::Dot => "dot",
        }
    }

    /// Look up a syntax by short name.
    pub fn from_name(name: &str) -> SerializationResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| SerializationError::UnsupportedSyntax {
                name: name.to_string(),
            })
    }

    /// Look up a syntax by MIME type.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let mime = mime.split(';').next().unwrap_or_default().trim();
        Self::ALL.into_iter().find(|s| s.mime_type().eq_ignore_ascii_case(mime))
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Syntax {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Rendering options shared by all writers.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Prefix table; the canonical defaults plus caller overrides.
    pub namespaces: Namespaces,
    /// MIME type the caller expects; checked against the syntax.
    pub mime_type: Option<String>,
    /// Syntax IRI the caller expects; checked against the syntax.
    pub syntax_uri: Option<String>,
}

impl SerializeOptions {
    /// Options with caller `(iri, prefix)` pairs merged over the defaults.
    pub fn with_namespaces<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            namespaces: Namespaces::with_overrides(pairs),
            ..Self::default()
        }
    }
}

/// Render `graph` by syntax name.
///
/// An unrecognized `syntax_name` fails with
/// [`SerializationError::UnsupportedSyntax`] before anything is rendered.
pub fn serialize_named(
    graph: &Graph,
    syntax_name: &str,
    options: &SerializeOptions,
) -> SerializationResult<Vec<u8>> {
    let syntax = Syntax::from_name(syntax_name)?;
    serialize(graph, syntax, options)
}

/// Render `graph` in `syntax`.
pub fn serialize(
    graph: &Graph,
    syntax: Syntax,
    options: &SerializeOptions,
) -> SerializationResult<Vec<u8>> {
    if let Some(mime) = options.mime_type.as_deref() {
        if Syntax::from_mime_type(mime) != Some(syntax) {
            tracing::warn!(syntax = %syntax, mime, "MIME type does not match syntax; using syntax");
        }
    }
    if let Some(uri) = options.syntax_uri.as_deref() {
        if syntax.syntax_uri() != Some(uri) {
            tracing::warn!(syntax = %syntax, uri, "syntax URI does not match syntax; using syntax");
        }
    }

    let out = match syntax {
        Syntax::RdfXml => rdfxml::write(graph, &options.namespaces)?,
        Syntax::Json => json::write(graph)?,
        Syntax::NTriples => ntriples::write(graph),
        Syntax::Turtle => turtle::write(graph, &options.namespaces),
        Syntax::Dot => dot::write(graph, &options.namespaces),
    };
    tracing::debug!(syntax = %syntax, triples = graph.len(), bytes = out.len(), "serialized graph");
    Ok(out)
}

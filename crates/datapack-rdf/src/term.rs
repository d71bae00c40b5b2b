//! RDF terms and node-type labels.
//!
//! A stored relationship carries string node-type labels (`uri`, `blank`,
//! `literal`) that are validated into [`NodeType`]. The serializers work on
//! fully-typed [`Term`]s, produced from relationships when the resource map
//! graph is built.

use std::fmt;
use std::str::FromStr;

use datapack_core::{ValidationError, BLANK_NODE_PREFIX};
use serde::{Deserialize, Serialize};

/// Kind of RDF node at a subject or object position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// An IRI reference.
    Uri,
    /// A literal value.
    Literal,
    /// A blank node.
    Blank,
}

impl NodeType {
    /// Label used in relationship tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uri => "uri",
            Self::Literal => "literal",
            Self::Blank => "blank",
        }
    }

    /// Validate an optional subject-position label.
    ///
    /// `None` and blank strings mean "absent" and are defaulted later.
    pub fn parse_subject(label: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match normalize(label) {
            None => Ok(None),
            Some("uri") => Ok(Some(Self::Uri)),
            Some("blank") => Ok(Some(Self::Blank)),
            Some(other) => Err(ValidationError::InvalidSubjectType {
                value: other.to_string(),
            }),
        }
    }

    /// Validate an optional object-position label.
    pub fn parse_object(label: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match normalize(label) {
            None => Ok(None),
            Some(other) => other
                .parse()
                .map(Some)
                .map_err(|_| ValidationError::InvalidObjectType {
                    value: other.to_string(),
                }),
        }
    }
}

fn normalize(label: Option<&str>) -> Option<&str> {
    label.map(str::trim).filter(|s| !s.is_empty())
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uri" => Ok(Self::Uri),
            "literal" => Ok(Self::Literal),
            "blank" => Ok(Self::Blank),
            other => Err(format!("unknown node type: {other:?}")),
        }
    }
}

/// An RDF term.
///
/// Ordering is derived so a set of triples sorts by (subject, predicate,
/// object) with IRIs before blank nodes before literals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// Full IRI (possibly relative when no resolve URI was configured).
    Iri(String),
    /// Blank node label, without the `_:` prefix.
    Blank(String),
    /// Literal value with an optional datatype IRI.
    Literal {
        /// Lexical value.
        value: String,
        /// Datatype IRI, if typed.
        datatype: Option<String>,
    },
}

impl Term {
    /// IRI term.
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    /// Blank node term; a leading `_:` is stripped.
    pub fn blank(token: &str) -> Self {
        Self::Blank(token.strip_prefix(BLANK_NODE_PREFIX).unwrap_or(token).to_string())
    }

    /// Literal term.
    pub fn literal(value: impl Into<String>, datatype: Option<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype,
        }
    }

    /// The node type of this term.
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Iri(_) => NodeType::Uri,
            Self::Blank(_) => NodeType::Blank,
            Self::Literal { .. } => NodeType::Literal,
        }
    }
}

/// One RDF statement. The predicate is always an IRI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    /// Subject (IRI or blank node).
    pub subject: Term,
    /// Predicate IRI.
    pub predicate: String,
    /// Object term.
    pub object: Term,
}

impl Triple {
    /// Build a triple.
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

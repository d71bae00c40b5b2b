//! # Identifier Generation
//!
//! Every generated token in datapack (blank nodes, package identifiers,
//! resource-map identifiers, bag names) flows through an [`IdGenerator`].
//! The default [`UuidGenerator`] draws random v4 UUIDs; the
//! [`SequentialIdGenerator`] produces a predictable sequence for
//! reproducible output and tests.
//!
//! ## Token Formats
//!
//! | token | format |
//! |---|---|
//! | blank node | `_:b<id without hyphens>` |
//! | package id | `urn:uuid:<id>` |
//! | resource map id | `resource_map_<id>` |

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Reserved prefix marking a blank-node token.
pub const BLANK_NODE_PREFIX: &str = "_:";

/// Source of globally unique strings.
pub trait IdGenerator: fmt::Debug + Send + Sync {
    /// Return a string never returned before by this generator.
    fn new_id(&self) -> String;
}

/// Random v4 UUID generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Counter-backed generator yielding `<prefix><n>` for n = 1, 2, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Create a generator whose ids start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{n}", self.prefix)
    }
}

/// Generate a fresh blank-node token.
///
/// Hyphens are stripped so the label stays a valid N-Triples blank node
/// label and XML `NCName` (used as `rdf:nodeID`).
pub fn new_blank_node(ids: &dyn IdGenerator) -> String {
    let raw = ids.new_id();
    let label: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    format!("{BLANK_NODE_PREFIX}b{label}")
}

/// Generate a package identifier of the form `urn:uuid:<id>`.
pub fn new_package_id(ids: &dyn IdGenerator) -> String {
    format!("urn:uuid:{}", ids.new_id())
}

/// Generate a resource-map identifier usable as a file stem.
pub fn new_resource_map_id(ids: &dyn IdGenerator) -> String {
    format!("resource_map_{}", ids.new_id())
}

/// Whether `token` carries the blank-node prefix.
pub fn is_blank_token(token: &str) -> bool {
    token.starts_with(BLANK_NODE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_generator_yields_distinct_ids() {
        let ids = UuidGenerator;
        let a = ids.new_id();
        let b = ids.new_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn sequential_generator_counts_from_one() {
        let ids = SequentialIdGenerator::new("id-");
        assert_eq!(ids.new_id(), "id-1");
        assert_eq!(ids.new_id(), "id-2");
    }

    #[test]
    fn blank_node_token_format() {
        let token = new_blank_node(&UuidGenerator);
        assert!(is_blank_token(&token));
        assert!(token.starts_with("_:b"));
        assert!(!token.contains('-'));
        assert_eq!(token.len(), 2 + 1 + 32);
    }

    #[test]
    fn blank_node_from_sequential_ids() {
        let ids = SequentialIdGenerator::new("n-");
        assert_eq!(new_blank_node(&ids), "_:bn1");
    }

    #[test]
    fn package_and_map_id_prefixes() {
        let ids = SequentialIdGenerator::new("x");
        assert_eq!(new_package_id(&ids), "urn:uuid:x1");
        assert_eq!(new_resource_map_id(&ids), "resource_map_x2");
    }

    #[test]
    fn many_blank_nodes_are_unique() {
        let ids = UuidGenerator;
        let tokens: HashSet<String> = (0..1000).map(|_| new_blank_node(&ids)).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn plain_identifiers_are_not_blank() {
        assert!(!is_blank_token("do1"));
        assert!(!is_blank_token("urn:uuid:1234"));
    }
}

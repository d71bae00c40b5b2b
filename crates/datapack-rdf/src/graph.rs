//! RDF graph: a set of triples.
//!
//! Backed by a `BTreeSet`, so iteration is always in (subject, predicate,
//! object) order and duplicates collapse. Every writer relies on this for
//! deterministic output.

use std::collections::BTreeSet;

use crate::term::{Term, Triple};

/// A set of RDF triples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Add a triple by components.
    pub fn add(&mut self, subject: Term, predicate: &str, object: Term) -> bool {
        self.insert(Triple::new(subject, predicate, object))
    }

    /// Number of distinct triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the graph has no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate triples in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Whether `triple` is present.
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Triples grouped by subject, in sorted order.
    pub fn by_subject(&self) -> Vec<(&Term, Vec<&Triple>)> {
        let mut groups: Vec<(&Term, Vec<&Triple>)> = Vec::new();
        for triple in &self.triples {
            if let Some((subject, members)) = groups.last_mut() {
                if *subject == &triple.subject {
                    members.push(triple);
                    continue;
                }
            }
            groups.push((&triple.subject, vec![triple]));
        }
        groups
    }

    /// Every distinct predicate IRI, sorted.
    pub fn predicates(&self) -> BTreeSet<&str> {
        self.triples.iter().map(|t| t.predicate.as_str()).collect()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

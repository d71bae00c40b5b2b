//! # Resource Map Graph
//!
//! Builds the OAI-ORE description of a package: a resource map node that
//! describes an aggregation node, which aggregates every member, unioned
//! with the package's recorded relationships.
//!
//! ```text
//! <map>              rdf:type ore:ResourceMap ; ore:describes <map#aggregation> ;
//!                    dcterms:identifier "map-id" .
//! <map#aggregation>  rdf:type ore:Aggregation ; ore:isDescribedBy <map> ;
//!                    ore:aggregates <member> ...
//! <member>           ore:isAggregatedBy <map#aggregation> ; dcterms:identifier "member-id" .
//! ```
//!
//! No timestamps or other ambient values are added: identical input
//! yields an identical graph.

use std::collections::BTreeSet;

use datapack_core::is_blank_token;

use crate::graph::Graph;
use crate::store::Relationship;
use crate::term::{NodeType, Term};
use crate::vocab::{dcterms, ore, rdf, xsd};

/// Fragment appended to the map IRI to name the aggregation.
pub const AGGREGATION_FRAGMENT: &str = "#aggregation";

/// Build the resource map graph for `map_id`.
///
/// When `resolve_uri` is non-empty, member ids (and the map id) are turned
/// into resolvable IRIs by appending the percent-encoded id to it. Uri-typed
/// relationship nodes that name a member are rewritten the same way, so
/// provenance statements attach to the aggregated nodes.
pub fn build_graph<S: AsRef<str>>(
    map_id: &str,
    relationships: &[Relationship],
    member_ids: &[S],
    resolve_uri: Option<&str>,
) -> Graph {
    let resolver = Resolver::new(resolve_uri);
    let members: BTreeSet<&str> = member_ids.iter().map(AsRef::as_ref).collect();

    let mut graph = Graph::new();
    let map = Term::iri(resolver.resolve(map_id));
    let aggregation = Term::iri(format!("{}{AGGREGATION_FRAGMENT}", resolver.resolve(map_id)));

    graph.add(map.clone(), rdf::TYPE, Term::iri(ore::RESOURCE_MAP));
    graph.add(map.clone(), ore::DESCRIBES, aggregation.clone());
    graph.add(map.clone(), dcterms::IDENTIFIER, identifier_literal(map_id));
    graph.add(aggregation.clone(), rdf::TYPE, Term::iri(ore::AGGREGATION));
    graph.add(aggregation.clone(), ore::IS_DESCRIBED_BY, map);

    for id in &members {
        let member = Term::iri(resolver.resolve(id));
        graph.add(aggregation.clone(), ore::AGGREGATES, member.clone());
        graph.add(member.clone(), ore::IS_AGGREGATED_BY, aggregation.clone());
        graph.add(member, dcterms::IDENTIFIER, identifier_literal(id));
    }

    for row in relationships {
        let subject = match subject_type(row) {
            NodeType::Blank => Term::blank(&row.subject),
            _ => Term::iri(resolver.resolve_if_member(&row.subject, &members)),
        };
        let object = match object_type(row) {
            NodeType::Blank => Term::blank(&row.object),
            NodeType::Literal => Term::literal(row.object.clone(), row.datatype.clone()),
            NodeType::Uri => Term::iri(resolver.resolve_if_member(&row.object, &members)),
        };
        graph.add(subject, &row.predicate, object);
    }

    tracing::debug!(
        map_id,
        members = members.len(),
        relationships = relationships.len(),
        triples = graph.len(),
        "built resource map graph"
    );
    graph
}

/// Effective subject type: explicit, else blank for `_:` tokens, else uri.
pub fn subject_type(row: &Relationship) -> NodeType {
    match row.subject_type {
        Some(t) => t,
        None if is_blank_token(&row.subject) => NodeType::Blank,
        None => NodeType::Uri,
    }
}

/// Effective object type: explicit, else blank for `_:` tokens, else
/// literal when a datatype is present, else uri.
pub fn object_type(row: &Relationship) -> NodeType {
    match row.object_type {
        Some(t) => t,
        None if is_blank_token(&row.object) => NodeType::Blank,
        None if row.datatype.is_some() => NodeType::Literal,
        None => NodeType::Uri,
    }
}

fn identifier_literal(id: &str) -> Term {
    Term::literal(id, Some(xsd::STRING.to_string()))
}

struct Resolver<'a> {
    base: Option<&'a str>,
}

impl<'a> Resolver<'a> {
    fn new(resolve_uri: Option<&'a str>) -> Self {
        let base = resolve_uri
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty());
        Self { base }
    }

    fn resolve(&self, id: &str) -> String {
        match self.base {
            Some(base) => format!("{base}/{}", percent_encode(id)),
            None => id.to_string(),
        }
    }

    fn resolve_if_member(&self, id: &str, members: &BTreeSet<&str>) -> String {
        if members.contains(id) {
            self.resolve(id)
        } else {
            id.to_string()
        }
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn percent_encode(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Triple;
    use crate::vocab::prov;

    fn derivation(subject: &str, object: &str) -> Relationship {
        Relationship {
            subject: subject.to_string(),
            predicate: prov::WAS_DERIVED_FROM.to_string(),
            object: object.to_string(),
            subject_type: Some(NodeType::Uri),
            object_type: Some(NodeType::Uri),
            datatype: None,
        }
    }

    #[test]
    fn aggregation_pattern_without_resolver() {
        let g = build_graph("map1", &[], &["do1", "do2"], None);
        let agg = Term::iri("map1#aggregation");
        assert!(g.contains(&Triple::new(Term::iri("map1"), ore::DESCRIBES, agg.clone())));
        assert!(g.contains(&Triple::new(agg.clone(), ore::AGGREGATES, Term::iri("do1"))));
        assert!(g.contains(&Triple::new(agg.clone(), ore::AGGREGATES, Term::iri("do2"))));
        assert!(g.contains(&Triple::new(Term::iri("do1"), ore::IS_AGGREGATED_BY, agg)));
        // 5 map/aggregation triples + 3 per member
        assert_eq!(g.len(), 5 + 3 * 2);
    }

    #[test]
    fn empty_resolver_leaves_ids_bare() {
        let bare = build_graph("m", &[], &["do1"], None);
        let empty = build_graph("m", &[], &["do1"], Some(""));
        assert_eq!(bare, empty);
    }

    #[test]
    fn resolver_prefixes_members_and_relationships() {
        let g = build_graph(
            "m",
            &[derivation("do2", "do1"), derivation("other", "do1")],
            &["do1", "do2"],
            Some("https://cn.example.org/resolve/"),
        );
        let do1 = Term::iri("https://cn.example.org/resolve/do1");
        let do2 = Term::iri("https://cn.example.org/resolve/do2");
        assert!(g.contains(&Triple::new(do2, prov::WAS_DERIVED_FROM, do1.clone())));
        assert!(g.contains(&Triple::new(Term::iri("other"), prov::WAS_DERIVED_FROM, do1)));
    }

    #[test]
    fn resolver_percent_encodes_ids() {
        let g = build_graph("m", &[], &["urn:uuid:1 2"], Some("https://r.org"));
        assert!(g.iter().any(|t| t.object == Term::iri("https://r.org/urn%3Auuid%3A1%202")));
    }

    #[test]
    fn self_derivation_survives_as_loop() {
        let g = build_graph("m", &[derivation("do2", "do2")], &["do2"], None);
        assert!(g.contains(&Triple::new(
            Term::iri("do2"),
            prov::WAS_DERIVED_FROM,
            Term::iri("do2")
        )));
    }

    #[test]
    fn absent_types_are_defaulted() {
        let mut row = derivation("_:b1", "42");
        row.subject_type = None;
        row.object_type = None;
        row.datatype = Some(xsd::STRING.to_string());
        assert_eq!(subject_type(&row), NodeType::Blank);
        assert_eq!(object_type(&row), NodeType::Literal);

        row.datatype = None;
        assert_eq!(object_type(&row), NodeType::Uri);
        row.object = "_:b2".to_string();
        assert_eq!(object_type(&row), NodeType::Blank);
    }

    #[test]
    fn identical_input_identical_graph() {
        let rows = vec![derivation("do2", "do1")];
        let a = build_graph("m", &rows, &["do1", "do2"], None);
        let b = build_graph("m", &rows, &["do2", "do1"], None);
        assert_eq!(a, b);
    }
}

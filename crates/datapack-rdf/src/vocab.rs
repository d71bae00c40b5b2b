//! RDF vocabulary constants and the namespace prefix table.
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `dcterms` - Dublin Core terms (http://purl.org/dc/terms/)
//! - `ore` - OAI-ORE (http://www.openarchives.org/ore/terms/)
//! - `cito` - Citation Typing Ontology (http://purl.org/spar/cito/)
//! - `prov` - W3C PROV-O (http://www.w3.org/ns/prov#)
//! - `provone` - ProvONE workflow extension (http://purl.dataone.org/provone/2015/01/15/ontology#)

use std::collections::BTreeMap;

/// RDF vocabulary constants
pub mod rdf {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
}

/// XSD vocabulary constants
pub mod xsd {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

/// Dublin Core terms
pub mod dcterms {
    /// Namespace IRI
    pub const NS: &str = "http://purl.org/dc/terms/";

    /// dcterms:identifier IRI
    pub const IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
}

/// OAI-ORE aggregation vocabulary
pub mod ore {
    /// Namespace IRI
    pub const NS: &str = "http://www.openarchives.org/ore/terms/";

    /// ore:ResourceMap class
    pub const RESOURCE_MAP: &str = "http://www.openarchives.org/ore/terms/ResourceMap";
    /// ore:Aggregation class
    pub const AGGREGATION: &str = "http://www.openarchives.org/ore/terms/Aggregation";
    /// ore:describes
    pub const DESCRIBES: &str = "http://www.openarchives.org/ore/terms/describes";
    /// ore:isDescribedBy
    pub const IS_DESCRIBED_BY: &str = "http://www.openarchives.org/ore/terms/isDescribedBy";
    /// ore:aggregates
    pub const AGGREGATES: &str = "http://www.openarchives.org/ore/terms/aggregates";
    /// ore:isAggregatedBy
    pub const IS_AGGREGATED_BY: &str = "http://www.openarchives.org/ore/terms/isAggregatedBy";
}

/// Citation Typing Ontology
pub mod cito {
    /// Namespace IRI
    pub const NS: &str = "http://purl.org/spar/cito/";

    /// cito:documents
    pub const DOCUMENTS: &str = "http://purl.org/spar/cito/documents";
    /// cito:isDocumentedBy
    pub const IS_DOCUMENTED_BY: &str = "http://purl.org/spar/cito/isDocumentedBy";
}

/// W3C PROV-O
pub mod prov {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/prov#";

    /// prov:wasDerivedFrom
    pub const WAS_DERIVED_FROM: &str = "http://www.w3.org/ns/prov#wasDerivedFrom";
    /// prov:used
    pub const USED: &str = "http://www.w3.org/ns/prov#used";
    /// prov:wasGeneratedBy
    pub const WAS_GENERATED_BY: &str = "http://www.w3.org/ns/prov#wasGeneratedBy";
    /// prov:qualifiedAssociation
    pub const QUALIFIED_ASSOCIATION: &str = "http://www.w3.org/ns/prov#qualifiedAssociation";
    /// prov:hadPlan
    pub const HAD_PLAN: &str = "http://www.w3.org/ns/prov#hadPlan";
    /// prov:Association class
    pub const ASSOCIATION: &str = "http://www.w3.org/ns/prov#Association";
}

/// ProvONE workflow extension
pub mod provone {
    /// Namespace IRI
    pub const NS: &str = "http://purl.dataone.org/provone/2015/01/15/ontology#";

    /// provone:Execution class
    pub const EXECUTION: &str = "http://purl.dataone.org/provone/2015/01/15/ontology#Execution";
    /// provone:Program class
    pub const PROGRAM: &str = "http://purl.dataone.org/provone/2015/01/15/ontology#Program";
}

/// Prefix → namespace IRI table used when rendering prefixed names.
///
/// Backed by a `BTreeMap` so declarations always come out in prefix order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    by_prefix: BTreeMap<String, String>,
}

impl Default for Namespaces {
    fn default() -> Self {
        let mut by_prefix = BTreeMap::new();
        for (prefix, iri) in [
            ("cito", cito::NS),
            ("dcterms", dcterms::NS),
            ("ore", ore::NS),
            ("prov", prov::NS),
            ("provone", provone::NS),
            ("rdf", rdf::NS),
            ("rdfs", rdfs::NS),
            ("xsd", xsd::NS),
        ] {
            by_prefix.insert(prefix.to_string(), iri.to_string());
        }
        Self { by_prefix }
    }
}

impl Namespaces {
    /// An empty table.
    pub fn empty() -> Self {
        Self {
            by_prefix: BTreeMap::new(),
        }
    }

    /// The canonical default table merged with caller `(iri, prefix)` pairs.
    ///
    /// A caller entry replaces the default bound to the same prefix.
    pub fn with_overrides<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut ns = Self::default();
        for (iri, prefix) in pairs {
            ns.insert(prefix, iri);
        }
        ns
    }

    /// Bind `prefix` to `iri`.
    pub fn insert(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.by_prefix.insert(prefix.into(), iri.into());
    }

    /// Copy of the table keeping only prefixes accepted by `keep`.
    pub fn filtered(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            by_prefix: self
                .by_prefix
                .iter()
                .filter(|(prefix, _)| keep(prefix.as_str()))
                .map(|(p, i)| (p.clone(), i.clone()))
                .collect(),
        }
    }

    /// Look up the namespace bound to `prefix`.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.by_prefix.get(prefix).map(String::as_str)
    }

    /// Iterate `(prefix, iri)` in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_prefix.iter().map(|(p, i)| (p.as_str(), i.as_str()))
    }

    /// Number of bound prefixes.
    pub fn len(&self) -> usize {
        self.by_prefix.len()
    }

    /// Whether no prefixes are bound.
    pub fn is_empty(&self) -> bool {
        self.by_prefix.is_empty()
    }

    /// Split `iri` into `(prefix, local)` using the longest bound namespace
    /// whose remainder is a valid local name.
    pub fn split<'a>(&'a self, iri: &'a str) -> Option<(&'a str, &'a str)> {
        self.by_prefix
            .iter()
            .filter_map(|(prefix, ns)| {
                iri.strip_prefix(ns.as_str())
                    .filter(|local| is_local_name(local))
                    .map(|local| (prefix.as_str(), ns.len(), local))
            })
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(prefix, _, local)| (prefix, local))
    }

    /// Render `iri` as `prefix:local` when a bound namespace covers it.
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.split(iri).map(|(p, l)| format!("{p}:{l}"))
    }
}

/// Whether `s` is usable both as an XML `NCName` and a Turtle local name.
pub fn is_local_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Split an IRI after its last `#` or `/` when the tail is a valid local name.
pub fn split_namespace(iri: &str) -> Option<(&str, &str)> {
    let idx = iri.rfind(|c: char| c == '#' || c == '/')?;
    let (ns, local) = iri.split_at(idx + 1);
    if ns.is_empty() || !is_local_name(local) {
        return None;
    }
    Some((ns, local))
}

//! RDF/XML writer.
//!
//! Emits one `rdf:Description` per subject, in sorted subject order, with
//! one property element per triple. Predicates outside the namespace table
//! get generated `nsN` prefixes, assigned in namespace-IRI order so the
//! output stays reproducible.
//!
//! Text and attribute values are escaped here rather than by quick-xml:
//! carriage returns, and tabs and newlines inside attributes, are written
//! as character references so a conforming parser reads back the exact
//! value. A term holding a character outside the XML 1.0 `Char` production
//! fails the whole call before anything is written.

use std::collections::BTreeSet;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{SerializationError, SerializationResult};
use crate::graph::Graph;
use crate::term::Term;
use crate::vocab::{is_local_name, rdf, split_namespace, Namespaces};

pub(super) fn write(graph: &Graph, namespaces: &Namespaces) -> SerializationResult<Vec<u8>> {
    check_chars(graph)?;
    let decls = declarations(graph, namespaces)?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_err)?;

    let mut root = BytesStart::new("rdf:RDF");
    for (prefix, iri) in decls.iter() {
        push_attr(&mut root, &format!("xmlns:{prefix}"), iri);
    }
    writer.write_event(Event::Start(root)).map_err(xml_err)?;

    for (subject, triples) in graph.by_subject() {
        let mut desc = BytesStart::new("rdf:Description");
        match subject {
            Term::Iri(i) => push_attr(&mut desc, "rdf:about", i),
            Term::Blank(label) => push_attr(&mut desc, "rdf:nodeID", label),
            Term::Literal { value, .. } => {
                return Err(SerializationError::Xml(format!(
                    "literal {value:?} cannot be a subject"
                )))
            }
        }
        writer.write_event(Event::Start(desc)).map_err(xml_err)?;

        for t in triples {
            let name = qname(&t.predicate, &decls)?;
            let mut prop = BytesStart::new(name.as_str());
            match &t.object {
                Term::Iri(i) => {
                    push_attr(&mut prop, "rdf:resource", i);
                    writer.write_event(Event::Empty(prop)).map_err(xml_err)?;
                }
                Term::Blank(label) => {
                    push_attr(&mut prop, "rdf:nodeID", label);
                    writer.write_event(Event::Empty(prop)).map_err(xml_err)?;
                }
                Term::Literal { value, datatype } => {
                    if let Some(dt) = datatype {
                        push_attr(&mut prop, "rdf:datatype", dt);
                    }
                    writer.write_event(Event::Start(prop)).map_err(xml_err)?;
                    writer
                        .write_event(Event::Text(BytesText::from_escaped(escape(value, false))))
                        .map_err(xml_err)?;
                    writer
                        .write_event(Event::End(BytesEnd::new(name.as_str())))
                        .map_err(xml_err)?;
                }
            }
        }

        writer
            .write_event(Event::End(BytesEnd::new("rdf:Description")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("rdf:RDF")))
        .map_err(xml_err)?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

/// Prefix table for the document: caller table with `rdf` pinned to the
/// RDF namespace, plus generated prefixes for uncovered predicates.
///
/// Caller prefixes that are not NCNames, or that fall in the reserved
/// `xml` space, are dropped with a warning; predicates they covered get a
/// generated prefix instead.
fn declarations(graph: &Graph, namespaces: &Namespaces) -> SerializationResult<Namespaces> {
    let mut decls = Namespaces::empty();
    for (prefix, iri) in namespaces.iter() {
        if prefix == "rdf" && iri != rdf::NS {
            tracing::warn!(iri, "ignoring rdf prefix override in RDF/XML output");
            continue;
        }
        if !is_xml_prefix(prefix) {
            tracing::warn!(prefix, iri, "ignoring prefix that is not a valid XML name");
            continue;
        }
        decls.insert(prefix, iri);
    }
    decls.insert("rdf", rdf::NS);

    let mut missing = BTreeSet::new();
    for predicate in graph.predicates() {
        if decls.split(predicate).is_some() {
            continue;
        }
        let (ns, _) = split_namespace(predicate).ok_or_else(|| {
            SerializationError::Xml(format!(
                "predicate {predicate:?} cannot be written as an XML qualified name"
            ))
        })?;
        missing.insert(ns.to_string());
    }

    let mut n = 0;
    for ns in missing {
        let prefix = loop {
            let candidate = format!("ns{n}");
            n += 1;
            if decls.get(&candidate).is_none() {
                break candidate;
            }
        };
        decls.insert(prefix, ns);
    }
    Ok(decls)
}

fn is_xml_prefix(prefix: &str) -> bool {
    is_local_name(prefix) && !prefix.to_ascii_lowercase().starts_with("xml")
}

fn qname(predicate: &str, decls: &Namespaces) -> SerializationResult<String> {
    decls
        .compact(predicate)
        .ok_or_else(|| SerializationError::Xml(format!("no prefix covers predicate {predicate:?}")))
}

/// XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn check_chars(graph: &Graph) -> SerializationResult<()> {
    let check = |s: &str| match s.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(SerializationError::Xml(format!(
            "character U+{:04X} in {s:?} is not allowed in XML 1.0",
            u32::from(c)
        ))),
        None => Ok(()),
    };
    for t in graph {
        check(&t.predicate)?;
        for term in [&t.subject, &t.object] {
            match term {
                Term::Iri(v) | Term::Blank(v) => check(v)?,
                Term::Literal { value, datatype } => {
                    check(value)?;
                    if let Some(dt) = datatype {
                        check(dt)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Escape `s` for element content, or for a double-quoted attribute value
/// when `attr` is set.
fn escape(s: &str, attr: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            '"' if attr => out.push_str("&quot;"),
            '\n' if attr => out.push_str("&#10;"),
            '\t' if attr => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}

fn push_attr(elem: &mut BytesStart<'_>, key: &str, value: &str) {
    let escaped = escape(value, true);
    elem.push_attribute(Attribute::from((key.as_bytes(), escaped.as_bytes())));
}

fn xml_err(e: impl std::fmt::Display) -> SerializationError {
    SerializationError::Xml(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{ore, xsd};

    fn render(g: &Graph, ns: &Namespaces) -> String {
        String::from_utf8(write(g, ns).unwrap()).unwrap()
    }

    #[test]
    fn description_per_subject() {
        let mut g = Graph::new();
        let agg = Term::iri("m#aggregation");
        g.add(agg.clone(), ore::AGGREGATES, Term::iri("do1"));
        g.add(agg, ore::AGGREGATES, Term::iri("do2"));
        g.add(
            Term::iri("do1"),
            "http://purl.org/dc/terms/identifier",
            Term::literal("do1", Some(xsd::STRING.to_string())),
        );
        let s = render(&g, &Namespaces::default());

        assert!(s.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(s.contains("xmlns:ore=\"http://www.openarchives.org/ore/terms/\""));
        assert!(s.contains("<rdf:Description rdf:about=\"m#aggregation\">"));
        assert!(s.contains("<ore:aggregates rdf:resource=\"do1\"/>"));
        assert!(s.contains(
            "<dcterms:identifier rdf:datatype=\"http://www.w3.org/2001/XMLSchema#string\">do1</dcterms:identifier>"
        ));
        assert_eq!(s.matches("<rdf:Description ").count(), 2);
        assert!(s.trim_end().ends_with("</rdf:RDF>"));
    }

    #[test]
    fn blank_nodes_use_node_id() {
        let mut g = Graph::new();
        g.add(Term::blank("_:b1"), ore::AGGREGATES, Term::blank("_:b2"));
        let s = render(&g, &Namespaces::default());
        assert!(s.contains("<rdf:Description rdf:nodeID=\"b1\">"));
        assert!(s.contains("<ore:aggregates rdf:nodeID=\"b2\"/>"));
    }

    #[test]
    fn unknown_namespaces_get_generated_prefixes() {
        let mut g = Graph::new();
        g.add(Term::iri("a"), "http://example.org/vocab#knows", Term::iri("b"));
        g.add(Term::iri("a"), "http://another.org/likes", Term::iri("b"));
        let s = render(&g, &Namespaces::empty());
        assert!(s.contains("xmlns:ns0=\"http://another.org/\""));
        assert!(s.contains("xmlns:ns1=\"http://example.org/vocab#\""));
        assert!(s.contains("<ns1:knows rdf:resource=\"b\"/>"));
        assert!(s.contains("<ns0:likes rdf:resource=\"b\"/>"));
    }

    #[test]
    fn literal_text_is_escaped() {
        let mut g = Graph::new();
        g.add(Term::iri("a"), ore::AGGREGATES, Term::literal("x < y & z", None));
        let s = render(&g, &Namespaces::default());
        assert!(s.contains(">x &lt; y &amp; z</ore:aggregates>"));
    }

    #[test]
    fn unqualifiable_predicate_is_an_error() {
        let mut g = Graph::new();
        g.add(Term::iri("a"), "urn:x:1", Term::iri("b"));
        let err = write(&g, &Namespaces::default()).unwrap_err();
        assert!(matches!(err, SerializationError::Xml(_)));
    }

    #[test]
    fn rdf_prefix_cannot_be_rebound() {
        let mut ns = Namespaces::default();
        ns.insert("rdf", "http://example.org/not-rdf#");
        let mut g = Graph::new();
        g.add(Term::iri("a"), rdf::TYPE, Term::iri(ore::AGGREGATION));
        let s = render(&g, &ns);
        assert!(s.contains("xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\""));
        assert!(s.contains("<rdf:type rdf:resource="));
    }

    #[test]
    fn carriage_returns_become_character_references() {
        let mut g = Graph::new();
        g.add(Term::iri("a\tb"), ore::AGGREGATES, Term::literal("line1\r\nline2", None));
        let out = write(&g, &Namespaces::default()).unwrap();
        assert!(!out.contains(&b'\r'));
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains(">line1&#13;\nline2</ore:aggregates>"), "{s}");
        assert!(s.contains("rdf:about=\"a&#9;b\""), "{s}");
    }

    #[test]
    fn non_xml_characters_are_rejected() {
        let mut g = Graph::new();
        g.add(Term::iri("a"), ore::AGGREGATES, Term::literal("x\u{1}y", None));
        let err = write(&g, &Namespaces::default()).unwrap_err();
        match err {
            SerializationError::Xml(msg) => assert!(msg.contains("U+0001"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }

        let mut g = Graph::new();
        g.add(Term::iri("a\u{FFFE}"), ore::AGGREGATES, Term::iri("b"));
        assert!(write(&g, &Namespaces::default()).is_err());
    }

    #[test]
    fn invalid_caller_prefixes_are_skipped() {
        let mut ns = Namespaces::empty();
        ns.insert("", "http://example.org/terms/");
        ns.insert("9bad", "http://example.org/more/");
        ns.insert("xmlfoo", "http://example.org/x/");
        let mut g = Graph::new();
        g.add(Term::iri("a"), "http://example.org/terms/label", Term::literal("v", None));
        g.add(Term::iri("a"), "http://example.org/more/tag", Term::literal("w", None));
        let s = render(&g, &ns);

        assert!(!s.contains("xmlns:=\""), "{s}");
        assert!(!s.contains("xmlns:9bad"), "{s}");
        assert!(!s.contains("xmlns:xmlfoo"), "{s}");
        assert!(s.contains("xmlns:ns0=\"http://example.org/more/\""), "{s}");
        assert!(s.contains("xmlns:ns1=\"http://example.org/terms/\""), "{s}");
        assert!(s.contains("<ns1:label>v</ns1:label>"), "{s}");
        assert!(s.contains("<ns0:tag>w</ns0:tag>"), "{s}");
    }
}

//! Turtle writer.
//!
//! Declares every prefix in the namespace table, then writes one block per
//! subject with predicates separated by `;` and repeated objects by `,`.
//! `rdf:type` is written as `a`. The empty prefix is allowed; any other
//! prefix that Turtle cannot parse is left out and its IRIs are written
//! in full.

use std::fmt::Write as _;

use super::ntriples;
use crate::graph::Graph;
use crate::term::Term;
use crate::vocab::{rdf, Namespaces};

pub(super) fn write(graph: &Graph, namespaces: &Namespaces) -> Vec<u8> {
    let namespaces = &namespaces.filtered(|prefix| {
        let ok = is_turtle_prefix(prefix);
        if !ok {
            tracing::warn!(prefix, "ignoring prefix that is not a valid Turtle prefix");
        }
        ok
    });
    let mut out = String::new();
    for (prefix, iri) in namespaces.iter() {
        let _ = writeln!(out, "@prefix {prefix}: {} .", ntriples::iri(iri));
    }

    for (subject, triples) in graph.by_subject() {
        out.push('\n');
        out.push_str(&term(subject, namespaces));

        let mut last_predicate: Option<&str> = None;
        for t in triples {
            if last_predicate == Some(t.predicate.as_str()) {
                out.push_str(", ");
            } else {
                if last_predicate.is_some() {
                    out.push_str(" ;");
                }
                out.push_str("\n    ");
                out.push_str(&predicate(&t.predicate, namespaces));
                out.push(' ');
                last_predicate = Some(t.predicate.as_str());
            }
            out.push_str(&term(&t.object, namespaces));
        }
        out.push_str(" .\n");
    }
    out.into_bytes()
}

/// `PN_PREFIX`, restricted to ASCII, or empty.
fn is_turtle_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        Some(_) => false,
    }
}

fn predicate(iri: &str, namespaces: &Namespaces) -> String {
    if iri == rdf::TYPE {
        return "a".to_string();
    }
    name(iri, namespaces)
}

fn name(iri: &str, namespaces: &Namespaces) -> String {
    namespaces.compact(iri).unwrap_or_else(|| ntriples::iri(iri))
}

fn term(t: &Term, namespaces: &Namespaces) -> String {
    match t {
        Term::Iri(i) => name(i, namespaces),
        Term::Blank(label) => format!("_:{label}"),
        Term::Literal { value, datatype } => {
            let lexical = format!("\"{}\"", ntriples::escape_literal(value));
            match datatype {
                Some(dt) => format!("{lexical}^^{}", name(dt, namespaces)),
                None => lexical,
            }
        }
    }
}

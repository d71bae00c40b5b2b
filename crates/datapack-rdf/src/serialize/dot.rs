//! Graphviz DOT writer.
//!
//! Nodes are keyed by kind (`R` resource, `B` blank, `L` literal) plus
//! their value, edges are labelled with the predicate's prefixed name, and
//! the namespace table is printed in the graph label.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::graph::Graph;
use crate::term::Term;
use crate::vocab::Namespaces;

pub(super) fn write(graph: &Graph, namespaces: &Namespaces) -> Vec<u8> {
    let mut out = String::from("digraph {\n\trankdir = LR;\n\tcharset=\"utf-8\";\n\n");

    let mut resources = BTreeSet::new();
    let mut blanks = BTreeSet::new();
    let mut literals = BTreeSet::new();
    for t in graph {
        for node in [&t.subject, &t.object] {
            match node {
                Term::Iri(_) => resources.insert(node),
                Term::Blank(_) => blanks.insert(node),
                Term::Literal { .. } => literals.insert(node),
            };
        }
        let _ = writeln!(
            out,
            "\t\"{}\" -> \"{}\" [ label=\"{}\" ];",
            escape(&key(&t.subject)),
            escape(&key(&t.object)),
            escape(&display(&t.predicate, namespaces))
        );
    }

    out.push_str("\n\t// Resources\n");
    for node in resources {
        if let Term::Iri(i) = node {
            let _ = writeln!(
                out,
                "\t\"{}\" [ label=\"{}\", shape = ellipse, color = blue ];",
                escape(&key(node)),
                escape(&display(i, namespaces))
            );
        }
    }

    out.push_str("\n\t// Anonymous nodes\n");
    for node in blanks {
        let _ = writeln!(
            out,
            "\t\"{}\" [ label=\"\", shape = circle, color = gray ];",
            escape(&key(node))
        );
    }

    out.push_str("\n\t// Literals\n");
    for node in literals {
        if let Term::Literal { value, .. } = node {
            let _ = writeln!(
                out,
                "\t\"{}\" [ label=\"{}\", shape = record ];",
                escape(&key(node)),
                escape(value)
            );
        }
    }

    out.push_str("\n\tlabel=\"\\n\\nNamespaces:\\n");
    for (prefix, iri) in namespaces.iter() {
        let _ = write!(out, "{}: {}\\n", escape(prefix), escape(iri));
    }
    out.push_str("\";\n}\n");
    out.into_bytes()
}

fn key(t: &Term) -> String {
    match t {
        Term::Iri(i) => format!("R{i}"),
        Term::Blank(label) => format!("B{label}"),
        Term::Literal { value, datatype } => match datatype {
            Some(dt) => format!("L{value}^^{dt}"),
            None => format!("L{value}"),
        },
    }
}

fn display(iri: &str, namespaces: &Namespaces) -> String {
    namespaces.compact(iri).unwrap_or_else(|| iri.to_string())
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

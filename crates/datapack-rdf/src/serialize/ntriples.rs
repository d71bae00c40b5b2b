//! N-Triples writer: one `<s> <p> <o> .` line per triple, no prefixes.

use std::fmt::Write as _;

use crate::graph::Graph;
use crate::term::Term;

pub(super) fn write(graph: &Graph) -> Vec<u8> {
    let mut out = String::new();
    for t in graph {
        let _ = writeln!(
            out,
            "{} {} {} .",
            term(&t.subject),
            iri(&t.predicate),
            term(&t.object)
        );
    }
    out.into_bytes()
}

/// Render a term in N-Triples form (also valid Turtle).
pub(super) fn term(t: &Term) -> String {
    match t {
        Term::Iri(i) => iri(i),
        Term::Blank(label) => format!("_:{label}"),
        Term::Literal { value, datatype } => match datatype {
            Some(dt) => format!("\"{}\"^^{}", escape_literal(value), iri(dt)),
            None => format!("\"{}\"", escape_literal(value)),
        },
    }
}

/// `<iri>` with characters forbidden in IRIREF written as `\u` escapes.
pub(super) fn iri(i: &str) -> String {
    let mut out = String::with_capacity(i.len() + 2);
    out.push('<');
    for c in i.chars() {
        if c <= ' ' || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') {
            let _ = write!(out, "\\u{:04X}", c as u32);
        } else {
            out.push(c);
        }
    }
    out.push('>');
    out
}

/// Escape a literal's lexical form for a double-quoted string.
pub(super) fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < ' ' => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

//! RDF/JSON writer.
//!
//! ```json
//! { "<subject>": { "<predicate>": [ { "type": "uri", "value": "..." } ] } }
//! ```
//!
//! Blank subjects are keyed as `_:label`. Objects carry `type` (`uri`,
//! `bnode`, `literal`), `value` and, for typed literals, `datatype`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::SerializationResult;
use crate::graph::Graph;
use crate::term::Term;

#[derive(Serialize)]
struct JsonObject<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    datatype: Option<&'a str>,
}

pub(super) fn write(graph: &Graph) -> SerializationResult<Vec<u8>> {
    let mut doc: BTreeMap<String, BTreeMap<&str, Vec<JsonObject<'_>>>> = BTreeMap::new();
    for t in graph {
        let subject = match &t.subject {
            Term::Blank(label) => format!("_:{label}"),
            Term::Iri(i) => i.clone(),
            Term::Literal { value, .. } => value.clone(),
        };
        doc.entry(subject)
            .or_default()
            .entry(t.predicate.as_str())
            .or_default()
            .push(object(&t.object));
    }
    let mut out = serde_json::to_vec_pretty(&doc)?;
    out.push(b'\n');
    Ok(out)
}

fn object(t: &Term) -> JsonObject<'_> {
    match t {
        Term::Iri(i) => JsonObject {
            kind: "uri",
            value: i,
            datatype: None,
        },
        Term::Blank(label) => JsonObject {
            kind: "bnode",
            value: label,
            datatype: None,
        },
        Term::Literal { value, datatype } => JsonObject {
            kind: "literal",
            value,
            datatype: datatype.as_deref(),
        },
    }
}

//! # Relationship Store
//!
//! Append-only table of provenance and structural relationships between
//! package members. Rows are never updated or deleted; every insert is
//! validated in full before any row is appended, so a rejected call leaves
//! the table exactly as it was.
//!
//! ## Ordering Invariant
//!
//! [`RelationshipStore::query`] always returns rows sorted ascending by
//! (subject, predicate, object). Serialization downstream depends on this
//! for byte-reproducible output.

use std::sync::Arc;

use datapack_core::{new_blank_node, IdGenerator, UuidGenerator, ValidationError};
use serde::{Deserialize, Serialize};

use crate::term::NodeType;
use crate::vocab::{cito, prov, Namespaces};

/// One stored relationship row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Relationship {
    /// Subject identifier or blank-node token.
    pub subject: String,
    /// Predicate IRI.
    pub predicate: String,
    /// Object identifier, blank-node token, or literal value.
    pub object: String,
    /// Subject node type; `None` is defaulted at graph-build time.
    pub subject_type: Option<NodeType>,
    /// Object node type; `None` is defaulted at graph-build time.
    pub object_type: Option<NodeType>,
    /// Datatype IRI for literal objects.
    pub datatype: Option<String>,
}

/// Arguments for [`RelationshipStore::insert`].
///
/// Node types are carried as labels and validated on insert, so callers
/// holding untyped input (config files, tables) get a [`ValidationError`]
/// rather than a panic.
#[derive(Debug, Clone, Default)]
pub struct InsertRequest {
    /// Subject identifier; `None` substitutes a fresh blank node.
    pub subject: Option<String>,
    /// Object identifiers; each `None` (or an empty list) substitutes a fresh blank node.
    pub objects: Vec<Option<String>>,
    /// Predicate IRI.
    pub predicate: String,
    /// Subject node-type label.
    pub subject_type: Option<String>,
    /// Object node-type labels, padded with absent entries.
    pub object_types: Vec<Option<String>>,
    /// Datatype IRIs, padded with absent entries.
    pub datatypes: Vec<Option<String>>,
}

impl InsertRequest {
    /// Start a request for `predicate`.
    pub fn new(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            ..Self::default()
        }
    }

    /// Set the subject identifier.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the object identifiers.
    pub fn objects<I, S>(mut self, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objects = objects.into_iter().map(|o| Some(o.into())).collect();
        self
    }

    /// Set the subject node-type label.
    pub fn subject_type(mut self, label: impl Into<String>) -> Self {
        self.subject_type = Some(label.into());
        self
    }

    /// Set the object node-type labels.
    pub fn object_types<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object_types = labels.into_iter().map(|l| Some(l.into())).collect();
        self
    }

    /// Set the datatype IRIs.
    pub fn datatypes<I, S>(mut self, iris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datatypes = iris.into_iter().map(|d| Some(d.into())).collect();
        self
    }
}

/// Append-only relationship table.
#[derive(Debug, Clone)]
pub struct RelationshipStore {
    rows: Vec<Relationship>,
    ids: Arc<dyn IdGenerator>,
}

impl Default for RelationshipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipStore {
    /// An empty store generating blank nodes from random UUIDs.
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(UuidGenerator))
    }

    /// An empty store drawing blank-node tokens from `ids`.
    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            rows: Vec::new(),
            ids,
        }
    }

    /// The generator used for blank-node tokens.
    pub fn id_generator(&self) -> &Arc<dyn IdGenerator> {
        &self.ids
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append one row per object in `request`.
    ///
    /// Returns the appended rows. On a validation failure nothing is
    /// appended and no blank-node token is drawn.
    pub fn insert(&mut self, request: InsertRequest) -> Result<Vec<Relationship>, ValidationError> {
        if request.predicate.trim().is_empty() {
            return Err(ValidationError::EmptyPredicate);
        }
        let subject_type = NodeType::parse_subject(request.subject_type.as_deref())?;

        let mut objects = request.objects;
        if objects.is_empty() {
            objects.push(None);
        }
        if request.object_types.len() > objects.len() || request.datatypes.len() > objects.len() {
            tracing::warn!(
                objects = objects.len(),
                object_types = request.object_types.len(),
                datatypes = request.datatypes.len(),
                "extra object types or datatypes ignored"
            );
        }

        let mut object_types = Vec::with_capacity(objects.len());
        for i in 0..objects.len() {
            let label = request.object_types.get(i).and_then(|l| l.as_deref());
            object_types.push(NodeType::parse_object(label)?);
        }

        let (subject, subject_type) = match request.subject {
            Some(s) => (s, subject_type),
            None => (new_blank_node(self.ids.as_ref()), Some(NodeType::Blank)),
        };

        let mut appended = Vec::with_capacity(objects.len());
        for (i, object) in objects.into_iter().enumerate() {
            let (object, object_type) = match object {
                Some(o) => (o, object_types[i]),
                None => (new_blank_node(self.ids.as_ref()), Some(NodeType::Blank)),
            };
            appended.push(Relationship {
                subject: subject.clone(),
                predicate: request.predicate.clone(),
                object,
                subject_type,
                object_type,
                datatype: request.datatypes.get(i).cloned().flatten(),
            });
        }

        tracing::debug!(
            subject = %subject,
            predicate = %request.predicate,
            count = appended.len(),
            "inserted relationships"
        );
        self.rows.extend(appended.iter().cloned());
        Ok(appended)
    }

    /// Record that `subject` documents each of `objects`, plus the inverse
    /// `isDocumentedBy` statement for every object.
    ///
    /// Unlike [`insert`](Self::insert), an empty `objects` list records
    /// nothing: a blank object could not carry the inverse statement back
    /// to anything the caller named.
    pub fn insert_documents<S: AsRef<str>>(
        &mut self,
        subject: &str,
        objects: &[S],
    ) -> Result<(), ValidationError> {
        if objects.is_empty() {
            return Ok(());
        }
        let object_ids: Vec<&str> = objects.iter().map(AsRef::as_ref).collect();
        self.insert(
            InsertRequest::new(cito::DOCUMENTS)
                .subject(subject)
                .objects(object_ids.iter().copied())
                .subject_type("uri")
                .object_types(object_ids.iter().map(|_| "uri")),
        )?;
        for object in object_ids {
            self.insert(
                InsertRequest::new(cito::IS_DOCUMENTED_BY)
                    .subject(object)
                    .objects([subject])
                    .subject_type("uri")
                    .object_types(["uri"]),
            )?;
        }
        Ok(())
    }

    /// Record that every id in `derived` was derived from `source`.
    ///
    /// A derived id equal to `source` is stored as a self-loop.
    pub fn record_derivation<S: AsRef<str>>(
        &mut self,
        source: &str,
        derived: &[S],
    ) -> Result<(), ValidationError> {
        let derived_ids: Vec<&str> = derived.iter().map(AsRef::as_ref).collect();
        for id in derived_ids {
            self.insert(
                InsertRequest::new(prov::WAS_DERIVED_FROM)
                    .subject(id)
                    .objects([source])
                    .subject_type("uri")
                    .object_types(["uri"]),
            )?;
        }
        Ok(())
    }

    /// All rows, sorted ascending by (subject, predicate, object).
    pub fn query(&self) -> Vec<Relationship> {
        let mut rows = self.rows.clone();
        rows.sort();
        rows
    }

    /// Sorted rows with predicate, uri-typed and datatype IRIs shortened to
    /// `prefix:local` where `namespaces` covers them. For display only.
    pub fn condensed(&self, namespaces: &Namespaces) -> Vec<Relationship> {
        let shorten = |iri: &str| namespaces.compact(iri).unwrap_or_else(|| iri.to_string());
        self.query()
            .into_iter()
            .map(|mut row| {
                row.predicate = shorten(&row.predicate);
                if row.subject_type == Some(NodeType::Uri) {
                    row.subject = shorten(&row.subject);
                }
                if row.object_type == Some(NodeType::Uri) {
                    row.object = shorten(&row.object);
                }
                row.datatype = row.datatype.as_deref().map(shorten);
                row
            })
            .collect()
    }
}

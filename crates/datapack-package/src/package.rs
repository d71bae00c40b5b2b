//! # Data Package
//!
//! [`DataPackage`] is the aggregate root: it owns its identifier, a keyed
//! set of [`Member`]s and one [`RelationshipStore`]. Members are keyed by
//! identifier with last-write-wins semantics; relationships are
//! append-only. The identifier is the first token drawn from the
//! package's generator unless [`DataPackage::with_id`] replaces it.
//!
//! ## Invariant
//!
//! Member iteration order is the sorted order of identifiers. Archive
//! manifests and the pid mapping inherit this order, so two packages with
//! the same members stage identical bags.

use std::collections::BTreeMap;
use std::sync::Arc;

use datapack_core::{
    new_blank_node, new_package_id, new_resource_map_id, IdGenerator, Member, UuidGenerator,
    ValidationError,
};
use datapack_rdf::vocab::{prov, provone, rdf};
use datapack_rdf::{
    build_graph, serialize, Graph, InsertRequest, Relationship, RelationshipStore,
    SerializationResult, SerializeOptions, Syntax,
};

/// A collection of members plus the provenance recorded between them.
#[derive(Debug, Clone)]
pub struct DataPackage {
    id: String,
    members: BTreeMap<String, Member>,
    relationships: RelationshipStore,
}

impl Default for DataPackage {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPackage {
    /// An empty package identified by a random `urn:uuid:` id, drawing
    /// tokens from random UUIDs.
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(UuidGenerator))
    }

    /// An empty package drawing every generated token from `ids`,
    /// starting with its own `urn:uuid:` identifier.
    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            id: new_package_id(ids.as_ref()),
            members: BTreeMap::new(),
            relationships: RelationshipStore::with_id_generator(ids),
        }
    }

    /// Replace the generated package identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// The package identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The generator shared by blank nodes and resource map ids.
    pub fn id_generator(&self) -> &Arc<dyn IdGenerator> {
        self.relationships.id_generator()
    }

    /// Add `member`, returning the member it replaced under the same id.
    pub fn add_member(&mut self, member: Member) -> Option<Member> {
        let id = member.id().to_string();
        let previous = self.members.insert(id, member);
        if let Some(prev) = &previous {
            tracing::debug!(id = prev.id(), "replaced package member");
        }
        previous
    }

    /// Remove and return the member stored under `id`.
    pub fn remove_member(&mut self, id: &str) -> Option<Member> {
        self.members.remove(id)
    }

    /// The member stored under `id`.
    pub fn get_member(&self, id: &str) -> Option<&Member> {
        self.members.get(id)
    }

    /// Whether a member is stored under `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    /// Current member identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        self.members.keys().map(String::as_str).collect()
    }

    /// Members in identifier order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the package has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Append relationships; see [`RelationshipStore::insert`].
    pub fn insert_relationship(
        &mut self,
        request: InsertRequest,
    ) -> Result<Vec<Relationship>, ValidationError> {
        self.relationships.insert(request)
    }

    /// Record `cito:documents` from `metadata_id` to each of `data_ids`,
    /// with the inverse `cito:isDocumentedBy` statements.
    pub fn insert_documents<S: AsRef<str>>(
        &mut self,
        metadata_id: &str,
        data_ids: &[S],
    ) -> Result<(), ValidationError> {
        self.relationships.insert_documents(metadata_id, data_ids)
    }

    /// Record that each of `derived_ids` `prov:wasDerivedFrom` `source_id`.
    pub fn record_derivation<S: AsRef<str>>(
        &mut self,
        source_id: &str,
        derived_ids: &[S],
    ) -> Result<(), ValidationError> {
        self.relationships.record_derivation(source_id, derived_ids)
    }

    /// Record one execution of `program` that used `inputs` and generated
    /// `outputs`.
    ///
    /// ```text
    /// _:exec     rdf:type provone:Execution ; prov:used <input> ... ;
    ///            prov:qualifiedAssociation _:assoc .
    /// _:assoc    rdf:type prov:Association ; prov:hadPlan <program> .
    /// <program>  rdf:type provone:Program .
    /// <output>   prov:wasGeneratedBy _:exec ; prov:wasDerivedFrom <input> ... .
    /// ```
    ///
    /// Returns the execution's blank-node token. Validation happens before
    /// any statement is recorded.
    pub fn describe_workflow<S: AsRef<str>>(
        &mut self,
        program: &str,
        inputs: &[S],
        outputs: &[S],
    ) -> Result<String, ValidationError> {
        let blank_ids = |ids: &[S]| {
            ids.iter()
                .map(AsRef::<str>::as_ref)
                .any(|id| id.trim().is_empty())
        };
        if program.trim().is_empty() || blank_ids(inputs) || blank_ids(outputs) {
            return Err(ValidationError::EmptyIdentifier);
        }

        let ids = Arc::clone(self.id_generator());
        let execution = new_blank_node(ids.as_ref());
        let association = new_blank_node(ids.as_ref());
        let store = &mut self.relationships;

        store.insert(typed(&execution, "blank", provone::EXECUTION))?;
        store.insert(typed(program, "uri", provone::PROGRAM))?;
        store.insert(typed(&association, "blank", prov::ASSOCIATION))?;
        store.insert(
            InsertRequest::new(prov::QUALIFIED_ASSOCIATION)
                .subject(execution.as_str())
                .subject_type("blank")
                .objects([association.as_str()])
                .object_types(["blank"]),
        )?;
        store.insert(
            InsertRequest::new(prov::HAD_PLAN)
                .subject(association.as_str())
                .subject_type("blank")
                .objects([program])
                .object_types(["uri"]),
        )?;
        let input_ids: Vec<&str> = inputs.iter().map(AsRef::as_ref).collect();
        if !input_ids.is_empty() {
            store.insert(
                InsertRequest::new(prov::USED)
                    .subject(execution.as_str())
                    .subject_type("blank")
                    .objects(input_ids.iter().copied())
                    .object_types(input_ids.iter().map(|_| "uri")),
            )?;
        }
        let output_ids: Vec<&str> = outputs.iter().map(AsRef::as_ref).collect();
        for output in &output_ids {
            store.insert(
                InsertRequest::new(prov::WAS_GENERATED_BY)
                    .subject(*output)
                    .subject_type("uri")
                    .objects([execution.as_str()])
                    .object_types(["blank"]),
            )?;
        }
        for input in input_ids {
            store.record_derivation(input, &output_ids)?;
        }

        tracing::debug!(
            program,
            inputs = inputs.len(),
            outputs = outputs.len(),
            execution = %execution,
            "recorded workflow execution"
        );
        Ok(execution)
    }

    /// All relationships, sorted by (subject, predicate, object).
    pub fn relationships(&self) -> Vec<Relationship> {
        self.relationships.query()
    }

    /// Whether any relationship has been recorded.
    pub fn has_relationships(&self) -> bool {
        !self.relationships.is_empty()
    }

    /// A fresh resource map identifier from this package's generator.
    pub fn new_resource_map_id(&self) -> String {
        new_resource_map_id(self.id_generator().as_ref())
    }

    /// The OAI-ORE resource map graph for this package under `map_id`.
    pub fn resource_map(&self, map_id: &str, resolve_uri: Option<&str>) -> Graph {
        build_graph(map_id, &self.relationships(), &self.identifiers(), resolve_uri)
    }

    /// Render the resource map under `map_id` in `syntax`.
    pub fn serialize(
        &self,
        map_id: &str,
        syntax: Syntax,
        resolve_uri: Option<&str>,
        options: &SerializeOptions,
    ) -> SerializationResult<Vec<u8>> {
        serialize(&self.resource_map(map_id, resolve_uri), syntax, options)
    }
}

fn typed(subject: &str, subject_type: &str, class: &str) -> InsertRequest {
    InsertRequest::new(rdf::TYPE)
        .subject(subject)
        .subject_type(subject_type)
        .objects([class])
        .object_types(["uri"])
}

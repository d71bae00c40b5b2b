#![deny(missing_docs)]

//! # datapack-rdf: Relationships and Resource Maps
//!
//! The semantic half of a data package: the append-only
//! [`RelationshipStore`] that records provenance between members, and the
//! OAI-ORE resource map built from it and rendered by [`serialize`].
//!
//! ## Pipeline
//!
//! ```text
//! RelationshipStore::query() ─┐
//!                             ├─► build_graph() ─► Graph ─► serialize(Syntax) ─► bytes
//! member identifiers ─────────┘
//! ```
//!
//! ## Determinism
//!
//! [`Graph`] keeps triples in a `BTreeSet`, the store sorts on query, and
//! no writer adds timestamps or generated ids. Identical input therefore
//! yields byte-identical output in every [`Syntax`].

pub mod error;
pub mod graph;
pub mod resource_map;
pub mod serialize;
pub mod store;
pub mod term;
pub mod vocab;

pub use error::{SerializationError, SerializationResult};
pub use graph::Graph;
pub use resource_map::{build_graph, AGGREGATION_FRAGMENT};
pub use serialize::{serialize, serialize_named, SerializeOptions, Syntax};
pub use store::{InsertRequest, Relationship, RelationshipStore};
pub use term::{NodeType, Term, Triple};
pub use vocab::Namespaces;

#![deny(missing_docs)]

//! # datapack-core: Foundational Types for datapack
//!
//! This crate defines the types every other datapack crate depends on. It
//! has no internal crate dependencies, only `serde`, `thiserror`, `uuid`,
//! `sha2` and `md-5` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **One content source per member.** [`Member`] holds either in-memory
//!    bytes or an external file path, never both.
//!
//! 2. **All generated tokens flow through an [`IdGenerator`].** Blank nodes,
//!    package ids and resource-map ids share one source of uniqueness, so a
//!    [`SequentialIdGenerator`] makes every downstream artifact reproducible.
//!
//! 3. **Algorithm-tagged digests.** [`ContentDigest`] always carries its
//!    [`DigestAlgorithm`], which also names the BagIt manifest files.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;
pub mod member;

// Re-export primary types at crate root for ergonomic imports.
pub use digest::{digest_bytes, digest_file, digest_reader, ContentDigest, DigestAlgorithm};
pub use error::ValidationError;
pub use identity::{
    is_blank_token, new_blank_node, new_package_id, new_resource_map_id, IdGenerator,
    SequentialIdGenerator, UuidGenerator, BLANK_NODE_PREFIX,
};
pub use member::{Member, MemberContent};

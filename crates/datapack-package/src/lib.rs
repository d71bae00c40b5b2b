#![deny(missing_docs)]

//! # datapack-package: The Package Model
//!
//! [`DataPackage`] ties members from `datapack-core` to the relationship
//! store and resource map rendering of `datapack-rdf`. It is the single
//! aggregate handed to the bag builder.
//!
//! ## Concurrency
//!
//! A package is not synchronized. Callers that share one across threads
//! wrap it in a mutex; builds read it through `&DataPackage` only.

pub mod package;

pub use package::DataPackage;

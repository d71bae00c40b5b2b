//! # datapack-cli: Bag Tooling
//!
//! Command-line access to finished bags. Packages are built by library
//! callers through `datapack-bag`; the CLI only reads the archives.
//!
//! ## Subcommands
//!
//! - `verify`: recompute manifest digests and Payload-Oxum
//! - `inspect`: print bag-info fields and the pid mapping
//!
//! Handlers write to a caller-supplied sink and return the process exit
//! code, so they are testable without spawning the binary.

pub mod inspect;
pub mod verify;

//! A1 core: runtime-free policy primitives, error types, and the key codec.
//!
//! This crate defines the identifiers, stored records and error surface shared
//! by the mediator and its tests. It carries no runtime or storage
//! dependencies so the key layout can be checked in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! surfaces as `A1Error` or `KeyError` so malformed ids or foreign keys found
//! in the shared namespace never bring the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod keys;
pub mod model;

/// Shared result type.
pub use error::{A1Error, ErrorKind, Resource, Result};
pub use keys::{KeyError, RecordKey};
pub use model::{HandlerId, PolicyInstanceId, PolicyTypeId};

//! Top-level facade crate for the A1 policy service.
//!
//! Re-exports the core types and the mediator library so users can depend on a single crate.

pub mod core {
    pub use a1_core::*;
}

pub mod mediator {
    pub use a1_mediator::*;
}

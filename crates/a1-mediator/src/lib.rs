//! A1 mediator library entry.
//!
//! This crate wires the shared data layer capability, the policy store, the
//! REST surface and metrics into one service. It is consumed by the binary
//! (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod config;
pub mod obs;
pub mod rest;
pub mod router;
pub mod sdl;
pub mod store;

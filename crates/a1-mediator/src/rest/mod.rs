//! A1-P REST handlers.
//!
//! Thin layer: parse path and body, call one store operation, map the outcome
//! to a status code. All policy semantics live in `store`.

pub mod error;
pub mod extract;
pub mod instances;
pub mod ops;
pub mod types;
pub mod validate;

pub use error::ApiError;
pub use extract::ApiPath;

use a1_core::error::Result;
use a1_core::model::{PolicyInstanceId, PolicyTypeId};

fn type_id(raw: u64) -> Result<PolicyTypeId> {
    PolicyTypeId::new(raw)
}

fn instance_id(raw: String) -> Result<PolicyInstanceId> {
    PolicyInstanceId::new(raw)
}

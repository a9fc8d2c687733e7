//! Policy store: typed policy operations over the shared data layer.
//!
//! Every SDL error is classified here; callers only ever see `A1Error`.

pub mod policy_store;
pub mod values;

pub use policy_store::PolicyStore;

use a1_core::error::A1Error;

use crate::sdl::SdlError;

/// Transient SDL faults become `StorageUnavailable`; permanent ones `Internal`.
pub fn classify(err: SdlError) -> A1Error {
    if err.is_transient() {
        A1Error::StorageUnavailable(err.to_string())
    } else {
        A1Error::Internal(err.to_string())
    }
}

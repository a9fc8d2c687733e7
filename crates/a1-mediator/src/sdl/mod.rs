//! Shared data layer (SDL) capability.
//!
//! The policy store never talks to a storage engine directly; it consumes this
//! trait. Every call is scoped to a namespace string. Implementations must give
//! linearizable single-key operations and an atomic `set_if_not_exists`.
//! Multi-key `delete` is not required to be atomic.

pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use memory::InMemorySdl;

/// Errors raised by an SDL backend. Classified by the store before they reach callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SdlError {
    /// Backend unreachable or refusing connections.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Call did not complete in time.
    #[error("backend timeout")]
    Timeout,
    /// Backend understood the call and refused it; retrying will not help.
    #[error("backend rejected call: {0}")]
    Rejected(String),
}

impl SdlError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SdlError::Unavailable(_) | SdlError::Timeout)
    }
}

pub type SdlResult<T> = std::result::Result<T, SdlError>;

#[async_trait]
pub trait SharedDataLayer: Send + Sync {
    /// `None` when the key is absent.
    async fn get(&self, ns: &str, key: &str) -> SdlResult<Option<Bytes>>;
    /// Every key of the namespace, in no particular order.
    async fn get_all(&self, ns: &str) -> SdlResult<Vec<String>>;
    async fn set(&self, ns: &str, key: &str, value: Bytes) -> SdlResult<()>;
    /// Atomic conditional write. `false` means the key already existed and nothing was written.
    async fn set_if_not_exists(&self, ns: &str, key: &str, value: Bytes) -> SdlResult<bool>;
    /// Removes the keys in argument order. Absent keys are ignored.
    async fn delete(&self, ns: &str, keys: &[String]) -> SdlResult<()>;
}

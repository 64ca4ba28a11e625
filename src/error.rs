use thiserror::Error;

/// Errors raised by cache operations and key derivation.
///
/// A failed operation never leaves the cache half-mutated: an oversized
/// insert is rejected before anything is evicted to make room for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The key is not resident (or has already expired).
    #[error("key not found")]
    KeyNotFound,

    /// A single entry weighs more than the whole cache can hold.
    #[error("entry weight {weight} exceeds cache capacity {capacity}")]
    CapacityExceeded { weight: u64, capacity: u64 },

    /// The key function could not build a key from the call arguments.
    #[error("unusable cache key: {0}")]
    UnusableKey(String),
}

impl CacheError {
    pub(crate) fn unusable(reason: impl Into<String>) -> Self {
        CacheError::UnusableKey(reason.into())
    }

    /// `true` for the error that tells a memoizer to bypass the cache.
    pub fn is_unusable_key(&self) -> bool {
        matches!(self, CacheError::UnusableKey(_))
    }
}

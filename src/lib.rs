//! Bounded in-process caches with pluggable eviction, and a memoization
//! layer on top of them.
//!
//! [`Cache`] is a size-bounded map generic over its [`Policy`]: FIFO, LRU,
//! MRU, LFU, random replacement, or TTL with LRU fallback.  Every variant has
//! the same surface, so swapping policies is a type change.  [`memoize`]
//! wraps a function with one of these caches behind a lock, and [`func`]
//! has ready-made memoizers per policy.

mod builder;
mod cache;
mod error;
mod memo;
mod metrics;
pub mod func;
pub mod keys;
pub mod listener;
pub mod policy;
pub mod timer;
pub mod weigher;

pub use builder::CacheBuilder;
pub use cache::{
    Cache, FifoCache, LfuCache, LruCache, MruCache, RrCache, TtlCache, UNBOUNDED,
};
pub use error::CacheError;
pub use memo::{memoize, CacheInfo, Memoize, Memoized};
pub use metrics::stats::Metrics;
pub use policy::Policy;

//! Ready-made memoizers, one per eviction policy.
//!
//! Each preset keys calls by their [`Args`] and takes a `maxsize` (`None`
//! for no size bound) and a `typed` flag choosing between
//! [`Args::key`] and [`Args::typed_key`].
//!
//! ```
//! use boundcache::func::{lru_cache, DEFAULT_MAXSIZE};
//! use boundcache::keys::{Arg, Args};
//!
//! let add = lru_cache(DEFAULT_MAXSIZE, false).wrap(|args: &Args| {
//!     args.positional()
//!         .iter()
//!         .map(|a| match a {
//!             Arg::Int(i) => *i,
//!             _ => 0,
//!         })
//!         .sum::<i128>()
//! });
//! assert_eq!(add.call(&Args::new().arg(2).arg(3)), 5);
//! assert_eq!(add.call(&Args::new().arg(2).arg(3)), 5);
//! assert_eq!(add.cache_info().hits, 1);
//! ```

use std::time::Duration;

use crate::builder::CacheBuilder;
use crate::cache::UNBOUNDED;
use crate::keys::{ArgsKey, ArgsKeyFn};
use crate::memo::{memoize, Memoize};
use crate::policy::fifo::FifoPolicy;
use crate::policy::lfu::LfuPolicy;
use crate::policy::lru::LruPolicy;
use crate::policy::mru::MruPolicy;
use crate::policy::random::{Chooser, RrPolicy};
use crate::policy::ttl::TtlPolicy;
use crate::timer::{MonotonicTimer, Timer};

pub const DEFAULT_MAXSIZE: Option<u64> = Some(128);
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// A memoizer keyed by [`Args`](crate::keys::Args).
pub type Preset<V, P> = Memoize<ArgsKey, V, P, ArgsKeyFn>;

fn builder<V: 'static>(maxsize: Option<u64>) -> CacheBuilder<ArgsKey, V> {
    CacheBuilder::new(maxsize.unwrap_or(UNBOUNDED))
}

pub fn fifo_cache<V: 'static>(
    maxsize: Option<u64>,
    typed: bool,
) -> Preset<V, FifoPolicy<ArgsKey>> {
    memoize(builder(maxsize).fifo(), ArgsKeyFn::new(typed))
}

pub fn lfu_cache<V: 'static>(
    maxsize: Option<u64>,
    typed: bool,
) -> Preset<V, LfuPolicy<ArgsKey>> {
    memoize(builder(maxsize).lfu(), ArgsKeyFn::new(typed))
}

pub fn lru_cache<V: 'static>(
    maxsize: Option<u64>,
    typed: bool,
) -> Preset<V, LruPolicy<ArgsKey>> {
    memoize(builder(maxsize).lru(), ArgsKeyFn::new(typed))
}

pub fn mru_cache<V: 'static>(
    maxsize: Option<u64>,
    typed: bool,
) -> Preset<V, MruPolicy<ArgsKey>> {
    memoize(builder(maxsize).mru(), ArgsKeyFn::new(typed))
}

pub fn rr_cache<V: 'static>(
    maxsize: Option<u64>,
    typed: bool,
) -> Preset<V, RrPolicy<ArgsKey>> {
    memoize(builder(maxsize).random(), ArgsKeyFn::new(typed))
}

pub fn rr_cache_with<V, C>(
    maxsize: Option<u64>,
    chooser: C,
    typed: bool,
) -> Preset<V, RrPolicy<ArgsKey>>
where
    V: 'static,
    C: Chooser<ArgsKey> + 'static,
{
    memoize(builder(maxsize).random_with(chooser), ArgsKeyFn::new(typed))
}

/// `maxsize: None` gives a cache bounded by expiry alone.
pub fn ttl_cache<V: 'static>(
    maxsize: Option<u64>,
    ttl: Duration,
    typed: bool,
) -> Preset<V, TtlPolicy<ArgsKey, MonotonicTimer>> {
    memoize(builder(maxsize).ttl(ttl), ArgsKeyFn::new(typed))
}

pub fn ttl_cache_with_timer<V, T>(
    maxsize: Option<u64>,
    ttl: Duration,
    timer: T,
    typed: bool,
) -> Preset<V, TtlPolicy<ArgsKey, T>>
where
    V: 'static,
    T: Timer,
{
    memoize(builder(maxsize).ttl_with_timer(ttl, timer), ArgsKeyFn::new(typed))
}

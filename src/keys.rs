//! Cache keys for memoized calls.
//!
//! A memoized function needs one hashable value per call.  Plain Rust
//! arguments that are already `Hash + Eq` can be used as is, wrapped in a
//! [`HashedKey`] by [`hashkey`] so the hash is computed at most once.
//! Dynamically shaped calls (positional plus keyword arguments of mixed
//! types) are described with [`Args`] and turned into an [`ArgsKey`].
//!
//! Untyped keys compare numbers by value, so `1`, `1.0` and `true` land on
//! the same entry.  Typed keys also record each argument's kind.
//!
//! ```
//! use boundcache::keys::Args;
//!
//! let a = Args::new().arg(1).kwarg("x", "y").kwarg("n", 2.0);
//! let b = Args::new().arg(true).kwarg("n", 2).kwarg("x", "y");
//! assert_eq!(a.key().unwrap(), b.key().unwrap());
//! assert_ne!(a.typed_key().unwrap(), b.typed_key().unwrap());
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::OnceLock;

use ahash::RandomState;

use crate::error::CacheError;

// Fixed seeds: a key's hash is a pure function of its contents.
const SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let state = RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3]);
    let mut hasher = state.build_hasher();
    value.hash(&mut hasher);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// HashedKey
// ---------------------------------------------------------------------------

/// A key that hashes its contents once, on first use, and replays the cached
/// hash afterwards.
///
/// The contents are never mutated after construction, so the cached hash
/// cannot go stale.
#[derive(Clone)]
pub struct HashedKey<T> {
    value: T,
    hash: OnceLock<u64>,
}

impl<T: Hash> HashedKey<T> {
    pub fn new(value: T) -> Self {
        HashedKey {
            value,
            hash: OnceLock::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn hash_value(&self) -> u64 {
        *self.hash.get_or_init(|| fingerprint(&self.value))
    }
}

impl<T: Hash> Hash for HashedKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl<T: Hash + PartialEq> PartialEq for HashedKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hash_value() == other.hash_value() && self.value == other.value
    }
}

impl<T: Hash + Eq> Eq for HashedKey<T> {}

impl<T: fmt::Debug> fmt::Debug for HashedKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HashedKey").field(&self.value).finish()
    }
}

/// Wraps `value` as a cache key with a lazily memoized hash.
pub fn hashkey<T: Hash + Eq>(value: T) -> HashedKey<T> {
    HashedKey::new(value)
}

// ---------------------------------------------------------------------------
// Call arguments
// ---------------------------------------------------------------------------

/// One argument of a dynamically described call.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Arg>),
}

impl Arg {
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Arg>,
    {
        Arg::Tuple(items.into_iter().map(Into::into).collect())
    }

    fn kind(&self) -> ArgKind {
        match self {
            Arg::None => ArgKind::None,
            Arg::Bool(_) => ArgKind::Bool,
            Arg::Int(_) => ArgKind::Int,
            Arg::Float(_) => ArgKind::Float,
            Arg::Str(_) => ArgKind::Str,
            Arg::Bytes(_) => ArgKind::Bytes,
            Arg::Tuple(_) => ArgKind::Tuple,
        }
    }

    /// Value-only form: numbers that compare equal collapse together.
    fn canonical(&self) -> Result<Part, CacheError> {
        Ok(match self {
            Arg::None => Part::None,
            Arg::Bool(b) => Part::Int(i128::from(*b)),
            Arg::Int(i) => Part::Int(*i),
            Arg::Float(f) => canonical_float(*f)?,
            Arg::Str(s) => Part::Str(s.clone()),
            Arg::Bytes(b) => Part::Bytes(b.clone()),
            Arg::Tuple(items) => Part::Tuple(
                items
                    .iter()
                    .map(Arg::canonical)
                    .collect::<Result<Vec<_>, CacheError>>()?,
            ),
        })
    }
}

fn canonical_float(f: f64) -> Result<Part, CacheError> {
    if f.is_nan() {
        return Err(CacheError::unusable("NaN is not equal to itself"));
    }
    // 2^127 bounds the i128 range exactly.
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
    if f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        return Ok(Part::Int(f as i128));
    }
    Ok(Part::Float(f.to_bits()))
}

macro_rules! arg_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Arg::Int(i128::from(v))
            }
        })*
    };
}

arg_from_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl From<isize> for Arg {
    fn from(v: isize) -> Self {
        Arg::Int(v as i128)
    }
}

impl From<usize> for Arg {
    fn from(v: usize) -> Self {
        Arg::Int(v as i128)
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<f32> for Arg {
    fn from(v: f32) -> Self {
        Arg::Float(f64::from(v))
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Str(v.to_owned())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Str(v)
    }
}

impl From<&[u8]> for Arg {
    fn from(v: &[u8]) -> Self {
        Arg::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Arg {
    fn from(v: Vec<u8>) -> Self {
        Arg::Bytes(v)
    }
}

impl From<()> for Arg {
    fn from(_: ()) -> Self {
        Arg::None
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        v.map_or(Arg::None, Into::into)
    }
}

/// Positional and keyword arguments of one call.
///
/// Keyword order does not matter: `f(a=1, b=2)` and `f(b=2, a=1)` produce
/// the same key.  Setting a keyword twice keeps the last value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    receiver: Option<&'static str>,
    positional: Vec<Arg>,
    keywords: Vec<(String, Arg)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Arg>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Arg>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.keywords.binary_search_by(|(k, _)| k.as_str().cmp(name.as_str())) {
            Ok(at) => self.keywords[at].1 = value,
            Err(at) => self.keywords.insert(at, (name, value)),
        }
        self
    }

    /// Marks the call as a method call on a `T` receiver.
    ///
    /// The receiver itself is not part of the key, only its type: methods of
    /// different types sharing one cache do not collide, while every `T`
    /// instance shares entries.
    pub fn method<T: ?Sized>(mut self) -> Self {
        self.receiver = Some(std::any::type_name::<T>());
        self
    }

    pub fn positional(&self) -> &[Arg] {
        &self.positional
    }

    /// Keyword arguments sorted by name.
    pub fn keywords(&self) -> &[(String, Arg)] {
        &self.keywords
    }

    /// Key comparing arguments by value only.
    pub fn key(&self) -> Result<ArgsKey, CacheError> {
        self.build_key(false)
    }

    /// Key that also distinguishes the kind of each argument, so `1` and
    /// `1.0` are cached separately.
    pub fn typed_key(&self) -> Result<ArgsKey, CacheError> {
        self.build_key(true)
    }

    fn build_key(&self, typed: bool) -> Result<ArgsKey, CacheError> {
        let positional = self
            .positional
            .iter()
            .map(Arg::canonical)
            .collect::<Result<Vec<_>, CacheError>>()?;
        let keywords = self
            .keywords
            .iter()
            .map(|(name, value)| Ok((name.clone(), value.canonical()?)))
            .collect::<Result<Vec<_>, CacheError>>()?;
        let kinds = typed.then(|| {
            self.positional
                .iter()
                .chain(self.keywords.iter().map(|(_, v)| v))
                .map(Arg::kind)
                .collect()
        });
        Ok(ArgsKey(HashedKey::new(KeyRepr {
            receiver: self.receiver,
            positional,
            keywords,
            kinds,
        })))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Part {
    None,
    Int(i128),
    /// Bit pattern of a non-integral, non-NaN float.
    Float(u64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Part>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum ArgKind {
    None,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    Tuple,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct KeyRepr {
    receiver: Option<&'static str>,
    positional: Vec<Part>,
    keywords: Vec<(String, Part)>,
    kinds: Option<Vec<ArgKind>>,
}

/// Cache key derived from [`Args`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ArgsKey(HashedKey<KeyRepr>);

impl fmt::Debug for ArgsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = self.0.get();
        f.debug_struct("ArgsKey")
            .field("positional", &repr.positional)
            .field("keywords", &repr.keywords)
            .field("typed", &repr.kinds.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Key functions
// ---------------------------------------------------------------------------

/// Derives the cache key for one call of a memoized function.
///
/// Returning [`CacheError::UnusableKey`] makes the memoizer call the
/// function directly without touching the cache.
pub trait KeyFn<A: ?Sized>: Send + Sync {
    type Key: Hash + Eq + Clone + Send + 'static;

    fn key(&self, args: &A) -> Result<Self::Key, CacheError>;
}

/// Uses the (cloned) argument itself as the key.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashKey;

impl<A> KeyFn<A> for HashKey
where
    A: Hash + Eq + Clone + Send + Sync + 'static,
{
    type Key = HashedKey<A>;

    fn key(&self, args: &A) -> Result<HashedKey<A>, CacheError> {
        Ok(hashkey(args.clone()))
    }
}

/// Keys [`Args`] calls, typed or untyped.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArgsKeyFn {
    typed: bool,
}

impl ArgsKeyFn {
    pub fn untyped() -> Self {
        ArgsKeyFn { typed: false }
    }

    pub fn typed() -> Self {
        ArgsKeyFn { typed: true }
    }

    pub fn new(typed: bool) -> Self {
        ArgsKeyFn { typed }
    }

    pub fn is_typed(&self) -> bool {
        self.typed
    }
}

impl KeyFn<Args> for ArgsKeyFn {
    type Key = ArgsKey;

    fn key(&self, args: &Args) -> Result<ArgsKey, CacheError> {
        if self.typed {
            args.typed_key()
        } else {
            args.key()
        }
    }
}

/// A key function backed by a closure.
pub struct FnKey<F>(pub F);

impl<A, K, F> KeyFn<A> for FnKey<F>
where
    A: ?Sized,
    K: Hash + Eq + Clone + Send + 'static,
    F: Fn(&A) -> Result<K, CacheError> + Send + Sync,
{
    type Key = K;

    fn key(&self, args: &A) -> Result<K, CacheError> {
        (self.0)(args)
    }
}

//! Map types and hashing used by keyed reconciliation and handler identity.
//!
//! By default these are backed by `hashbrown` with `ahash`; enabling the
//! `std-hash` feature switches both to the standard library.

use std::hash::{Hash, Hasher};

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub type HashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
    pub type HashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;
}

#[cfg(feature = "std-hash")]
fn new_hasher() -> std::collections::hash_map::DefaultHasher {
    std::collections::hash_map::DefaultHasher::new()
}

#[cfg(not(feature = "std-hash"))]
fn new_hasher() -> ahash::AHasher {
    // Fixed keys: the same value must hash identically across renders.
    ahash::AHasher::default()
}

/// Stable 64-bit identity for a hashable value.
#[inline]
pub fn hash_key<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = new_hasher();
    key.hash(&mut hasher);
    hasher.finish()
}

//! Cache entries shared between the evaluation cache and its policy.
//!
//! ```text
//!   ┌────────────────────────────────────────────┐
//!   │               Entry<K, V, T>               │
//!   ├────────────────────────┬───────────────────┤
//!   │  key: K                │  immutable        │
//!   ├────────────────────────┼───────────────────┤
//!   │  value: V              │  replaced on put  │
//!   ├────────────────────────┼───────────────────┤
//!   │  token: T              │  policy-private   │
//!   └────────────────────────┴───────────────────┘
//! ```
//!
//! The cache owns every entry. The policy keeps its own ranking nodes and
//! identifies them through `token`; the cache hands the token back on
//! `record_hit`/`remove` and never interprets it.

/// A resident key/value pair plus the policy's bookkeeping handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V, T> {
    key: K,
    value: V,
    token: T,
}

impl<K, V, T: Copy> Entry<K, V, T> {
    /// Creates an entry. Called by policies from `new_entry`.
    #[inline]
    pub fn new(key: K, value: V, token: T) -> Self {
        Self { key, value, token }
    }

    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Policy handle for this entry.
    #[inline]
    pub fn token(&self) -> T {
        self.token
    }

    #[inline]
    pub fn into_value(self) -> V {
        self.value
    }

    #[inline]
    pub fn into_parts(self) -> (K, V, T) {
        (self.key, self.value, self.token)
    }
}

/// An entry the policy has unregistered in `evict()`.
///
/// Only the key and token travel back; the value stays with the cache until
/// the cache drops the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Victim<K, T> {
    pub key: K,
    pub token: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_accessors() {
        let entry = Entry::new("k", 5, 9u32);
        assert_eq!(entry.key(), &"k");
        assert_eq!(entry.value(), &5);
        assert_eq!(entry.token(), 9);
        assert_eq!(entry.clone().into_value(), 5);
        assert_eq!(entry.into_parts(), ("k", 5, 9));
    }
}

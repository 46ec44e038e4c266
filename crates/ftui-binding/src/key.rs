//! Composite cache key: weak source identity plus normalized member.
//!
//! # Invariants
//!
//! 1. The hash is computed from values captured at construction, so it stays
//!    stable after the source is dropped.
//! 2. A key whose source has been dropped equals nothing, itself included.
//!    Stale slots become unreachable by lookup instead of colliding with a
//!    new source that happens to reuse the address.

use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::member::normalize;
use crate::source::{DataSource, DataSourceRef, identity, weak_identity};

/// Key of a registry slot.
#[derive(Clone)]
pub struct CacheKey {
    source: Weak<dyn DataSource>,
    source_hash: usize,
    member: String,
}

impl CacheKey {
    /// Build a key for `source` and `member` (`member` is lower-cased).
    #[must_use]
    pub fn new(source: &DataSourceRef, member: &str) -> Self {
        Self {
            source: Rc::downgrade(source),
            source_hash: identity(source),
            member: normalize(member),
        }
    }

    /// The normalized member path; empty for the whole source.
    #[must_use]
    pub fn member(&self) -> &str {
        &self.member
    }

    /// The keyed source, if it is still alive.
    #[must_use]
    pub fn source(&self) -> Option<DataSourceRef> {
        self.source.upgrade()
    }

    /// Whether the keyed source is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.source.strong_count() > 0
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.is_alive()
            && other.is_alive()
            && weak_identity(&self.source) == weak_identity(&other.source)
            && self.member == other.member
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source_hash.hash(state);
        self.member.hash(state);
    }
}

impl std::fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheKey")
            .field("source", &format_args!("{:#x}", self.source_hash))
            .field("member", &self.member)
            .field("alive", &self.is_alive())
            .finish()
    }
}

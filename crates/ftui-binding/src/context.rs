#![forbid(unsafe_code)]

//! The binding-manager registry.
//!
//! A [`BindingContext`] resolves `(data source, member path)` pairs to
//! [`BindingManager`]s, building each one on first use and handing back the
//! same instance while it stays alive. Slots hold `Weak` handles: whoever
//! binds through a manager owns it, the registry only remembers it.
//!
//! # Resolution
//!
//! 1. A source with a [`ManagerProvider`](crate::ManagerProvider) is asked
//!    first; a manager it returns bypasses the registry entirely.
//! 2. A live slot for the key is returned as-is.
//! 3. An empty member gets a manager rooted on the source.
//! 4. `"a.b"` resolves `"a"` first, then chains a related manager off it
//!    through property `b` of the parent's item schema.
//! 5. The new manager is stored (reusing a dead slot's key if one exists)
//!    and, under [`ScrubPolicy::AfterInsert`], dead slots are purged.
//!
//! # Invariants
//!
//! 1. At most one live manager per `(source identity, lower-cased member)`.
//! 2. Failed resolution stores nothing for the failing key.
//! 3. `len()` and `entries()` only ever report live slots.
//! 4. [`BindingContext::rebind`] detaches before it attaches, and checks for
//!    cycles before it resolves anything in the new context.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `MissingMember` | Segment not in parent schema | Parents stay cached |
//! | `BindingCycle` | Property chain loops back | Binding left detached |
//! | `NullArgument` | Binding has no live data source | Binding left detached |
//! | Manager reclaimed | Last owner dropped | Next resolve rebuilds |

use std::rc::{Rc, Weak};

use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace};

use crate::binding::Binding;
use crate::config::{ContextOptions, ScrubPolicy};
use crate::error::{BindingError, Result};
use crate::key::CacheKey;
use crate::manager::BindingManager;
use crate::member::split_last;
use crate::source::{DataSourceRef, same_source};

/// Registry of binding managers for one top-level UI container.
///
/// Unsynchronized and `!Send`; confine it to the UI thread.
#[doc(alias = "BindingManagerRegistry")]
pub struct BindingContext {
    slots: AHashMap<CacheKey, Weak<BindingManager>>,
    options: ContextOptions,
}

impl BindingContext {
    /// Create an empty context with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ContextOptions::default())
    }

    #[must_use]
    pub fn with_options(options: ContextOptions) -> Self {
        Self {
            slots: AHashMap::with_capacity(options.capacity),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Manager for the whole of `source`; shorthand for `resolve(source, "")`.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn manager(&mut self, source: &DataSourceRef) -> Result<Rc<BindingManager>> {
        self.resolve(source, "")
    }

    /// Manager for `data_member` of `source`, building it if needed.
    ///
    /// `data_member` is a dot-separated, case-insensitive property path; the
    /// empty string means the source itself.
    ///
    /// # Errors
    ///
    /// [`BindingError::MissingMember`] if a segment of the path is not exposed
    /// by the manager of the preceding prefix.
    pub fn resolve(
        &mut self,
        source: &DataSourceRef,
        data_member: &str,
    ) -> Result<Rc<BindingManager>> {
        if let Some(manager) = source
            .manager_provider()
            .and_then(|provider| provider.related_manager(data_member))
        {
            trace!(member = data_member, "data source provided its own manager");
            return Ok(manager);
        }

        let key = CacheKey::new(source, data_member);
        if let Some(manager) = self.slots.get(&key).and_then(Weak::upgrade) {
            trace!(member = key.member(), "binding manager cache hit");
            return Ok(manager);
        }

        let manager = if data_member.is_empty() {
            BindingManager::for_source(source)
        } else {
            let (path, field) = split_last(data_member);
            let parent = self.resolve(source, path)?;
            let Some(property) = parent.item_properties().find(field, true) else {
                return Err(BindingError::MissingMember {
                    member: field.to_owned(),
                });
            };
            BindingManager::related(&parent, property)
        };
        debug!(
            member = key.member(),
            kind = ?manager.kind(),
            "created binding manager"
        );

        // An occupied entry keeps its original key; only the handle changes.
        let handle = Rc::downgrade(&manager);
        self.slots
            .entry(key)
            .and_modify(|slot| *slot = handle.clone())
            .or_insert(handle);

        if self.options.scrub == ScrubPolicy::AfterInsert {
            self.scrub_expired();
        }
        Ok(manager)
    }

    /// Live manager for the key, without building anything.
    #[must_use]
    pub fn lookup(&self, source: &DataSourceRef, data_member: &str) -> Option<Rc<BindingManager>> {
        self.slots
            .get(&CacheKey::new(source, data_member))
            .and_then(Weak::upgrade)
    }

    /// Whether a live manager is cached for `source` and `data_member`.
    #[must_use]
    pub fn contains(&self, source: &DataSourceRef, data_member: &str) -> bool {
        self.lookup(source, data_member).is_some()
    }

    /// Shorthand for `contains(source, "")`.
    #[must_use]
    pub fn contains_source(&self, source: &DataSourceRef) -> bool {
        self.contains(source, "")
    }

    /// Drop every slot whose manager (or source) is gone.
    pub fn scrub_expired(&mut self) {
        let before = self.slots.len();
        self.slots
            .retain(|key, manager| key.is_alive() && manager.strong_count() > 0);
        let removed = before - self.slots.len();
        if removed > 0 {
            debug!(
                removed,
                remaining = self.slots.len(),
                "scrubbed expired binding managers"
            );
        }
    }

    /// Number of live managers. Scrubs first.
    pub fn len(&mut self) -> usize {
        self.scrub_expired();
        self.slots.len()
    }

    /// Whether no live managers are cached. Scrubs first.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Live `(key, manager)` pairs, in no particular order. Scrubs first.
    pub fn entries(&mut self) -> impl Iterator<Item = (&CacheKey, Rc<BindingManager>)> + '_ {
        self.scrub_expired();
        self.slots
            .iter()
            .filter_map(|(key, manager)| manager.upgrade().map(|manager| (key, manager)))
    }

    /// Always `false`: contexts accept new managers.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        false
    }

    /// Register an externally built `manager` for the whole of `source`.
    ///
    /// The registry still holds it weakly.
    pub fn insert(&mut self, source: &DataSourceRef, manager: &Rc<BindingManager>) {
        let key = CacheKey::new(source, "");
        debug!(kind = ?manager.kind(), "registered external binding manager");
        self.slots.insert(key, Rc::downgrade(manager));
    }

    /// Forget the manager for the whole of `source`. Returns whether a slot
    /// was removed.
    pub fn remove(&mut self, source: &DataSourceRef) -> bool {
        self.slots.remove(&CacheKey::new(source, "")).is_some()
    }

    /// Forget every manager.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Move `binding` from its current manager into `new_context`.
    ///
    /// The binding is always detached from its old manager first. With no new
    /// context it stays detached. Otherwise a property-chain binding is
    /// checked for cycles, then attached to the manager for its data source
    /// and member path.
    ///
    /// # Errors
    ///
    /// - [`BindingError::BindingCycle`] if attaching would close a loop; the
    ///   new context is not touched.
    /// - [`BindingError::NullArgument`] if the binding has no live data source.
    /// - [`BindingError::MissingMember`] if the member path does not resolve.
    ///
    /// In every error case the detach has already happened and is not undone.
    pub fn rebind(new_context: Option<&mut BindingContext>, binding: &Rc<Binding>) -> Result<()> {
        if let Some(old) = binding.manager() {
            old.remove_binding(binding)?;
        }

        let Some(ctx) = new_context else {
            return Ok(());
        };

        if binding.targets_property_manager() {
            if let Some(property) = ctx.find_property_binding_cycle(binding) {
                debug!(
                    property = %property,
                    member = binding.member().member(),
                    "rejected binding that closes a property cycle"
                );
                return Err(BindingError::BindingCycle { property });
            }
        }

        let Some(source) = binding.data_source() else {
            return Err(BindingError::NullArgument {
                name: "data_source",
            });
        };
        let manager = ctx.resolve(&source, binding.member().path())?;
        manager.add_binding(binding)
    }

    /// Whether attaching `candidate` here would make a property depend on
    /// itself.
    ///
    /// Pure: consults only managers that already exist.
    #[must_use]
    pub fn has_property_binding_cycle(&self, candidate: &Binding) -> bool {
        self.find_property_binding_cycle(candidate).is_some()
    }

    fn find_property_binding_cycle(&self, candidate: &Binding) -> Option<String> {
        let mut visited = AHashSet::new();
        self.cycle_from(candidate, &mut visited)
    }

    fn cycle_from(
        &self,
        candidate: &Binding,
        visited: &mut AHashSet<*const Binding>,
    ) -> Option<String> {
        if !visited.insert(std::ptr::from_ref(candidate)) {
            return None;
        }
        let component = candidate.component()?;
        let manager = self.lookup(&component, "")?;
        for existing in manager.bindings() {
            let same_target = existing
                .data_source()
                .is_some_and(|source| same_source(&source, &component));
            if same_target {
                if candidate.member().member() == existing.property_name() {
                    return Some(existing.property_name().to_owned());
                }
            } else if candidate.targets_property_manager() {
                // Lists break the chase.
                if let Some(property) = self.cycle_from(&existing, visited) {
                    return Some(property);
                }
            }
        }
        None
    }
}

impl Default for BindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BindingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let live = self
            .slots
            .values()
            .filter(|manager| manager.strong_count() > 0)
            .count();
        f.debug_struct("BindingContext")
            .field("live", &live)
            .field("options", &self.options)
            .finish()
    }
}

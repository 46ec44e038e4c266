#![forbid(unsafe_code)]

//! Binding-manager registry for FrankenTUI data binding.
//!
//! A [`BindingContext`] lazily creates and caches [`BindingManager`]s: the
//! controllers that sit between a UI property and a data source (a list, a
//! single object, or a nested member path such as `"orders.lines"`).
//!
//! # Architecture
//!
//! - [`DataSource`] is the capability a bound object exposes: list-ness,
//!   a reflected property schema ([`PropertyDescriptors`]) and an optional
//!   [`ManagerProvider`] hook for sources that hand out their own managers.
//! - [`BindingManager`] carries a tagged [`ManagerKind`]. Related managers
//!   chain off a parent manager by a single member segment.
//! - [`Binding`] ties a component property to a data source and member path.
//! - [`BindingContext`] maps `(source identity, lower-cased member)` to a
//!   `Weak<BindingManager>`. The registry never keeps a manager alive.
//!
//! # Ownership
//!
//! ```text
//! component ──Rc──▶ Binding ──Rc──▶ BindingManager ──Rc──▶ parent manager
//!                      ▲                 │
//!                      └──────Weak───────┘
//! Binding, BindingManager ──Weak──▶ component / data source
//! BindingContext ──Weak──▶ BindingManager
//! ```
//!
//! No edge points strongly back at a component or data source, so a
//! component may own bindings to its own properties and still be dropped.
//!
//! # Invariants
//!
//! 1. At most one live manager exists per `(source identity, member)` pair.
//! 2. Resolving `"a.b.c"` resolves `"a.b"` first.
//! 3. Dead slots are purged lazily; count and enumeration never see them.
//! 4. A binding is never attached to two managers at once.
//! 5. A rebind rejected for a cycle leaves the new registry untouched.
//!
//! # Threading
//!
//! Everything here is `Rc`-based and `!Send`. A context is meant to live on
//! the UI thread; callers serialize access themselves.

pub mod binding;
pub mod config;
pub mod context;
pub mod error;
pub mod key;
pub mod manager;
pub mod member;
pub mod schema;
pub mod source;

pub use binding::Binding;
pub use config::{ContextOptions, ScrubPolicy};
pub use context::BindingContext;
pub use error::{BindingError, Result};
pub use key::CacheKey;
pub use manager::{BindingManager, ManagerKind};
pub use member::BindingMemberInfo;
pub use schema::{PropertyDescriptor, PropertyDescriptors, PropertyType, SchemaSource};
pub use source::{DataSource, DataSourceRef, ManagerProvider};

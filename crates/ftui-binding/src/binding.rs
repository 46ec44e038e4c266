#![forbid(unsafe_code)]

//! A single property binding: component property ← data source member.
//!
//! A [`Binding`] says "component `C`'s property `P` shows member `M` of source
//! `S`". It belongs to at most one [`BindingManager`] at a time: the manager
//! for `(S, M.path)` in whichever [`BindingContext`] the component lives in.
//!
//! # Usage
//!
//! ```
//! use std::rc::Rc;
//! use ftui_binding::{
//!     Binding, BindingContext, DataSourceRef, PropertyDescriptor, PropertyDescriptors,
//!     SchemaSource,
//! };
//!
//! let customer: DataSourceRef = Rc::new(SchemaSource::object(PropertyDescriptors::new([
//!     PropertyDescriptor::value("Name"),
//! ])));
//! let label: DataSourceRef = Rc::new(SchemaSource::object(PropertyDescriptors::new([
//!     PropertyDescriptor::value("Text"),
//! ])));
//!
//! let binding = Binding::new("Text", &customer, "Name");
//! binding.set_component(&label);
//!
//! let mut ctx = BindingContext::new();
//! BindingContext::rebind(Some(&mut ctx), &binding).unwrap();
//! assert!(binding.is_attached());
//! ```
//!
//! # Invariants
//!
//! 1. The component and the data source are held weakly, so a component that
//!    owns bindings to its own properties can still be dropped. The manager
//!    is held strongly while attached, which is what keeps registry-built
//!    managers alive.
//! 2. The member string is kept as given; only cache keys lower-case it.
//!
//! [`BindingContext`]: crate::BindingContext

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::manager::{BindingManager, ManagerKind};
use crate::member::BindingMemberInfo;
use crate::source::{DataSource, DataSourceRef};

/// Ties a component property to a data source member.
pub struct Binding {
    property_name: String,
    data_source: Option<Weak<dyn DataSource>>,
    member: BindingMemberInfo,
    component: RefCell<Option<Weak<dyn DataSource>>>,
    manager: RefCell<Option<Rc<BindingManager>>>,
}

impl Binding {
    /// Bind component property `property_name` to `data_member` of `data_source`.
    #[must_use]
    pub fn new(
        property_name: impl Into<String>,
        data_source: &DataSourceRef,
        data_member: &str,
    ) -> Rc<Self> {
        Self::build(
            property_name.into(),
            Some(Rc::downgrade(data_source)),
            data_member,
        )
    }

    /// A binding with no data source yet.
    ///
    /// Rebinding it into a context fails with
    /// [`BindingError::NullArgument`](crate::BindingError::NullArgument).
    #[must_use]
    pub fn unsourced(property_name: impl Into<String>, data_member: &str) -> Rc<Self> {
        Self::build(property_name.into(), None, data_member)
    }

    fn build(
        property_name: String,
        data_source: Option<Weak<dyn DataSource>>,
        member: &str,
    ) -> Rc<Self> {
        Rc::new(Self {
            property_name,
            data_source,
            member: BindingMemberInfo::new(member),
            component: RefCell::new(None),
            manager: RefCell::new(None),
        })
    }

    /// Name of the bound property on the component.
    #[must_use]
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// The bound data source, if one was given and it is still alive.
    #[must_use]
    pub fn data_source(&self) -> Option<DataSourceRef> {
        self.data_source.as_ref().and_then(Weak::upgrade)
    }

    #[must_use]
    pub fn member(&self) -> &BindingMemberInfo {
        &self.member
    }

    /// The component whose property is bound, if set and still alive.
    #[must_use]
    pub fn component(&self) -> Option<DataSourceRef> {
        self.component.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Record the component that owns this binding.
    pub fn set_component(&self, component: &DataSourceRef) {
        *self.component.borrow_mut() = Some(Rc::downgrade(component));
    }

    /// The manager currently holding this binding.
    #[must_use]
    pub fn manager(&self) -> Option<Rc<BindingManager>> {
        self.manager.borrow().clone()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.manager.borrow().is_some()
    }

    pub(crate) fn set_manager(&self, manager: Option<Rc<BindingManager>>) {
        *self.manager.borrow_mut() = manager;
    }

    /// Whether this binding's target resolves to a single-object manager.
    ///
    /// Decided from the source's schema; nothing is constructed. Unsourced
    /// bindings, dropped sources and unresolvable paths answer `false`.
    ///
    /// A source with a [`ManagerProvider`](crate::ManagerProvider) is still
    /// classified by its schema. The manager the provider hands to
    /// [`BindingContext::resolve`](crate::BindingContext::resolve) may be of
    /// another kind, and cycle detection follows this answer, not that one.
    #[must_use]
    pub fn targets_property_manager(&self) -> bool {
        self.data_source().is_some_and(|source| {
            ManagerKind::classify(&source, self.member.path())
                .is_some_and(ManagerKind::is_property_manager)
        })
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("property_name", &self.property_name)
            .field("member", &self.member.member())
            .field("attached", &self.is_attached())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PropertyDescriptor, PropertyDescriptors, SchemaSource};

    fn customer() -> DataSourceRef {
        Rc::new(SchemaSource::object(PropertyDescriptors::new([
            PropertyDescriptor::value("Name"),
            PropertyDescriptor::list(
                "Orders",
                PropertyDescriptors::new([PropertyDescriptor::value("Total")]),
            ),
        ])))
    }

    #[test]
    fn member_is_parsed() {
        let src = customer();
        let binding = Binding::new("Text", &src, "Orders.Total");
        assert_eq!(binding.property_name(), "Text");
        assert_eq!(binding.member().path(), "Orders");
        assert_eq!(binding.member().field(), "Total");
        assert!(binding.data_source().is_some());
    }

    #[test]
    fn data_source_is_weak() {
        let binding = {
            let src = customer();
            let binding = Binding::new("Text", &src, "Name");
            assert!(binding.targets_property_manager());
            binding
        };
        assert!(binding.data_source().is_none());
        assert!(!binding.targets_property_manager());
    }

    #[test]
    fn component_is_weak() {
        let src = customer();
        let binding = Binding::new("Text", &src, "Name");
        assert!(binding.component().is_none());
        {
            let label = customer();
            binding.set_component(&label);
            assert!(binding.component().is_some());
        }
        assert!(binding.component().is_none());
    }

    #[test]
    fn unattached_by_default() {
        let binding = Binding::unsourced("Text", "Name");
        assert!(!binding.is_attached());
        assert!(binding.manager().is_none());
        assert!(binding.data_source().is_none());
    }

    #[test]
    fn property_target_classification() {
        let src = customer();
        assert!(Binding::new("Text", &src, "Name").targets_property_manager());
        assert!(!Binding::new("Text", &src, "Orders.Total").targets_property_manager());
        assert!(!Binding::new("Text", &src, "Missing.Total").targets_property_manager());
        assert!(!Binding::unsourced("Text", "Name").targets_property_manager());

        let list: DataSourceRef = Rc::new(SchemaSource::list(PropertyDescriptors::empty()));
        assert!(!Binding::new("Text", &list, "Name").targets_property_manager());
    }

    #[test]
    fn debug_format() {
        let src = customer();
        let binding = Binding::new("Text", &src, "Name");
        let debug = format!("{binding:?}");
        assert!(debug.contains("property_name: \"Text\""));
        assert!(debug.contains("attached: false"));
    }
}

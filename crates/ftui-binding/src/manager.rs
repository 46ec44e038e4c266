#![forbid(unsafe_code)]

//! Binding managers: the controllers between bound properties and a source.
//!
//! A manager is either rooted directly on a data source ([`ManagerKind::List`]
//! or [`ManagerKind::Property`]) or chained off a parent manager through one
//! member segment ([`ManagerKind::RelatedList`] or
//! [`ManagerKind::RelatedProperty`]).
//!
//! # Ownership
//!
//! A manager holds its parent strongly and its data source weakly. Attached
//! bindings hold their manager strongly and the manager lists them weakly, so
//! a manager lives exactly as long as something binds through it (or a caller
//! keeps the handle returned by the registry). Nothing here keeps a source
//! alive; that stays with the application.
//!
//! # Invariants
//!
//! 1. A binding appears at most once in a manager's collection.
//! 2. A binding's back-reference names the manager that lists it, or nothing.
//! 3. Dropped bindings vanish from the collection; counts never include them.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::binding::Binding;
use crate::error::{BindingError, Result};
use crate::schema::{PropertyDescriptor, PropertyDescriptors};
use crate::source::{DataSource, DataSourceRef};

/// What a manager tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerKind {
    /// Position-tracking manager over a list source.
    List,
    /// Single-object manager over a non-list source.
    Property,
    /// List manager chained off a parent through a list-valued property.
    RelatedList,
    /// Single-object manager chained off a parent through a value property.
    RelatedProperty,
}

impl ManagerKind {
    /// Whether this kind tracks a single object (plain or related).
    ///
    /// Cycle detection only follows chains of these.
    #[must_use]
    pub const fn is_property_manager(self) -> bool {
        matches!(self, Self::Property | Self::RelatedProperty)
    }

    /// Whether this kind is chained off a parent manager.
    #[must_use]
    pub const fn is_related(self) -> bool {
        matches!(self, Self::RelatedList | Self::RelatedProperty)
    }

    /// Kind of manager `member` would resolve to on `source`.
    ///
    /// Walks the reflected schema only; no manager is built. Returns `None`
    /// when a segment is not exposed.
    #[must_use]
    pub fn classify(source: &DataSourceRef, member: &str) -> Option<Self> {
        if member.is_empty() {
            return Some(Self::for_root(source));
        }
        let mut properties = source.item_properties();
        let mut kind = None;
        for segment in member.split('.') {
            let prop = properties.find(segment, true)?;
            kind = Some(Self::for_related(prop));
            properties = prop.nested().clone();
        }
        kind
    }

    fn for_root(source: &DataSourceRef) -> Self {
        if source.is_list() {
            Self::List
        } else {
            Self::Property
        }
    }

    fn for_related(prop: &PropertyDescriptor) -> Self {
        if prop.property_type().is_list() {
            Self::RelatedList
        } else {
            Self::RelatedProperty
        }
    }
}

/// Mediates between bound UI properties and one data path.
pub struct BindingManager {
    kind: ManagerKind,
    source: Weak<dyn DataSource>,
    parent: Option<Rc<BindingManager>>,
    field: Option<String>,
    properties: PropertyDescriptors,
    bindings: RefCell<Vec<Weak<Binding>>>,
}

impl BindingManager {
    fn build(
        kind: ManagerKind,
        source: Weak<dyn DataSource>,
        parent: Option<Rc<Self>>,
        field: Option<String>,
        properties: PropertyDescriptors,
    ) -> Rc<Self> {
        Rc::new(Self {
            kind,
            source,
            parent,
            field,
            properties,
            bindings: RefCell::new(Vec::new()),
        })
    }

    /// Manager rooted on `source`: list-tracking for list sources,
    /// single-object otherwise.
    #[must_use]
    pub fn for_source(source: &DataSourceRef) -> Rc<Self> {
        Self::build(
            ManagerKind::for_root(source),
            Rc::downgrade(source),
            None,
            None,
            source.item_properties(),
        )
    }

    /// Manager chained off `parent` through `property`.
    ///
    /// List-valued properties get a related list manager, anything else a
    /// related property manager.
    #[must_use]
    pub fn related(parent: &Rc<Self>, property: &PropertyDescriptor) -> Rc<Self> {
        Self::build(
            ManagerKind::for_related(property),
            Weak::clone(&parent.source),
            Some(Rc::clone(parent)),
            Some(property.name().to_owned()),
            property.nested().clone(),
        )
    }

    #[must_use]
    pub fn kind(&self) -> ManagerKind {
        self.kind
    }

    /// Shorthand for `self.kind().is_property_manager()`.
    #[must_use]
    pub fn is_property_manager(&self) -> bool {
        self.kind.is_property_manager()
    }

    /// The root data source this manager (or its chain) is built on, if it
    /// is still alive.
    #[must_use]
    pub fn data_source(&self) -> Option<DataSourceRef> {
        self.source.upgrade()
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Rc<BindingManager>> {
        self.parent.as_ref()
    }

    /// Member segment this manager follows from its parent, as declared.
    #[must_use]
    pub fn data_field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Bindable properties of the current item.
    #[must_use]
    pub fn item_properties(&self) -> &PropertyDescriptors {
        &self.properties
    }

    /// Snapshot of the live attached bindings, in attach order.
    #[must_use]
    pub fn bindings(&self) -> Vec<Rc<Binding>> {
        self.bindings
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings
            .borrow()
            .iter()
            .filter(|b| b.strong_count() > 0)
            .count()
    }

    #[must_use]
    pub fn contains_binding(&self, binding: &Rc<Binding>) -> bool {
        self.position(binding).is_some()
    }

    fn position(&self, binding: &Rc<Binding>) -> Option<usize> {
        self.bindings
            .borrow()
            .iter()
            .position(|b| std::ptr::eq(b.as_ptr(), Rc::as_ptr(binding)))
    }

    /// Attach `binding` to this manager.
    ///
    /// # Errors
    ///
    /// [`BindingError::DuplicateBinding`] if the binding is already held here
    /// or by another manager.
    pub fn add_binding(self: &Rc<Self>, binding: &Rc<Binding>) -> Result<()> {
        if binding.is_attached() || self.contains_binding(binding) {
            return Err(BindingError::DuplicateBinding {
                property: binding.property_name().to_owned(),
            });
        }
        {
            let mut bindings = self.bindings.borrow_mut();
            bindings.retain(|b| b.strong_count() > 0);
            bindings.push(Rc::downgrade(binding));
        }
        binding.set_manager(Some(Rc::clone(self)));
        Ok(())
    }

    /// Detach `binding` from this manager.
    ///
    /// # Errors
    ///
    /// [`BindingError::ForeignBinding`] if this manager does not hold it.
    pub fn remove_binding(&self, binding: &Rc<Binding>) -> Result<()> {
        let Some(index) = self.position(binding) else {
            return Err(BindingError::ForeignBinding {
                property: binding.property_name().to_owned(),
            });
        };
        {
            let mut bindings = self.bindings.borrow_mut();
            bindings.remove(index);
            bindings.retain(|b| b.strong_count() > 0);
        }
        binding.set_manager(None);
        Ok(())
    }
}

impl std::fmt::Debug for BindingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingManager")
            .field("kind", &self.kind)
            .field("field", &self.field)
            .field("binding_count", &self.binding_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaSource;
    use crate::source::same_source;

    fn customer() -> DataSourceRef {
        Rc::new(SchemaSource::object(PropertyDescriptors::new([
            PropertyDescriptor::value("Name"),
            PropertyDescriptor::object(
                "Address",
                PropertyDescriptors::new([PropertyDescriptor::value("City")]),
            ),
            PropertyDescriptor::list(
                "Orders",
                PropertyDescriptors::new([PropertyDescriptor::value("Total")]),
            ),
        ])))
    }

    #[test]
    fn root_kind_follows_list_ness() {
        let object = customer();
        let list: DataSourceRef = Rc::new(SchemaSource::list(PropertyDescriptors::empty()));
        assert_eq!(BindingManager::for_source(&object).kind(), ManagerKind::Property);
        assert_eq!(BindingManager::for_source(&list).kind(), ManagerKind::List);
    }

    #[test]
    fn related_kind_follows_property_type() {
        let src = customer();
        let root = BindingManager::for_source(&src);

        let orders = root.item_properties().find("orders", true).unwrap().clone();
        let related = BindingManager::related(&root, &orders);
        assert_eq!(related.kind(), ManagerKind::RelatedList);
        assert_eq!(related.data_field(), Some("Orders"));
        assert!(Rc::ptr_eq(related.parent().unwrap(), &root));
        assert!(related.item_properties().find("Total", false).is_some());

        let address = root.item_properties().find("Address", false).unwrap().clone();
        let related = BindingManager::related(&root, &address);
        assert_eq!(related.kind(), ManagerKind::RelatedProperty);
        assert!(related.is_property_manager());
    }

    #[test]
    fn classify_without_building() {
        let src = customer();
        assert_eq!(ManagerKind::classify(&src, ""), Some(ManagerKind::Property));
        assert_eq!(
            ManagerKind::classify(&src, "orders"),
            Some(ManagerKind::RelatedList)
        );
        assert_eq!(
            ManagerKind::classify(&src, "Address.City"),
            Some(ManagerKind::RelatedProperty)
        );
        assert_eq!(ManagerKind::classify(&src, "Address.Zip"), None);
    }

    #[test]
    fn kind_predicates() {
        assert!(ManagerKind::Property.is_property_manager());
        assert!(ManagerKind::RelatedProperty.is_property_manager());
        assert!(!ManagerKind::List.is_property_manager());
        assert!(!ManagerKind::RelatedList.is_property_manager());
        assert!(ManagerKind::RelatedList.is_related());
        assert!(!ManagerKind::Property.is_related());
    }

    #[test]
    fn add_and_remove_binding() {
        let src = customer();
        let manager = BindingManager::for_source(&src);
        let binding = Binding::new("Text", &src, "Name");

        manager.add_binding(&binding).unwrap();
        assert_eq!(manager.binding_count(), 1);
        assert!(manager.contains_binding(&binding));
        assert!(Rc::ptr_eq(&binding.manager().unwrap(), &manager));

        manager.remove_binding(&binding).unwrap();
        assert_eq!(manager.binding_count(), 0);
        assert!(binding.manager().is_none());
    }

    #[test]
    fn duplicate_add_rejected() {
        let src = customer();
        let manager = BindingManager::for_source(&src);
        let binding = Binding::new("Text", &src, "Name");
        manager.add_binding(&binding).unwrap();

        let err = manager.add_binding(&binding).unwrap_err();
        assert_eq!(
            err,
            BindingError::DuplicateBinding {
                property: "Text".into()
            }
        );
        assert_eq!(manager.binding_count(), 1);

        let other = BindingManager::for_source(&src);
        assert!(other.add_binding(&binding).is_err());
        assert_eq!(other.binding_count(), 0);
    }

    #[test]
    fn foreign_remove_rejected() {
        let src = customer();
        let manager = BindingManager::for_source(&src);
        let binding = Binding::new("Text", &src, "Name");

        let err = manager.remove_binding(&binding).unwrap_err();
        assert!(matches!(err, BindingError::ForeignBinding { .. }));
    }

    #[test]
    fn attached_binding_keeps_manager_alive() {
        let src = customer();
        let binding = Binding::new("Text", &src, "Name");
        let weak = {
            let manager = BindingManager::for_source(&src);
            manager.add_binding(&binding).unwrap();
            Rc::downgrade(&manager)
        };
        assert!(weak.upgrade().is_some());

        drop(binding);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn dropped_binding_leaves_collection() {
        let src = customer();
        let manager = BindingManager::for_source(&src);
        let kept = Binding::new("Text", &src, "Name");
        manager.add_binding(&kept).unwrap();
        {
            let transient = Binding::new("Tag", &src, "Name");
            manager.add_binding(&transient).unwrap();
            assert_eq!(manager.binding_count(), 2);
        }
        assert_eq!(manager.binding_count(), 1);
        assert!(Rc::ptr_eq(&manager.bindings()[0], &kept));
    }

    #[test]
    fn source_is_held_weakly() {
        let src = customer();
        let root = BindingManager::for_source(&src);
        let address = root.item_properties().find("Address", false).unwrap().clone();
        let related = BindingManager::related(&root, &address);
        assert!(same_source(&related.data_source().unwrap(), &src));

        drop(src);
        assert!(root.data_source().is_none());
        assert!(related.data_source().is_none());
        assert_eq!(related.kind(), ManagerKind::RelatedProperty);
    }

    #[test]
    fn debug_format() {
        let src = customer();
        let manager = BindingManager::for_source(&src);
        let debug = format!("{manager:?}");
        assert!(debug.contains("Property"));
        assert!(debug.contains("binding_count: 0"));
    }
}

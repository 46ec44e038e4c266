//! Data-source capability and identity helpers.

use std::rc::{Rc, Weak};

use crate::manager::BindingManager;
use crate::schema::PropertyDescriptors;

/// Shared handle to a data source. Identity is the `Rc` allocation.
pub type DataSourceRef = Rc<dyn DataSource>;

/// Anything a UI property can be bound to.
///
/// Components that own bindings are data sources too, so a binding's
/// component and another binding's data source can be compared by identity.
pub trait DataSource {
    /// Whether the source behaves as a list (or hands out a list).
    ///
    /// List sources get a position-tracking manager; everything else gets a
    /// single-object property manager.
    fn is_list(&self) -> bool {
        false
    }

    /// Bindable properties of the source (of its items, for lists).
    fn item_properties(&self) -> PropertyDescriptors;

    /// Hook for sources that manage their own binding managers.
    fn manager_provider(&self) -> Option<&dyn ManagerProvider> {
        None
    }
}

/// A data source that supplies its own managers, bypassing the registry.
pub trait ManagerProvider {
    /// Manager for `data_member`, or `None` to fall back to the registry.
    fn related_manager(&self, data_member: &str) -> Option<Rc<BindingManager>>;
}

/// Address of the source allocation, used as its identity hash.
pub(crate) fn identity(source: &DataSourceRef) -> usize {
    Rc::as_ptr(source).cast::<()>() as usize
}

pub(crate) fn weak_identity(source: &Weak<dyn DataSource>) -> usize {
    Weak::as_ptr(source).cast::<()>() as usize
}

/// Identity comparison; ignores vtable pointers.
#[must_use]
pub fn same_source(a: &DataSourceRef, b: &DataSourceRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

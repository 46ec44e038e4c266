//! Reflected property schema.
//!
//! Managers do not inspect data directly. Each [`DataSource`] describes its
//! bindable properties as a [`PropertyDescriptors`] tree, and related
//! managers walk that tree one member segment at a time.

use std::rc::Rc;

use crate::source::DataSource;

/// Declared type of a bindable property, as far as binding cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// A single value or object.
    Value,
    /// A list of items.
    List,
}

impl PropertyType {
    /// Whether a manager for this property should track a list position.
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::List)
    }
}

/// A single bindable property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: String,
    ty: PropertyType,
    nested: PropertyDescriptors,
}

impl PropertyDescriptor {
    /// A leaf value property with no nested members.
    #[must_use]
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: PropertyType::Value,
            nested: PropertyDescriptors::empty(),
        }
    }

    /// An object-valued property exposing `nested` members.
    #[must_use]
    pub fn object(name: impl Into<String>, nested: PropertyDescriptors) -> Self {
        Self {
            name: name.into(),
            ty: PropertyType::Value,
            nested,
        }
    }

    /// A list-valued property whose items expose `items` members.
    #[must_use]
    pub fn list(name: impl Into<String>, items: PropertyDescriptors) -> Self {
        Self {
            name: name.into(),
            ty: PropertyType::List,
            nested: items,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn property_type(&self) -> PropertyType {
        self.ty
    }

    /// Members of the property's value (or of each item, for lists).
    #[must_use]
    pub fn nested(&self) -> &PropertyDescriptors {
        &self.nested
    }
}

/// An immutable, cheaply cloned set of [`PropertyDescriptor`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptors {
    items: Rc<[PropertyDescriptor]>,
}

impl PropertyDescriptors {
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = PropertyDescriptor>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Rc::from(Vec::new()),
        }
    }

    /// Find a property by name.
    ///
    /// With `ignore_case`, names are compared in lower-cased form. The first
    /// match in declaration order wins.
    #[must_use]
    pub fn find(&self, name: &str, ignore_case: bool) -> Option<&PropertyDescriptor> {
        if ignore_case {
            let wanted = name.to_lowercase();
            self.items
                .iter()
                .find(|prop| prop.name.to_lowercase() == wanted)
        } else {
            self.items.iter().find(|prop| prop.name == name)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for PropertyDescriptors {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<PropertyDescriptor> for PropertyDescriptors {
    fn from_iter<I: IntoIterator<Item = PropertyDescriptor>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// A data source whose shape is fixed by a schema.
///
/// Useful for record types known up front, and as a stand-in data source in
/// tests. Every `SchemaSource` is a distinct identity, even when two are built
/// from the same schema.
///
/// # Example
///
/// ```
/// use ftui_binding::{PropertyDescriptor, PropertyDescriptors, SchemaSource};
///
/// let customer = SchemaSource::object(PropertyDescriptors::new([
///     PropertyDescriptor::value("Name"),
///     PropertyDescriptor::list(
///         "Orders",
///         PropertyDescriptors::new([PropertyDescriptor::value("Total")]),
///     ),
/// ]));
/// assert!(customer.properties().find("orders", true).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct SchemaSource {
    is_list: bool,
    properties: PropertyDescriptors,
}

impl SchemaSource {
    /// A single object exposing `properties`.
    #[must_use]
    pub fn object(properties: PropertyDescriptors) -> Self {
        Self {
            is_list: false,
            properties,
        }
    }

    /// A list whose items expose `item_properties`.
    #[must_use]
    pub fn list(item_properties: PropertyDescriptors) -> Self {
        Self {
            is_list: true,
            properties: item_properties,
        }
    }

    #[must_use]
    pub fn properties(&self) -> &PropertyDescriptors {
        &self.properties
    }
}

impl DataSource for SchemaSource {
    fn is_list(&self) -> bool {
        self.is_list
    }

    fn item_properties(&self) -> PropertyDescriptors {
        self.properties.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_schema() -> PropertyDescriptors {
        PropertyDescriptors::new([
            PropertyDescriptor::value("Name"),
            PropertyDescriptor::object(
                "Address",
                PropertyDescriptors::new([PropertyDescriptor::value("City")]),
            ),
            PropertyDescriptor::list(
                "Orders",
                PropertyDescriptors::new([PropertyDescriptor::value("Total")]),
            ),
        ])
    }

    #[test]
    fn find_exact_case() {
        let schema = customer_schema();
        assert!(schema.find("Name", false).is_some());
        assert!(schema.find("name", false).is_none());
    }

    #[test]
    fn find_ignoring_case() {
        let schema = customer_schema();
        let prop = schema.find("ADDRESS", true).unwrap();
        assert_eq!(prop.name(), "Address");
        assert_eq!(prop.property_type(), PropertyType::Value);
        assert!(prop.nested().find("city", true).is_some());
    }

    #[test]
    fn list_property_type() {
        let schema = customer_schema();
        let orders = schema.find("orders", true).unwrap();
        assert!(orders.property_type().is_list());
        assert_eq!(orders.nested().len(), 1);
    }

    #[test]
    fn schema_source_shape() {
        let list = SchemaSource::list(customer_schema());
        let object = SchemaSource::object(PropertyDescriptors::empty());
        assert!(list.is_list());
        assert!(!object.is_list());
        assert_eq!(list.item_properties().len(), 3);
        assert!(object.item_properties().is_empty());
    }
}

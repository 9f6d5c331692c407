//! Attribute access for collection items.
//!
//! Items are either structured records, where an attribute is a key lookup,
//! or addressable objects implementing [`AttributeSource`], where an
//! attribute is a named zero-argument accessor. [`Item`] is the tagged union
//! of both; [`get_attribute`] resolves a name against either shape.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::{Record, Value};

/// Types whose attributes can be read by name.
///
/// Usually derived with `#[derive(Attributes)]` from `quarry-macros`
/// (re-exported under the `derive` feature), but simple to write by hand.
///
/// # Manual Implementation
///
/// ```
/// use quarry::{AttributeSource, Value};
///
/// struct Page {
///     title: String,
///     views: u64,
/// }
///
/// impl AttributeSource for Page {
///     fn attribute(&self, name: &str) -> Option<Value> {
///         match name {
///             "title" => Some(Value::from(&self.title)),
///             "views" => Some(Value::from(self.views)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait AttributeSource {
    /// Returns the value of the named attribute.
    ///
    /// `None` means the type has no accessor by that name. Records never
    /// return `None`; a missing key reads as [`Value::Null`].
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Names of the attributes this value exposes, used for serialization.
    fn attribute_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Name of the implementing type, used in diagnostics.
    fn source_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Resolves an attribute on an item.
///
/// Records resolve missing keys to [`Value::Null`].
///
/// # Panics
///
/// Panics when an addressable item has no accessor with the given name.
/// Callers are expected to name only attributes the item's type exposes.
pub fn get_attribute<T: AttributeSource + ?Sized>(item: &T, name: &str) -> Value {
    match item.attribute(name) {
        Some(value) => value,
        None => panic!(
            "call to undefined attribute accessor `{}` on `{}`",
            name,
            item.source_name()
        ),
    }
}

impl AttributeSource for Record {
    fn attribute(&self, name: &str) -> Option<Value> {
        Some(self.get(name).cloned().unwrap_or_default())
    }
}

impl AttributeSource for Value {
    fn attribute(&self, name: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.attribute(name),
            _ => Some(Value::Null),
        }
    }
}

impl<T: AttributeSource + ?Sized> AttributeSource for Arc<T> {
    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        (**self).attribute_names()
    }

    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }
}

impl<T: AttributeSource + ?Sized> AttributeSource for &T {
    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        (**self).attribute_names()
    }

    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }
}

/// A heterogeneous collection item.
///
/// Cloning an `Item` shares the underlying record or object; nothing is
/// deep-copied, so collections derived from one another share their items.
#[derive(Clone)]
pub enum Item {
    /// A structured record; attributes are key lookups.
    Record(Arc<Record>),
    /// An addressable object; attributes are accessor calls.
    Object(Arc<dyn AttributeSource + Send + Sync>),
}

impl Item {
    /// Wraps a record.
    pub fn record(record: Record) -> Self {
        Item::Record(Arc::new(record))
    }

    /// Wraps an addressable object.
    pub fn object<S: AttributeSource + Send + Sync + 'static>(source: S) -> Self {
        Item::Object(Arc::new(source))
    }

    /// Returns the record, if this item is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Item::Record(record) => Some(record),
            Item::Object(_) => None,
        }
    }

    /// Returns `true` if both items point at the same underlying data.
    pub fn ptr_eq(&self, other: &Item) -> bool {
        match (self, other) {
            (Item::Record(a), Item::Record(b)) => Arc::ptr_eq(a, b),
            (Item::Object(a), Item::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl AttributeSource for Item {
    fn attribute(&self, name: &str) -> Option<Value> {
        match self {
            Item::Record(record) => record.attribute(name),
            Item::Object(object) => object.attribute(name),
        }
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        match self {
            Item::Record(_) => &[],
            Item::Object(object) => object.attribute_names(),
        }
    }

    fn source_name(&self) -> &'static str {
        match self {
            Item::Record(_) => "record",
            Item::Object(object) => object.source_name(),
        }
    }
}

impl From<Record> for Item {
    fn from(record: Record) -> Self {
        Item::record(record)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Record(record) => f.debug_tuple("Record").field(record).finish(),
            Item::Object(object) => f.debug_tuple("Object").field(&object.source_name()).finish(),
        }
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Item::Record(record) => Record::serialize(record, serializer),
            Item::Object(object) => {
                let names = object.attribute_names();
                let mut map = serializer.serialize_map(Some(names.len()))?;
                for name in names {
                    map.serialize_entry(name, &object.attribute(name).unwrap_or_default())?;
                }
                map.end()
            }
        }
    }
}

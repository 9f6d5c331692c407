//! Derive macros for quarry.
//!
//! - [`Attributes`] - Implement `AttributeSource` for structs with named fields

mod attributes;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `quarry::AttributeSource` for a struct with named fields.
///
/// Every field becomes an attribute named after the field. The field type
/// must convert into `quarry::Value` (strings, numbers, booleans, vectors
/// and options of those) and be `Clone`.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `skip` | Do not expose this field |
/// | `rename = "..."` | Expose the field under another name |
///
/// # Generated Code
///
/// 1. Attribute name constants (e.g., `Page::TITLE`, `Page::MODIFIED_AT`)
/// 2. `AttributeSource::attribute()`, returning `None` for unknown names
/// 3. `AttributeSource::attribute_names()`, in field order
///
/// # Example
///
/// ```ignore
/// use quarry::{Attributes, Collection, Item};
///
/// #[derive(Attributes)]
/// struct Page {
///     title: String,
///     #[attribute(rename = "modifiedAt")]
///     modified_at: i64,
///     #[attribute(skip)]
///     body: String,
/// }
///
/// let pages: Collection = [
///     ("home", Item::object(Page { title: "Home".into(), modified_at: 2, body: String::new() })),
///     ("about", Item::object(Page { title: "About".into(), modified_at: 1, body: String::new() })),
/// ]
/// .into_iter()
/// .collect();
///
/// let sorted = pages.sort_by([Page::MODIFIED_AT]).unwrap();
/// assert_eq!(sorted.keys().collect::<Vec<_>>(), ["about", "home"]);
/// ```
#[proc_macro_derive(Attributes, attributes(attribute))]
pub fn attributes_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    attributes::attributes_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

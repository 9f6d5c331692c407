//! Implementation of the `#[derive(Attributes)]` macro.
//!
//! Generates an `AttributeSource` implementation and attribute name
//! constants from a struct's named fields.

mod attrs;
mod derive;

pub use derive::attributes_derive_impl;

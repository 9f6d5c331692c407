//! Quarry - Ordered, queryable collections of heterogeneous items.
//!
//! Quarry keeps items under case-insensitive string keys in insertion order
//! and offers the usual ways of narrowing them down:
//!
//! - Attribute filtering with a fixed set of operators (`==`, `>`, `*=`,
//!   `between`, `match`, `maxWords`, ...)
//! - Multi-key stable sorting with per-key direction and comparison mode
//! - Slicing, chunking, flipping and shuffling
//! - Pagination windows
//! - Declarative queries that combine all of the above
//!
//! Every transform returns a new [`Collection`]; items are shared between
//! the source and the result, never copied.
//!
//! # Quick Start
//!
//! ```rust
//! use quarry::{record, Collection, Item, QuerySpec};
//!
//! let pages: Collection = [
//!     ("home", Item::record(record([("title", "Home"), ("status", "listed")]))),
//!     ("about", Item::record(record([("title", "About"), ("status", "listed")]))),
//!     ("drafts", Item::record(record([("title", "Drafts"), ("status", "draft")]))),
//! ]
//! .into_iter()
//! .collect();
//!
//! let listed = pages
//!     .filter_by("status", "==", ["listed"])
//!     .unwrap()
//!     .sort_by(["title", "asc"])
//!     .unwrap();
//! assert_eq!(listed.keys().collect::<Vec<_>>(), ["about", "home"]);
//!
//! let spec = QuerySpec::new().not(["home"]).sort_by("title desc").limit(5);
//! let result = pages.query(&spec).unwrap();
//! assert_eq!(result.keys().collect::<Vec<_>>(), ["drafts", "about"]);
//! ```
//!
//! # Items
//!
//! An [`Item`] is either a structured record, where attributes are key
//! lookups and missing keys read as [`Value::Null`], or an object
//! implementing [`AttributeSource`], where attributes are named accessors.
//! Asking an object for an accessor it does not have is a programming error
//! and panics. With the `derive` feature, `#[derive(Attributes)]`
//! implements [`AttributeSource`] for plain structs.
//!
//! # Operators
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `==`, `!=` | Loose equality / inequality |
//! | `<`, `<=`, `>`, `>=`, `between` | Range comparison |
//! | `*=`, `!*=`, `^=`, `$=` | Contains, not contains, starts with, ends with |
//! | `in`, `not in` | Membership in a candidate list |
//! | `match` | Regular expression |
//! | `maxLength`, `minLength`, `maxWords`, `minWords` | Text length and word count |
//!
//! Extra tokens can be registered through [`EngineConfig::aliases`].
//!
//! # Query Order
//!
//! [`QuerySpec`] stages always run in the same order:
//!
//! ```text
//! not → filterBy → offset → limit → sortBy → paginate
//! ```

mod attribute;
mod clause;
mod collection;
mod config;
mod error;
mod filter;
mod op;
mod ordering;
mod pagination;
pub mod predicate;
mod query;
mod value;

// Re-export public API
pub use attribute::{get_attribute, AttributeSource, Item};
pub use clause::{Clause, Predicate};
pub use collection::{Collection, CollectionBuilder, Iter};
pub use config::EngineConfig;
pub use error::{QuarryError, Result};
pub use filter::Filter;
pub use op::{Op, OperatorTable};
pub use ordering::{
    compare_values, parse_criteria, Dir, KeySource, SortColumn, SortCriterion, SortMode,
};
pub use pagination::Pagination;
pub use query::{FilterRule, PaginateSpec, QueryEngine, QuerySpec, SortSpec};
pub use value::{record, Number, Record, Value};

#[cfg(feature = "derive")]
pub use quarry_macros::Attributes;

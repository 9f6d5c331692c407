//! Filtering and lookup.
//!
//! Filtering keeps the items whose extracted attribute satisfies an
//! operator, or that pass an arbitrary predicate. Operators are resolved
//! through an [`OperatorTable`]; the plain methods use the table of
//! [`QueryEngine::standard`], the `_with` variants take one explicitly.

use std::fmt;

use crate::attribute::{get_attribute, AttributeSource, Item};
use crate::clause::{Clause, Predicate};
use crate::collection::Collection;
use crate::error::{QuarryError, Result};
use crate::op::OperatorTable;
use crate::query::QueryEngine;
use crate::value::Value;

/// What to filter by.
///
/// # Example
///
/// ```
/// use quarry::{get_attribute, record, Clause, Collection, Filter, Item, Value};
///
/// let pages: Collection = [
///     ("a", Item::record(record([("score", 10)]))),
///     ("b", Item::record(record([("score", 20)]))),
/// ]
/// .into_iter()
/// .collect();
///
/// let high = pages.filter(Clause::new("score", ">", [15])).unwrap();
/// assert_eq!(high.keys().collect::<Vec<_>>(), ["b"]);
///
/// let low = pages
///     .filter(Filter::predicate(|item: &Item| {
///         get_attribute(item, "score") == Value::from(10)
///     }))
///     .unwrap();
/// assert_eq!(low.keys().collect::<Vec<_>>(), ["a"]);
/// ```
pub enum Filter<T = Item> {
    /// Clauses that must all hold, applied in order.
    Clauses(Vec<Clause>),
    /// An arbitrary test on the item.
    Predicate(Box<dyn Fn(&T) -> bool>),
}

impl<T> Filter<T> {
    /// Wraps a closure.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Builds clauses from dynamic input: an array of argument arrays, each
    /// either `[field, value]` or `[field, operator, values...]`.
    pub fn from_value(spec: &Value) -> Result<Self> {
        let rules = spec.as_array().ok_or_else(|| {
            QuarryError::InvalidFilterSpec(format!(
                "expected an array of filter rules, got {}",
                spec.type_name()
            ))
        })?;
        let clauses = rules
            .iter()
            .map(|rule| match rule.as_array() {
                Some(args) => Clause::from_args(args),
                None => Err(QuarryError::InvalidFilterSpec(format!(
                    "expected a filter rule array, got {}",
                    rule.type_name()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Filter::Clauses(clauses))
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Clauses(clauses) => f.debug_tuple("Clauses").field(clauses).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<T> From<Clause> for Filter<T> {
    fn from(clause: Clause) -> Self {
        Filter::Clauses(vec![clause])
    }
}

impl<T> From<Vec<Clause>> for Filter<T> {
    fn from(clauses: Vec<Clause>) -> Self {
        Filter::Clauses(clauses)
    }
}

impl<T: AttributeSource + Clone> Collection<T> {
    /// Applies a [`Filter`] using the standard operator table.
    pub fn filter(&self, filter: impl Into<Filter<T>>) -> Result<Self> {
        self.filter_with(filter, QueryEngine::standard().operators())
    }

    /// Applies a [`Filter`], resolving operators through `operators`.
    ///
    /// All clauses are compiled before any item is tested, so a bad clause
    /// fails the whole call.
    pub fn filter_with(
        &self,
        filter: impl Into<Filter<T>>,
        operators: &OperatorTable,
    ) -> Result<Self> {
        match filter.into() {
            Filter::Predicate(test) => Ok(self.filter_fn(test)),
            Filter::Clauses(clauses) => {
                let compiled = clauses
                    .iter()
                    .map(|clause| {
                        clause
                            .compile(operators)
                            .map(|predicate| (clause.field.as_str(), predicate))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.retain_matching(&compiled))
            }
        }
    }

    /// Keeps the items for which `test` returns `true`.
    pub fn filter_fn<F>(&self, test: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        let keep: Vec<bool> = self.values().map(test).collect();
        self.retain_positions(&keep)
    }

    /// Keeps the items whose `field` satisfies `operator` with `values`.
    ///
    /// ```
    /// use quarry::{record, Collection, Item};
    ///
    /// let pages: Collection = [
    ///     ("a", Item::record(record([("title", "Home")]))),
    ///     ("b", Item::record(record([("title", "About")]))),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let found = pages.filter_by("title", "^=", ["Ho"]).unwrap();
    /// assert_eq!(found.count(), 1);
    /// assert!(pages.filter_by("title", "~=", ["x"]).is_err());
    /// ```
    pub fn filter_by<V, I>(&self, field: &str, operator: &str, values: I) -> Result<Self>
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.filter_by_with(field, operator, values, QueryEngine::standard().operators())
    }

    /// [`filter_by`](Collection::filter_by) with an explicit operator table.
    pub fn filter_by_with<V, I>(
        &self,
        field: &str,
        operator: &str,
        values: I,
        operators: &OperatorTable,
    ) -> Result<Self>
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.filter_with(Clause::new(field, operator, values), operators)
    }

    /// Keeps the items whose `field` loosely equals `value`.
    pub fn filter_eq(&self, field: &str, value: impl Into<Value>) -> Result<Self> {
        self.filter(Clause::eq(field, value))
    }

    fn retain_matching(&self, compiled: &[(&str, Predicate)]) -> Self {
        let mut result = self.clone();
        for (field, predicate) in compiled {
            let before = result.count();
            let keep: Vec<bool> = result
                .values()
                .map(|item| predicate.test(&get_attribute(item, field)))
                .collect();
            result = result.retain_positions(&keep);
            tracing::trace!(
                field = *field,
                op = %predicate.op(),
                before,
                after = result.count(),
                "applied filter clause"
            );
        }
        result
    }

    /// The first item whose `field` loosely equals `value`.
    pub fn find_by(&self, field: &str, value: impl Into<Value>) -> Option<&T> {
        let value = value.into();
        self.values()
            .find(|item| get_attribute(*item, field).loose_eq(&value))
    }
}

impl<T: Clone> Collection<T> {
    /// Looks up a single key, ignoring case.
    pub fn find(&self, key: &str) -> Option<&T> {
        self.get(key)
    }

    /// Collects the given keys, in the given order, into a new collection.
    /// Missing keys are left out.
    pub fn find_many<K, I>(&self, keys: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        let order: Vec<usize> = keys
            .into_iter()
            .filter_map(|key| self.index_of(key.as_ref()))
            .collect();
        let mut seen = vec![false; self.count()];
        let order: Vec<usize> = order
            .into_iter()
            .filter(|&position| !std::mem::replace(&mut seen[position], true))
            .collect();
        self.reorder(&order)
    }
}

//! Declarative queries and the engine that runs them.
//!
//! A [`QuerySpec`] bundles the usual collection operations into one value
//! that can be built in code or loaded from JSON/YAML. [`QueryEngine`] runs
//! it against a collection in a fixed order, whatever order the fields were
//! written in:
//!
//! ```text
//! not → filterBy (each rule, in order) → offset → limit → sortBy → paginate
//! ```
//!
//! Every stage is optional. A failing stage fails the whole query; the
//! source collection is never modified.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::attribute::AttributeSource;
use crate::clause::Clause;
use crate::collection::Collection;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::op::{Op, OperatorTable};
use crate::value::Value;

/// A structured query.
///
/// # Example
///
/// ```
/// use quarry::QuerySpec;
///
/// let spec = QuerySpec::from_json(r#"{
///     "filterBy": [{"field": "score", "operator": ">", "value": 15}],
///     "sortBy": "score desc",
///     "paginate": {"limit": 5}
/// }"#).unwrap();
///
/// assert_eq!(spec.filter_by.len(), 1);
/// assert_eq!(spec.sort_tokens(), ["score", "desc"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuerySpec {
    /// Keys to exclude.
    pub not: Vec<String>,
    /// Filter rules, applied in order.
    pub filter_by: Vec<FilterRule>,
    /// Number of items to skip.
    pub offset: Option<usize>,
    /// Maximum number of items to keep.
    pub limit: Option<usize>,
    /// Sort criteria.
    pub sort_by: Option<SortSpec>,
    /// Page window.
    pub paginate: Option<PaginateSpec>,
}

/// One `filterBy` entry of a [`QuerySpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    /// The attribute to test. Rules without one are skipped.
    #[serde(default)]
    pub field: String,
    #[serde(default = "default_operator")]
    pub operator: String,
    /// A single operand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Several operands, used when `value` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

fn default_operator() -> String {
    Op::Equals.token().to_string()
}

impl FilterRule {
    /// Creates a rule with a single operand.
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterRule {
            field: field.into(),
            operator: operator.into(),
            value: Some(value.into()),
            values: None,
        }
    }

    /// The operands, or `None` when the rule has neither `value` nor
    /// `values`.
    pub fn operands(&self) -> Option<Vec<Value>> {
        match (&self.value, &self.values) {
            (Some(value), _) => Some(vec![value.clone()]),
            (None, Some(values)) => Some(values.clone()),
            (None, None) => None,
        }
    }

    /// The rule as a [`Clause`], if it names a field and has operands.
    pub fn to_clause(&self) -> Option<Clause> {
        if self.field.trim().is_empty() {
            return None;
        }
        self.operands()
            .map(|values| Clause::new(self.field.as_str(), self.operator.as_str(), values))
    }
}

/// Sort criteria as a single string or a list of strings.
///
/// Either way every element is split on whitespace, so `"score desc"` and
/// `["score", "desc"]` mean the same thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortSpec {
    Single(String),
    List(Vec<String>),
}

impl SortSpec {
    /// The whitespace-separated tokens.
    pub fn tokens(&self) -> Vec<String> {
        let parts: &[String] = match self {
            SortSpec::Single(single) => std::slice::from_ref(single),
            SortSpec::List(list) => list,
        };
        parts
            .iter()
            .flat_map(|part| part.split_whitespace())
            .map(str::to_string)
            .collect()
    }
}

impl From<&str> for SortSpec {
    fn from(criteria: &str) -> Self {
        SortSpec::Single(criteria.to_string())
    }
}

impl From<Vec<String>> for SortSpec {
    fn from(criteria: Vec<String>) -> Self {
        SortSpec::List(criteria)
    }
}

/// Page window as a bare limit or as `{limit, page}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaginateSpec {
    Limit(usize),
    Options {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page: Option<usize>,
    },
}

impl PaginateSpec {
    /// Resolves the window against the configured defaults.
    pub fn resolve(&self, config: &EngineConfig) -> (usize, usize) {
        match *self {
            PaginateSpec::Limit(limit) => (limit, config.default_page),
            PaginateSpec::Options { limit, page } => (
                limit.unwrap_or(config.default_page_limit),
                page.unwrap_or(config.default_page),
            ),
        }
    }
}

impl QuerySpec {
    /// Creates an empty query.
    ///
    /// An empty query returns the collection unchanged.
    pub fn new() -> Self {
        QuerySpec::default()
    }

    /// Parses a query from JSON.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parses a query from YAML.
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    /// Excludes the given keys.
    pub fn not<K, I>(mut self, keys: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        self.not.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Adds a filter rule.
    pub fn filter_by(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filter_by.push(FilterRule::new(field, operator, value));
        self
    }

    /// Adds a filter rule with several operands.
    pub fn filter_by_values<V, I>(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        values: I,
    ) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.filter_by.push(FilterRule {
            field: field.into(),
            operator: operator.into(),
            value: None,
            values: Some(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Sets the number of items to skip.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Sets the maximum number of items.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the sort criteria.
    pub fn sort_by(mut self, criteria: impl Into<SortSpec>) -> Self {
        self.sort_by = Some(criteria.into());
        self
    }

    /// Requests page `page` of `limit` items.
    pub fn paginate(mut self, limit: usize, page: usize) -> Self {
        self.paginate = Some(PaginateSpec::Options {
            limit: Some(limit),
            page: Some(page),
        });
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// The sort tokens, split on whitespace. Empty when there is no sort.
    pub fn sort_tokens(&self) -> Vec<String> {
        self.sort_by.as_ref().map(SortSpec::tokens).unwrap_or_default()
    }

    /// Returns `true` if the query has no stages.
    pub fn is_empty(&self) -> bool {
        self.not.is_empty()
            && self.filter_by.is_empty()
            && self.offset.is_none()
            && self.limit.is_none()
            && self.sort_by.is_none()
            && self.paginate.is_none()
    }
}

static STANDARD: Lazy<QueryEngine> = Lazy::new(|| QueryEngine {
    operators: OperatorTable::standard(),
    config: EngineConfig::default(),
});

/// Runs filters and queries with a fixed operator table and configuration.
///
/// ```
/// use quarry::{record, Collection, EngineConfig, Item, QueryEngine, QuerySpec};
///
/// let engine = QueryEngine::new(EngineConfig::default().with_alias("gt", ">")).unwrap();
/// let scores: Collection = [("a", 10), ("b", 20), ("c", 30)]
///     .into_iter()
///     .map(|(key, score)| (key, Item::record(record([("score", score)]))))
///     .collect();
///
/// let spec = QuerySpec::new().filter_by("score", "gt", 15).sort_by("score desc");
/// let result = engine.query(&scores, &spec).unwrap();
/// assert_eq!(result.keys().collect::<Vec<_>>(), ["c", "b"]);
/// ```
#[derive(Debug, Clone)]
pub struct QueryEngine {
    operators: OperatorTable,
    config: EngineConfig,
}

impl QueryEngine {
    /// Builds an engine from a configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(QueryEngine {
            operators: config.operator_table()?,
            config,
        })
    }

    /// The shared engine with the standard operators and default settings.
    pub fn standard() -> &'static QueryEngine {
        &STANDARD
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Keeps the items whose `field` satisfies `operator` with `values`.
    pub fn filter_by<T, V, I>(
        &self,
        collection: &Collection<T>,
        field: &str,
        operator: &str,
        values: I,
    ) -> Result<Collection<T>>
    where
        T: AttributeSource + Clone,
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        collection.filter_by_with(field, operator, values, &self.operators)
    }

    /// Runs a query.
    pub fn query<T>(&self, collection: &Collection<T>, spec: &QuerySpec) -> Result<Collection<T>>
    where
        T: AttributeSource + Clone,
    {
        let mut result = collection.clone();

        if !spec.not.is_empty() {
            result = result.not(&spec.not);
            tracing::debug!(excluded = spec.not.len(), remaining = result.count(), "query: not");
        }

        for rule in &spec.filter_by {
            match rule.to_clause() {
                Some(clause) => {
                    result = result.filter_with(clause, &self.operators)?;
                    tracing::debug!(
                        field = %rule.field,
                        operator = %rule.operator,
                        remaining = result.count(),
                        "query: filterBy"
                    );
                }
                None if rule.field.trim().is_empty() => tracing::warn!(
                    operator = %rule.operator,
                    "query: skipping filterBy rule without field"
                ),
                None => tracing::warn!(
                    field = %rule.field,
                    operator = %rule.operator,
                    "query: skipping filterBy rule without value"
                ),
            }
        }

        if let Some(offset) = spec.offset {
            result = result.offset(offset);
            tracing::debug!(offset, remaining = result.count(), "query: offset");
        }

        if let Some(limit) = spec.limit {
            result = result.limit(limit);
            tracing::debug!(limit, remaining = result.count(), "query: limit");
        }

        if let Some(sort) = &spec.sort_by {
            let tokens = sort.tokens();
            result = result.sort_by(&tokens)?;
            tracing::debug!(criteria = ?tokens, "query: sortBy");
        }

        if let Some(paginate) = &spec.paginate {
            let (limit, page) = paginate.resolve(&self.config);
            result = result.paginate(limit, page)?;
            tracing::debug!(limit, page, remaining = result.count(), "query: paginate");
        }

        Ok(result)
    }
}

impl<T: AttributeSource + Clone> Collection<T> {
    /// Runs a query with the standard engine.
    pub fn query(&self, spec: &QuerySpec) -> Result<Self> {
        QueryEngine::standard().query(self, spec)
    }
}

//! Filter operators and the table that resolves operator tokens.
//!
//! The [`Op`] enum is the closed set of comparison operators. An
//! [`OperatorTable`] maps the tokens used in `filter_by` calls and query
//! specs (`"=="`, `">"`, `"between"`, ...) onto those operators. The table is
//! an ordinary value: build one, add aliases, and hand it to a
//! [`QueryEngine`](crate::QueryEngine).

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{QuarryError, Result};

/// Filter operator.
///
/// Each operator is bound to one predicate of the
/// [`predicate`](crate::predicate) library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Op {
    /// Size of the value lies within `[min, max]` (`between`).
    Between,
    /// String contains substring, or array contains element (`*=`).
    Contains,
    /// Negation of `Contains` (`!*=`).
    NotContains,
    /// String ends with suffix (`$=`).
    EndsWith,
    /// Loose equality (`==`).
    Equals,
    /// Value is one of the given candidates (`in`).
    In,
    /// Value is none of the given candidates (`not in`).
    NotIn,
    /// Strictly below the bound (`<`).
    Less,
    /// At most the bound (`<=`).
    Max,
    /// Strictly above the bound (`>`).
    More,
    /// At least the bound (`>=`).
    Min,
    /// Loose inequality (`!=`).
    Different,
    /// String starts with prefix (`^=`).
    StartsWith,
    /// String matches a regular expression (`match`).
    Match,
    /// Trimmed character count is at most the bound (`maxLength`).
    MaxLength,
    /// Trimmed character count is at least the bound (`minLength`).
    MinLength,
    /// Word count is at most the bound (`maxWords`).
    MaxWords,
    /// Word count is at least the bound (`minWords`).
    MinWords,
}

impl Op {
    /// Every operator, in table order.
    pub const ALL: [Op; 18] = [
        Op::Between,
        Op::Contains,
        Op::NotContains,
        Op::EndsWith,
        Op::Equals,
        Op::In,
        Op::NotIn,
        Op::Less,
        Op::Max,
        Op::More,
        Op::Min,
        Op::Different,
        Op::StartsWith,
        Op::Match,
        Op::MaxLength,
        Op::MinLength,
        Op::MaxWords,
        Op::MinWords,
    ];

    /// The canonical token for this operator.
    pub fn token(self) -> &'static str {
        match self {
            Op::Between => "between",
            Op::Contains => "*=",
            Op::NotContains => "!*=",
            Op::EndsWith => "$=",
            Op::Equals => "==",
            Op::In => "in",
            Op::NotIn => "not in",
            Op::Less => "<",
            Op::Max => "<=",
            Op::More => ">",
            Op::Min => ">=",
            Op::Different => "!=",
            Op::StartsWith => "^=",
            Op::Match => "match",
            Op::MaxLength => "maxLength",
            Op::MinLength => "minLength",
            Op::MaxWords => "maxWords",
            Op::MinWords => "minWords",
        }
    }

    /// The name of the predicate this operator is bound to.
    pub fn predicate_name(self) -> &'static str {
        match self {
            Op::Between => "between",
            Op::Contains => "contains",
            Op::NotContains => "notContains",
            Op::EndsWith => "endsWith",
            Op::Equals => "equals",
            Op::In => "in",
            Op::NotIn => "notIn",
            Op::Less => "less",
            Op::Max => "max",
            Op::More => "more",
            Op::Min => "min",
            Op::Different => "different",
            Op::StartsWith => "startsWith",
            Op::Match => "match",
            Op::MaxLength => "maxLength",
            Op::MinLength => "minLength",
            Op::MaxWords => "maxWords",
            Op::MinWords => "minWords",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Mapping from operator token to [`Op`].
///
/// Lookup is exact: tokens are case-sensitive and not trimmed.
///
/// ```
/// use quarry::{Op, OperatorTable};
///
/// let table = OperatorTable::standard().with_alias("eq", Op::Equals);
/// assert_eq!(table.resolve("==").unwrap(), Op::Equals);
/// assert_eq!(table.resolve("eq").unwrap(), Op::Equals);
/// assert!(table.resolve("~=").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorTable {
    entries: BTreeMap<String, Op>,
}

impl OperatorTable {
    /// The standard table: every operator under its canonical token.
    pub fn standard() -> Self {
        OperatorTable {
            entries: Op::ALL
                .iter()
                .map(|op| (op.token().to_string(), *op))
                .collect(),
        }
    }

    /// Registers an additional token for an operator.
    pub fn with_alias(mut self, token: impl Into<String>, op: Op) -> Self {
        self.entries.insert(token.into(), op);
        self
    }

    /// Registers `alias` as another token for whatever `target` resolves to.
    pub fn alias_token(self, alias: impl Into<String>, target: &str) -> Result<Self> {
        let op = self.resolve(target)?;
        Ok(self.with_alias(alias, op))
    }

    /// Resolves a token to its operator.
    pub fn resolve(&self, token: &str) -> Result<Op> {
        self.entries
            .get(token)
            .copied()
            .ok_or_else(|| QuarryError::unknown_operator(token))
    }

    /// Returns `true` if the token is registered.
    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// Iterates over all registered tokens and their operators.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Op)> {
        self.entries.iter().map(|(token, op)| (token.as_str(), *op))
    }

    /// Number of registered tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no tokens are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        OperatorTable::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_has_every_token() {
        let table = OperatorTable::standard();
        assert_eq!(table.len(), Op::ALL.len());
        for op in Op::ALL {
            assert_eq!(table.resolve(op.token()).unwrap(), op);
        }
    }

    #[test]
    fn symbolic_tokens() {
        let table = OperatorTable::standard();
        assert_eq!(table.resolve("*=").unwrap(), Op::Contains);
        assert_eq!(table.resolve("!*=").unwrap(), Op::NotContains);
        assert_eq!(table.resolve("$=").unwrap(), Op::EndsWith);
        assert_eq!(table.resolve("^=").unwrap(), Op::StartsWith);
        assert_eq!(table.resolve("not in").unwrap(), Op::NotIn);
        assert_eq!(table.resolve("<=").unwrap(), Op::Max);
        assert_eq!(table.resolve(">=").unwrap(), Op::Min);
    }

    #[test]
    fn lookup_is_exact() {
        let table = OperatorTable::standard();
        assert!(table.resolve("MATCH").is_err());
        assert!(table.resolve(" ==").is_err());
        // Predicate names are not tokens unless they coincide
        assert!(table.resolve("contains").is_err());
    }

    #[test]
    fn unknown_token_is_reported() {
        let err = OperatorTable::standard().resolve("~=").unwrap_err();
        match err {
            QuarryError::UnknownOperator { token } => assert_eq!(token, "~="),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn aliases() {
        let table = OperatorTable::standard()
            .with_alias("gt", Op::More)
            .alias_token("eq", "==")
            .unwrap();
        assert_eq!(table.resolve("gt").unwrap(), Op::More);
        assert_eq!(table.resolve("eq").unwrap(), Op::Equals);
        assert!(table.contains("eq"));
        assert!(OperatorTable::standard().alias_token("x", "nope").is_err());
    }

    #[test]
    fn op_display() {
        assert_eq!(Op::Equals.to_string(), "==");
        assert_eq!(Op::NotIn.to_string(), "not in");
        assert_eq!(Op::MaxWords.predicate_name(), "maxWords");
    }
}

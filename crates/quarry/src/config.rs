//! Engine configuration.
//!
//! [`EngineConfig`] is plain data, usually loaded from YAML or JSON:
//!
//! ```yaml
//! default_page_limit: 20
//! default_page: 1
//! aliases:
//!   eq: "=="
//!   gt: ">"
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};
use crate::op::OperatorTable;

/// Settings for a [`QueryEngine`](crate::QueryEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Items per page when a query's `paginate` gives no limit.
    pub default_page_limit: usize,
    /// Page number when a query's `paginate` gives no page.
    pub default_page: usize,
    /// Extra operator tokens, mapped to the token they stand for.
    pub aliases: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_page_limit: 10,
            default_page: 1,
            aliases: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parses a configuration from YAML.
    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Adds an operator alias.
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    /// Sets the default page limit.
    pub fn with_default_page_limit(mut self, limit: usize) -> Self {
        self.default_page_limit = limit;
        self
    }

    /// Checks the settings that cannot be expressed in the types.
    pub fn validate(&self) -> Result<()> {
        if self.default_page_limit == 0 {
            return Err(QuarryError::InvalidArgument(
                "default_page_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Builds the standard operator table extended with the aliases.
    ///
    /// Aliases resolve against the standard tokens only, so an alias of an
    /// alias is rejected.
    pub fn operator_table(&self) -> Result<OperatorTable> {
        let standard = OperatorTable::standard();
        let mut table = OperatorTable::standard();
        for (alias, target) in &self.aliases {
            table = table.with_alias(alias.as_str(), standard.resolve(target)?);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Op;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_page_limit, 10);
        assert_eq!(config.default_page, 1);
        assert!(config.aliases.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = EngineConfig::from_yaml("default_page_limit: 25\n").unwrap();
        assert_eq!(config.default_page_limit, 25);
        assert_eq!(config.default_page, 1);
    }

    #[test]
    fn yaml_aliases() {
        let yaml = "aliases:\n  eq: \"==\"\n  gt: \">\"\n";
        let table = EngineConfig::from_yaml(yaml).unwrap().operator_table().unwrap();
        assert_eq!(table.resolve("eq").unwrap(), Op::Equals);
        assert_eq!(table.resolve("gt").unwrap(), Op::More);
        assert_eq!(table.resolve("==").unwrap(), Op::Equals);
    }

    #[test]
    fn json_config() {
        let config = EngineConfig::from_json(r#"{"default_page": 2}"#).unwrap();
        assert_eq!(config.default_page, 2);
        assert_eq!(config.default_page_limit, 10);
    }

    #[test]
    fn alias_to_unknown_token() {
        let err = EngineConfig::default()
            .with_alias("approx", "~=")
            .operator_table()
            .unwrap_err();
        assert!(matches!(err, QuarryError::UnknownOperator { ref token } if token == "~="));
    }

    #[test]
    fn zero_page_limit_is_invalid() {
        let config = EngineConfig::default().with_default_page_limit(0);
        assert!(matches!(
            config.validate(),
            Err(QuarryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn malformed_sources() {
        assert!(matches!(
            EngineConfig::from_json("{"),
            Err(QuarryError::Json(_))
        ));
        assert!(matches!(
            EngineConfig::from_yaml("default_page: [1"),
            Err(QuarryError::Yaml(_))
        ));
    }
}

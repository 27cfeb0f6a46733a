//! Declarative rule tables fed into [`Packer::rules`](crate::Packer::rules).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::rule::{Pipeline, RuleMeta};

/// One `(extensions → pipeline, metadata)` association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub extensions: Vec<String>,

    pub pipeline: Pipeline,

    #[serde(flatten)]
    pub meta: RuleMeta,
}

impl RuleSpec {
    pub fn new<I, S>(extensions: I, pipeline: impl Into<Pipeline>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            pipeline: pipeline.into(),
            meta: RuleMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: RuleMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Ordered list of rule specs, registered front to back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable(Vec<RuleSpec>);

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry (chainable).
    pub fn with(mut self, spec: RuleSpec) -> Self {
        self.0.push(spec);
        self
    }

    pub fn push(&mut self, spec: RuleSpec) {
        self.0.push(spec);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleSpec> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a table supplied as JSON, e.g. from a project file.
    ///
    /// ```
    /// use packer_config::RuleTable;
    /// use serde_json::json;
    ///
    /// let table = RuleTable::from_value(json!([
    ///     { "extensions": ["glsl"], "pipeline": [{ "loader": "raw-loader" }] },
    ///     { "extensions": ["js"], "pipeline": [{ "loader": "source-map-loader" }], "enforce": "pre" }
    /// ])).unwrap();
    /// assert_eq!(table.len(), 2);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "rules".to_string(),
            hint: Some(e.to_string()),
        })
    }
}

impl FromIterator<RuleSpec> for RuleTable {
    fn from_iter<T: IntoIterator<Item = RuleSpec>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a RuleSpec;
    type IntoIter = std::slice::Iter<'a, RuleSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

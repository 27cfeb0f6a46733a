//! Module rules: which pipeline applies to which class of files.
//!
//! A [`Rule`] pairs an [`ExtensionMatcher`] with an ordered [`Pipeline`] of
//! transform steps. Rules are values; narrowing a rule to include paths
//! produces a new rule rather than editing the existing one.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Matches file names by their final extension(s).
///
/// Multiple extensions form an alternation: `["ts", "tsx"]` matches `a.ts`
/// and `a.tsx`, nothing else. Matching is case-sensitive and only looks at
/// the segment after the final path separator.
#[derive(Debug, Clone)]
pub struct ExtensionMatcher {
    extensions: Vec<String>,
    regex: Regex,
}

impl ExtensionMatcher {
    /// Build a matcher for a non-empty set of extensions (without leading dot).
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyExtensionSet`] if no extension is given
    /// - [`ConfigError::InvalidExtension`] for an empty extension, a leading
    ///   dot, or a path separator
    pub fn new<I, S>(extensions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions: Vec<String> = extensions.into_iter().map(Into::into).collect();
        if extensions.is_empty() {
            return Err(ConfigError::EmptyExtensionSet);
        }

        for ext in &extensions {
            let reason = if ext.is_empty() {
                Some("extension is empty")
            } else if ext.starts_with('.') {
                Some("extension must be given without a leading '.'")
            } else if ext.contains(['/', '\\']) {
                Some("extension must not contain a path separator")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidExtension {
                    extension: ext.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        let alternation = extensions
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&format!(r"\.(?:{alternation})$")).map_err(|e| {
            ConfigError::InvalidValue {
                field: "test".to_string(),
                hint: Some(e.to_string()),
            }
        })?;

        Ok(Self { extensions, regex })
    }

    /// Extensions in registration order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Check whether the file name part of `path` carries one of the extensions.
    pub fn matches(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref().to_string_lossy();
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or_default();
        self.regex.is_match(file_name)
    }

    /// Regex source in the shape the bundler expects, e.g. `\.(ts|tsx)$`.
    pub fn source(&self) -> String {
        let alternation = self
            .extensions
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");
        format!(r"\.({alternation})$")
    }
}

impl PartialEq for ExtensionMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.extensions == other.extensions
    }
}

impl Eq for ExtensionMatcher {}

impl Serialize for ExtensionMatcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source())
    }
}

/// One step of a pipeline: an external loader plus its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformStep {
    pub loader: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl TransformStep {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

impl From<&str> for TransformStep {
    fn from(loader: &str) -> Self {
        Self::new(loader)
    }
}

/// Ordered transform steps applied to a matched file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline(Vec<TransformStep>);

impl Pipeline {
    pub fn new(steps: Vec<TransformStep>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Pipeline {
    fn from(loader: &str) -> Self {
        Self(vec![TransformStep::new(loader)])
    }
}

impl From<TransformStep> for Pipeline {
    fn from(step: TransformStep) -> Self {
        Self(vec![step])
    }
}

impl From<Vec<TransformStep>> for Pipeline {
    fn from(steps: Vec<TransformStep>) -> Self {
        Self(steps)
    }
}

impl FromIterator<TransformStep> for Pipeline {
    fn from_iter<T: IntoIterator<Item = TransformStep>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Ordering hint for a rule relative to normal loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforce {
    Pre,
    Post,
}

/// Extra rule attributes overlaid by [`crate::Packer::loader`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_effects: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Enforce>,

    /// Module type override (e.g. `javascript/auto`)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl RuleMeta {
    pub fn side_effects(mut self, side_effects: bool) -> Self {
        self.side_effects = Some(side_effects);
        self
    }

    pub fn enforce(mut self, enforce: Enforce) -> Self {
        self.enforce = Some(enforce);
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Right-biased overlay: fields set on `other` win.
    pub fn overlay(self, other: RuleMeta) -> Self {
        Self {
            side_effects: other.side_effects.or(self.side_effects),
            enforce: other.enforce.or(self.enforce),
            kind: other.kind.or(self.kind),
        }
    }
}

/// A module rule as consumed by the bundler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub test: ExtensionMatcher,

    #[serde(rename = "use")]
    pub pipeline: Pipeline,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub include: BTreeSet<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_effects: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Enforce>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Rule {
    pub fn new(test: ExtensionMatcher, pipeline: Pipeline, meta: RuleMeta) -> Self {
        Self {
            test,
            pipeline,
            include: BTreeSet::new(),
            side_effects: meta.side_effects,
            enforce: meta.enforce,
            kind: meta.kind,
        }
    }

    /// Copy of this rule with `paths` unioned into its include set.
    pub fn with_include<'a>(&self, paths: impl IntoIterator<Item = &'a PathBuf>) -> Self {
        let mut rule = self.clone();
        rule.include.extend(paths.into_iter().cloned());
        rule
    }

    /// Whether the bundler would apply this rule to `path`.
    ///
    /// An empty include set places no restriction on the location.
    pub fn applies_to(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.test.matches(path)
            && (self.include.is_empty() || self.include.iter().any(|dir| path.starts_with(dir)))
    }
}

//! Configuration fragments and the merge engine.
//!
//! A [`Configuration`] is both a partial fragment and the final snapshot
//! handed to the bundler. Fragments combine through [`merge`]: list fields
//! concatenate, every other field is overridden by the right-hand side when
//! present.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::mode::{Devtool, Mode};
use crate::plugin::SharedPlugin;
use crate::rule::Rule;

#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub devtool: Option<Devtool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve: Option<ResolveOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsOptions>,

    /// Serialized as plugin names; the units themselves are opaque
    #[serde(serialize_with = "serialize_plugin_names")]
    pub plugins: Vec<SharedPlugin>,

    pub module: ModuleOptions,
}

/// Holder for the rule list, mirroring the bundler's `module.rules` shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleOptions {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    /// Absolute output directory
    pub path: PathBuf,

    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOptions {
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Directories searched for bare imports, in order
    #[serde(default)]
    pub modules: Vec<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub alias: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symlinks: Option<bool>,
}

/// Which parts of the build report the bundler prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOptions {
    pub colors: bool,
    pub hash: bool,
    pub version: bool,
    pub timings: bool,
    pub assets: bool,
    pub chunks: bool,
    pub modules: bool,
    pub reasons: bool,
    pub children: bool,
    pub source: bool,
    pub errors: bool,
    pub error_details: bool,
    pub warnings: bool,
    pub public_path: bool,
}

impl Default for StatsOptions {
    /// Terse report: timings, modules, errors and warnings only.
    fn default() -> Self {
        Self {
            colors: true,
            hash: false,
            version: false,
            timings: true,
            assets: false,
            chunks: false,
            modules: true,
            reasons: false,
            children: false,
            source: false,
            errors: true,
            error_details: true,
            warnings: true,
            public_path: false,
        }
    }
}

/// Combine two fragments.
///
/// `plugins` and `module.rules` are concatenated (`a` first, duplicates
/// kept); every scalar field takes `b`'s value when set and `a`'s otherwise.
/// Concatenation makes the list fields associative, so the order in which
/// fragments are grouped never changes the resulting sequences.
pub fn merge(a: &Configuration, b: &Configuration) -> Configuration {
    Configuration {
        mode: b.mode.or(a.mode),
        entry: b.entry.clone().or_else(|| a.entry.clone()),
        output: b.output.clone().or_else(|| a.output.clone()),
        devtool: b.devtool.or(a.devtool),
        resolve: b.resolve.clone().or_else(|| a.resolve.clone()),
        stats: b.stats.or(a.stats),
        plugins: a.plugins.iter().chain(&b.plugins).cloned().collect(),
        module: ModuleOptions {
            rules: a
                .module
                .rules
                .iter()
                .chain(&b.module.rules)
                .cloned()
                .collect(),
        },
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragment carrying only plugins.
    pub fn with_plugins(plugins: impl IntoIterator<Item = SharedPlugin>) -> Self {
        Self {
            plugins: plugins.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Fragment carrying only rules.
    pub fn with_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            module: ModuleOptions {
                rules: rules.into_iter().collect(),
            },
            ..Self::default()
        }
    }

    /// `merge(self, other)`.
    pub fn merge(&self, other: &Configuration) -> Configuration {
        merge(self, other)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.module.rules
    }

    /// All rules the bundler applies to `path`, in registration order.
    ///
    /// Matching is non-exclusive: every matching rule's pipeline runs.
    pub fn matching_rules(&self, path: impl AsRef<Path>) -> Vec<&Rule> {
        let path = path.as_ref();
        self.module
            .rules
            .iter()
            .filter(|rule| rule.applies_to(path))
            .collect()
    }

    /// Render the snapshot in the bundler's JSON shape.
    pub fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            hint: Some(e.to_string()),
        })
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins: Vec<&str> = self.plugins.iter().map(|p| p.name()).collect();
        f.debug_struct("Configuration")
            .field("mode", &self.mode)
            .field("entry", &self.entry)
            .field("output", &self.output)
            .field("devtool", &self.devtool)
            .field("resolve", &self.resolve)
            .field("stats", &self.stats)
            .field("plugins", &plugins)
            .field("module", &self.module)
            .finish()
    }
}

fn serialize_plugin_names<S: Serializer>(
    plugins: &[SharedPlugin],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(plugins.iter().map(|p| p.name()))
}

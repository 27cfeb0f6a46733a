//! Immutable configuration builder.
//!
//! Every chain operation borrows the current [`Packer`] and returns a new
//! one built through [`merge`](crate::merge). A failed operation leaves the
//! receiver untouched, so callers can keep using the previous builder.
//!
//! ```
//! use packer_config::{BuildArgs, BuildEnv, Mode, Packer, RuleMeta};
//!
//! let env = BuildEnv::new("/project").with_environment_mode(Mode::Production);
//! let config = Packer::from_env(&env, &BuildArgs::default())?
//!     .loader(["ts", "tsx"], "swc-loader", RuleMeta::default())?
//!     .include(["src"])
//!     .to_config();
//!
//! assert_eq!(config.rules().len(), 1);
//! # Ok::<(), packer_config::ConfigError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::config::{merge, Configuration};
use crate::env::{absolute_root, BuildArgs, BuildEnv};
use crate::error::Result;
use crate::mode::Mode;
use crate::plugin::SharedPlugin;
use crate::rule::{ExtensionMatcher, Pipeline, Rule, RuleMeta};
use crate::table::RuleTable;

#[derive(Debug, Clone)]
pub struct Packer {
    config: Configuration,
    /// Base for relative include paths
    root: PathBuf,
}

impl Packer {
    /// Empty builder rooted at `root`.
    ///
    /// A relative root is resolved against the working directory once, here.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::ConfigError::UnresolvableRoot`] when the root
    /// cannot be made absolute (e.g. it is empty).
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(root, Configuration::default())
    }

    /// Builder seeded with an existing fragment.
    pub fn with_config(root: impl AsRef<Path>, config: Configuration) -> Result<Self> {
        Ok(Self {
            config,
            root: absolute_root(root.as_ref())?,
        })
    }

    /// Builder with the resolved mode and its source map strategy applied.
    pub fn from_env(env: &BuildEnv, args: &BuildArgs) -> Result<Self> {
        let resolved = env.resolved(args);
        tracing::debug!(mode = %resolved.mode, devtool = ?resolved.devtool, "resolved build mode");
        Ok(Self::new(&env.root)?.set(Configuration {
            mode: Some(resolved.mode),
            devtool: Some(resolved.devtool),
            ..Configuration::default()
        }))
    }

    /// Merge `fragment` on top of the current configuration.
    pub fn set(&self, fragment: Configuration) -> Self {
        self.derive(merge(&self.config, &fragment))
    }

    /// Append plugins. No identity check: a unit added twice runs twice.
    pub fn plugin(&self, plugins: impl IntoIterator<Item = SharedPlugin>) -> Self {
        self.set(Configuration::with_plugins(plugins))
    }

    /// Append a rule for files carrying one of `extensions`.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::ConfigError::EmptyExtensionSet`] when `extensions`
    /// is empty and [`crate::ConfigError::InvalidExtension`] for a malformed
    /// entry.
    pub fn loader<I, S>(
        &self,
        extensions: I,
        pipeline: impl Into<Pipeline>,
        meta: RuleMeta,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let test = ExtensionMatcher::new(extensions)?;
        tracing::debug!(test = %test.source(), "registering loader");
        let rule = Rule::new(test, pipeline.into(), meta);
        Ok(self.set(Configuration::with_rules([rule])))
    }

    /// [`Packer::loader`] with `side_effects` defaulting to `true`.
    pub fn loader_with_side_effects<I, S>(
        &self,
        extensions: I,
        pipeline: impl Into<Pipeline>,
        meta: RuleMeta,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loader(
            extensions,
            pipeline,
            RuleMeta::default().side_effects(true).overlay(meta),
        )
    }

    /// Register every entry of `table` in order.
    pub fn rules(&self, table: &RuleTable) -> Result<Self> {
        table.iter().try_fold(self.clone(), |packer, spec| {
            packer.loader(
                spec.extensions.iter().cloned(),
                spec.pipeline.clone(),
                spec.meta.clone(),
            )
        })
    }

    /// Union `paths` into the include set of every rule registered so far.
    ///
    /// Relative paths resolve against the builder root. Rules added later
    /// are not affected; with no rules this is a no-op.
    pub fn include<P: AsRef<Path>>(&self, paths: impl IntoIterator<Item = P>) -> Self {
        let paths: Vec<PathBuf> = paths.into_iter().map(|p| self.absolute(p)).collect();
        let rules = self
            .config
            .module
            .rules
            .iter()
            .map(|rule| rule.with_include(&paths))
            .collect();

        let mut config = self.config.clone();
        config.module.rules = rules;
        self.derive(config)
    }

    /// Snapshot of the accumulated configuration.
    pub fn to_config(&self) -> Configuration {
        self.config.clone()
    }

    pub fn into_config(self) -> Configuration {
        self.config
    }

    pub fn is_prod(&self) -> bool {
        self.config.mode == Some(Mode::Production)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute, lexically normalized form of `path`; relative paths join
    /// the (already absolute) builder root.
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path_clean::clean(path)
        } else {
            path_clean::clean(self.root.join(path))
        }
    }

    fn derive(&self, config: Configuration) -> Self {
        Self {
            config,
            root: self.root.clone(),
        }
    }
}

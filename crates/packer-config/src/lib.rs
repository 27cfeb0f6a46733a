//! Declarative bundler configuration, composed from immutable fragments.
//!
//! - [`merge`] combines two [`Configuration`] fragments: plugin and rule
//!   lists concatenate, scalar fields are overridden right to left.
//! - [`Packer`] wraps one fragment and exposes chainable, non-destructive
//!   operations (`set`, `plugin`, `loader`, `include`).
//! - [`BuildEnv`] and [`BuildArgs`] carry the mode inputs; [`resolve_mode`]
//!   derives the mode-dependent scalars.
//! - [`preset::Preset`] assembles a complete web project configuration from
//!   a [`RuleTable`] and caller-supplied plugins.

pub mod config;
pub mod env;
pub mod error;
pub mod logging;
pub mod mode;
pub mod packer;
pub mod plugin;
pub mod preset;
pub mod rule;
pub mod table;

pub use config::{merge, Configuration, ModuleOptions, OutputOptions, ResolveOptions, StatsOptions};
pub use env::{BuildArgs, BuildEnv, DEFAULT_ANALYZER_PORT, FLAG_PREFIX};
pub use error::{ConfigError, Result};
pub use logging::LogLevel;
pub use mode::{resolve_mode, Devtool, Mode, ResolvedMode, CACHE_BUST_TOKEN};
pub use packer::Packer;
pub use plugin::{BuildHooks, EmittedAsset, Plugin, SharedPlugin};
pub use rule::{Enforce, ExtensionMatcher, Pipeline, Rule, RuleMeta, TransformStep};
pub use table::{RuleSpec, RuleTable};

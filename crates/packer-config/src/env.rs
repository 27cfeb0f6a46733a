//! Build environment: the one place process state is read.
//!
//! The entry point resolves a [`BuildEnv`] once (optionally via
//! [`BuildEnv::from_env`]) and passes it, together with [`BuildArgs`], to
//! everything downstream. No other component consults environment variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, Result};
use crate::logging::LogLevel;
use crate::mode::{resolve_mode, Mode, ResolvedMode};

/// Port the bundle analyzer serves its report on.
pub const DEFAULT_ANALYZER_PORT: u16 = 29305;

/// Prefix of environment variables collected into [`BuildEnv::flags`].
pub const FLAG_PREFIX: &str = "PACKER_";

fn default_analyzer_port() -> u16 {
    DEFAULT_ANALYZER_PORT
}

/// Environment half of the mode resolution input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnv {
    /// Project root; relative paths in presets resolve against it
    pub root: PathBuf,

    /// Mode supplied by the environment (`NODE_ENV`)
    #[serde(default)]
    pub environment_mode: Option<Mode>,

    /// Serve a bundle size report (`ANALYZE`, any truthy value)
    #[serde(default, deserialize_with = "truthy")]
    pub analyze: bool,

    /// Port for the bundle analyzer (`ANALYZE_PORT`)
    #[serde(default = "default_analyzer_port")]
    pub analyzer_port: u16,

    /// Free-form project flags (`PACKER_*`, keys lowercased without prefix)
    #[serde(default, deserialize_with = "scalar_map")]
    pub flags: BTreeMap<String, String>,
}

/// Argument half of the mode resolution input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildArgs {
    /// Mode passed explicitly by the caller (e.g. `--mode`)
    #[serde(default)]
    pub mode: Option<Mode>,
}

impl BuildArgs {
    pub fn with_mode(mode: Mode) -> Self {
        Self { mode: Some(mode) }
    }
}

impl BuildEnv {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            environment_mode: None,
            analyze: false,
            analyzer_port: DEFAULT_ANALYZER_PORT,
            flags: BTreeMap::new(),
        }
    }

    pub fn with_environment_mode(mut self, mode: Mode) -> Self {
        self.environment_mode = Some(mode);
        self
    }

    pub fn with_analyze(mut self, analyze: bool) -> Self {
        self.analyze = analyze;
        self
    }

    pub fn with_analyzer_port(mut self, port: u16) -> Self {
        self.analyzer_port = port;
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.insert(name.into(), value.into());
        self
    }

    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    /// Provider stack used by [`BuildEnv::from_env`].
    ///
    /// Callers may merge further providers on top before extracting.
    pub fn figment(root: impl Into<PathBuf>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::new(root)))
            .merge(
                Env::raw()
                    .only(&["NODE_ENV"])
                    .map(|_| "environment_mode".into()),
            )
            .merge(Env::raw().only(&["ANALYZE"]).map(|_| "analyze".into()))
            .merge(
                Env::raw()
                    .only(&["ANALYZE_PORT"])
                    .map(|_| "analyzer_port".into()),
            )
            .merge(Env::prefixed(FLAG_PREFIX).map(|key| format!("flags.{key}").into()))
    }

    /// Read `NODE_ENV`, `ANALYZE`, `ANALYZE_PORT` and `PACKER_*` from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Environment`] when a variable holds a value
    /// that does not parse (unknown mode, non-numeric port) and
    /// [`ConfigError::UnresolvableRoot`] when the root cannot be made absolute.
    pub fn from_env(root: impl Into<PathBuf>) -> Result<Self> {
        Self::from_figment(Self::figment(root))
    }

    /// Extract from `figment`; the root is made absolute against the
    /// working directory.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let mut env: Self = figment.extract()?;
        env.root = absolute_root(&env.root)?;
        tracing::debug!(
            root = %env.root.display(),
            environment_mode = ?env.environment_mode,
            analyze = env.analyze,
            flags = env.flags.len(),
            "loaded build environment"
        );
        Ok(env)
    }

    /// Resolve the mode: explicit argument, else environment, else development.
    pub fn resolve_mode(&self, args: &BuildArgs) -> Mode {
        args.mode.or(self.environment_mode).unwrap_or_default()
    }

    /// Mode plus every scalar derived from it.
    pub fn resolved(&self, args: &BuildArgs) -> ResolvedMode {
        resolve_mode(self.resolve_mode(args))
    }

    /// Log level from the `log` flag (`PACKER_LOG`), else the mode default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown level name.
    pub fn log_level(&self, args: &BuildArgs) -> Result<LogLevel> {
        match self.flag("log") {
            Some(level) => level.parse(),
            None => Ok(LogLevel::for_mode(self.resolve_mode(args))),
        }
    }
}

/// Absolute, lexically normalized form of `root`.
pub(crate) fn absolute_root(root: &Path) -> Result<PathBuf> {
    std::path::absolute(root)
        .map(path_clean::clean)
        .map_err(|source| ConfigError::UnresolvableRoot {
            root: root.to_path_buf(),
            source,
        })
}

/// Scalar as handed over by the environment provider, which types values
/// like `1` and `true` eagerly.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnvScalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl EnvScalar {
    fn is_truthy(&self) -> bool {
        match self {
            EnvScalar::Bool(value) => *value,
            EnvScalar::Int(value) => *value != 0,
            EnvScalar::Float(value) => *value != 0.0,
            EnvScalar::Text(value) => !matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "" | "0" | "false" | "no" | "off"
            ),
        }
    }

    fn into_string(self) -> String {
        match self {
            EnvScalar::Bool(value) => value.to_string(),
            EnvScalar::Int(value) => value.to_string(),
            EnvScalar::Float(value) => value.to_string(),
            EnvScalar::Text(value) => value,
        }
    }
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(EnvScalar::deserialize(deserializer)?.is_truthy())
}

fn scalar_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error> {
    let raw = BTreeMap::<String, EnvScalar>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key, value.into_string()))
        .collect())
}

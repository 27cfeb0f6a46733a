//! Build mode and the scalars derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Placeholder the bundler replaces with an 8-character content hash.
pub const CACHE_BUST_TOKEN: &str = ".[hash:8]";

/// Public path every asset URL is rooted at.
pub const DEFAULT_PUBLIC_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
    None,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
            Mode::None => "none",
        }
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Mode::Production)
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Mode::Development),
            "production" => Ok(Mode::Production),
            "none" => Ok(Mode::None),
            other => Err(ConfigError::InvalidValue {
                field: "mode".to_string(),
                hint: Some(format!(
                    "'{other}' is not one of development, production, none"
                )),
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source map strategy passed to the bundler as `devtool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Devtool {
    /// Full source maps inlined into each bundle
    #[serde(rename = "inline-source-map")]
    InlineSourceMap,
    /// Source maps written as separate `.map` artifacts
    #[serde(rename = "source-map")]
    SourceMap,
}

/// Everything that depends on the mode alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMode {
    pub mode: Mode,
    pub is_prod: bool,
    /// Inserted before the extension of chunk and asset names
    pub cache_bust_token: &'static str,
    pub public_path: &'static str,
    pub devtool: Devtool,
}

/// Derive the mode-dependent scalars. Pure and deterministic.
pub fn resolve_mode(mode: Mode) -> ResolvedMode {
    let is_prod = mode.is_prod();
    ResolvedMode {
        mode,
        is_prod,
        cache_bust_token: if is_prod { CACHE_BUST_TOKEN } else { "" },
        public_path: DEFAULT_PUBLIC_PATH,
        devtool: if is_prod {
            Devtool::SourceMap
        } else {
            Devtool::InlineSourceMap
        },
    }
}

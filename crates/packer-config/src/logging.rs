//! Log verbosity for configuration builds.
//!
//! Library users: packer emits tracing events, install your own subscriber.
//! Build scripts can pick a level from the [`BuildEnv`](crate::BuildEnv)
//! (`PACKER_LOG`, else quieter in production) and, with the `logging`
//! feature, install a compact subscriber through [`init_logging`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mode::Mode;

/// Crates whose events the build level applies to.
const TARGETS: [&str; 2] = ["packer_config", "packer_reload"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Production builds only report problems; other modes also narrate
    /// preset assembly.
    pub fn for_mode(mode: Mode) -> Self {
        if mode.is_prod() {
            LogLevel::Warn
        } else {
            LogLevel::Info
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Filter directives scoping this level to the packer crates, with
    /// everything else kept at `warn`.
    pub fn directives(&self) -> String {
        let mut directives = vec!["warn".to_string()];
        directives.extend(TARGETS.iter().map(|target| format!("{target}={self}")));
        directives.join(",")
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "silent" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(ConfigError::InvalidValue {
                field: "log".to_string(),
                hint: Some(format!(
                    "'{other}' is not one of off, error, warn, info, debug, trace"
                )),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "logging")]
static INIT: std::sync::Once = std::sync::Once::new();

/// Install a compact subscriber at the level chosen by `env`, unless
/// `RUST_LOG` says otherwise. Returns the level that was chosen.
///
/// Only the first call in a process installs anything; a subscriber set
/// elsewhere is left in place.
///
/// ```rust,no_run
/// use packer_config::{logging::init_logging, BuildArgs, BuildEnv};
///
/// let env = BuildEnv::from_env(".")?;
/// init_logging(&env, &BuildArgs::default())?;
/// # Ok::<(), packer_config::ConfigError>(())
/// ```
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when `PACKER_LOG` names no level.
#[cfg(feature = "logging")]
pub fn init_logging(env: &crate::BuildEnv, args: &crate::BuildArgs) -> crate::Result<LogLevel> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = env.log_level(args)?;
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.directives()));
        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).without_time())
            .try_init();
        if installed.is_err() {
            tracing::debug!("global subscriber already set, keeping it");
        }
    });
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("silent".parse::<LogLevel>().unwrap(), LogLevel::Off);
        assert_eq!(" DEBUG ".parse::<LogLevel>().unwrap(), LogLevel::Debug);

        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "log"));
    }

    #[test]
    fn production_is_quieter() {
        assert_eq!(LogLevel::for_mode(Mode::Production), LogLevel::Warn);
        assert_eq!(LogLevel::for_mode(Mode::Development), LogLevel::Info);
        assert_eq!(LogLevel::for_mode(Mode::None), LogLevel::Info);
    }

    #[test]
    fn directives_scope_level_to_packer_crates() {
        assert_eq!(
            LogLevel::Debug.directives(),
            "warn,packer_config=debug,packer_reload=debug"
        );
    }

    #[cfg(feature = "logging")]
    #[test]
    fn init_reports_chosen_level() {
        let env = crate::BuildEnv::new("/project").with_flag("log", "trace");
        let level = init_logging(&env, &crate::BuildArgs::default()).unwrap();
        assert_eq!(level, LogLevel::Trace);
        assert!(init_logging(&env.with_flag("log", "loud"), &crate::BuildArgs::default()).is_err());
    }
}

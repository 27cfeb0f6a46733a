use indexmap::IndexMap;

use crate::mode::Mode;

/// Shared in-house packages that ship untranspiled sources.
pub const CODEURS_PACKAGES: &str = "node_modules/@codeurs";

pub fn default_extensions() -> Vec<String> {
    [".js", ".mjs", ".ts", ".tsx", ".less", ".scss", ".sass"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn preact_aliases() -> IndexMap<String, String> {
    IndexMap::from([
        ("react".to_string(), "preact/compat".to_string()),
        ("react-dom".to_string(), "preact/compat".to_string()),
    ])
}

/// Fallback values for injected environment variables.
pub fn environment_defaults(mode: Mode) -> IndexMap<String, String> {
    IndexMap::from([
        ("NODE_ENV".to_string(), mode.as_str().to_string()),
        ("DEBUG".to_string(), "false".to_string()),
        ("SENTRY_CONNECTION".to_string(), String::new()),
        ("SENTRY_DSN".to_string(), String::new()),
        ("PROJECT_RELEASE".to_string(), String::new()),
    ])
}

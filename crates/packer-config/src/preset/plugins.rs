//! Plugin requests issued by the preset.
//!
//! The preset decides *which* side-effect plugins a build needs and with
//! what settings; the caller decides *what* implements them.

use indexmap::IndexMap;

use crate::plugin::SharedPlugin;

/// Host the bundle analyzer listens on.
pub const ANALYZER_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginRequest {
    /// Extract imported stylesheets into standalone files
    ExtractCss {
        filename: String,
        chunk_filename: String,
    },
    /// Emit an asset manifest
    Manifest,
    /// Type-check in a background process
    TypeCheck,
    /// Inject environment variables, with fallback values
    Environment { defaults: IndexMap<String, String> },
    /// Serve an interactive bundle size report
    BundleAnalyzer { host: String, port: u16 },
    /// Notify browsers of changed artifacts
    LiveReload,
}

impl PluginRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            PluginRequest::ExtractCss { .. } => "extract-css",
            PluginRequest::Manifest => "manifest",
            PluginRequest::TypeCheck => "type-check",
            PluginRequest::Environment { .. } => "environment",
            PluginRequest::BundleAnalyzer { .. } => "bundle-analyzer",
            PluginRequest::LiveReload => "live-reload",
        }
    }
}

/// Supplies concrete plugins for preset requests.
///
/// Returning `None` leaves that capability out of the build.
pub trait PluginProvider {
    fn provide(&self, request: &PluginRequest) -> Option<SharedPlugin>;
}

impl<F> PluginProvider for F
where
    F: Fn(&PluginRequest) -> Option<SharedPlugin>,
{
    fn provide(&self, request: &PluginRequest) -> Option<SharedPlugin> {
        self(request)
    }
}

/// Provider that supplies nothing; useful for rule-only configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlugins;

impl PluginProvider for NoPlugins {
    fn provide(&self, _request: &PluginRequest) -> Option<SharedPlugin> {
        None
    }
}

//! Ready-made configuration for a web project.
//!
//! [`Preset`] turns an entry file, an output file and [`PresetOptions`] into a
//! fully populated [`Packer`]: output naming with the mode's cache-bust token,
//! module resolution, the default rule table narrowed to the project sources,
//! and the side-effect plugins requested from a [`PluginProvider`].

mod defaults;
mod plugins;
mod rules;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{Configuration, OutputOptions, ResolveOptions, StatsOptions};
use crate::env::{BuildArgs, BuildEnv};
use crate::error::{ConfigError, Result};
use crate::mode::ResolvedMode;
use crate::packer::Packer;

pub use defaults::*;
pub use plugins::{NoPlugins, PluginProvider, PluginRequest, ANALYZER_HOST};
pub use rules::default_rule_table;

/// Project-level switches for the preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetOptions {
    /// Convert pixel units to rem in stylesheets
    #[serde(default)]
    pub px_to_rem: bool,

    /// Alias react imports to preact/compat
    #[serde(default)]
    pub preact: bool,

    /// Request a live-reload plugin
    #[serde(default)]
    pub live_reload: bool,

    /// Extra directories the rules apply to, besides the source directory
    #[serde(default)]
    pub include: Vec<PathBuf>,
}

/// Absolute locations derived from the entry and output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub entry: PathBuf,
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Output file stem, shared by scripts, styles and chunks
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Preset {
    entry: PathBuf,
    output: PathBuf,
    options: PresetOptions,
}

impl Preset {
    pub fn new(
        entry: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        options: PresetOptions,
    ) -> Self {
        Self {
            entry: entry.into(),
            output: output.into(),
            options,
        }
    }

    /// Resolve entry and output against `packer`'s root.
    pub fn layout(&self, packer: &Packer) -> Result<ProjectLayout> {
        let entry = packer.absolute(&self.entry);
        let output = packer.absolute(&self.output);

        let name = output
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "output".to_string(),
                hint: Some(format!("'{}' has no file name", self.output.display())),
            })?
            .to_string();

        Ok(ProjectLayout {
            src_dir: parent_dir(&entry),
            out_dir: parent_dir(&output),
            entry,
            name,
        })
    }

    /// Build the complete configuration builder.
    pub fn build(
        &self,
        env: &BuildEnv,
        args: &BuildArgs,
        provider: &dyn PluginProvider,
    ) -> Result<Packer> {
        let resolved = env.resolved(args);
        let base = Packer::from_env(env, args)?;
        let layout = self.layout(&base)?;
        tracing::info!(mode = %resolved.mode, entry = %layout.entry.display(), "configuring build");

        let packer = base.set(self.scaffold(&resolved, &layout));
        let packer = packer.plugin(
            self.plugin_requests(env, &resolved, &layout)
                .iter()
                .filter_map(|request| {
                    let plugin = provider.provide(request);
                    if plugin.is_none() {
                        tracing::debug!(kind = request.kind(), "no plugin provided, skipping");
                    }
                    plugin
                }),
        );

        let mut include = vec![layout.src_dir.clone(), PathBuf::from(CODEURS_PACKAGES)];
        include.extend(self.options.include.iter().cloned());

        Ok(packer
            .rules(&default_rule_table(&resolved, &layout, &self.options))?
            .include(include))
    }

    /// Shortcut for `build(..)?.to_config()`.
    pub fn config(
        &self,
        env: &BuildEnv,
        args: &BuildArgs,
        provider: &dyn PluginProvider,
    ) -> Result<Configuration> {
        Ok(self.build(env, args, provider)?.into_config())
    }

    fn scaffold(&self, resolved: &ResolvedMode, layout: &ProjectLayout) -> Configuration {
        let name = &layout.name;
        let suffix = resolved.cache_bust_token;

        let alias = if self.options.preact {
            preact_aliases()
        } else {
            IndexMap::new()
        };

        Configuration {
            entry: Some(layout.entry.clone()),
            stats: Some(StatsOptions::default()),
            output: Some(OutputOptions {
                path: layout.out_dir.clone(),
                filename: format!("{name}.js"),
                chunk_filename: Some(format!("assets/[id].{name}{suffix}.js")),
                public_path: Some(resolved.public_path.to_string()),
            }),
            resolve: Some(ResolveOptions {
                extensions: default_extensions(),
                modules: vec![
                    layout.src_dir.to_string_lossy().into_owned(),
                    "node_modules".to_string(),
                ],
                alias,
                symlinks: None,
            }),
            ..Configuration::default()
        }
    }

    fn plugin_requests(
        &self,
        env: &BuildEnv,
        resolved: &ResolvedMode,
        layout: &ProjectLayout,
    ) -> Vec<PluginRequest> {
        let name = &layout.name;
        let suffix = resolved.cache_bust_token;

        let mut requests = vec![
            PluginRequest::ExtractCss {
                filename: format!("{name}.css"),
                chunk_filename: format!("assets/[id].{name}{suffix}.css"),
            },
            PluginRequest::Manifest,
            PluginRequest::TypeCheck,
            PluginRequest::Environment {
                defaults: environment_defaults(resolved.mode),
            },
        ];
        if env.analyze {
            requests.push(PluginRequest::BundleAnalyzer {
                host: ANALYZER_HOST.to_string(),
                port: env.analyzer_port,
            });
        }
        if self.options.live_reload {
            requests.push(PluginRequest::LiveReload);
        }
        requests
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_uses_output_stem() {
        let preset = Preset::new("src/index.tsx", "build/app.js", PresetOptions::default());
        let layout = preset.layout(&Packer::new("/project").unwrap()).unwrap();
        assert_eq!(layout.entry, PathBuf::from("/project/src/index.tsx"));
        assert_eq!(layout.src_dir, PathBuf::from("/project/src"));
        assert_eq!(layout.out_dir, PathBuf::from("/project/build"));
        assert_eq!(layout.name, "app");
    }

    #[test]
    fn layout_rejects_output_without_name() {
        let preset = Preset::new("src/index.tsx", "/", PresetOptions::default());
        let err = preset.layout(&Packer::new("/project").unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn preset_options_deserialize_camel_case() {
        let options: PresetOptions = serde_json::from_value(serde_json::json!({
            "pxToRem": true,
            "include": ["vendor"]
        }))
        .unwrap();
        assert!(options.px_to_rem);
        assert!(!options.preact);
        assert_eq!(options.include, vec![PathBuf::from("vendor")]);
    }
}

//! Full preset assembly against a recording plugin provider.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use packer_config::preset::{
    NoPlugins, PluginRequest, Preset, PresetOptions, ANALYZER_HOST, CODEURS_PACKAGES,
};
use packer_config::{
    BuildArgs, BuildEnv, BuildHooks, Configuration, Devtool, Mode, Plugin, SharedPlugin,
    DEFAULT_ANALYZER_PORT,
};

struct Stub(&'static str);

impl Plugin for Stub {
    fn name(&self) -> &str {
        self.0
    }

    fn attach(&self, _hooks: &mut BuildHooks) {}
}

fn plugin_names(config: &Configuration) -> Vec<&str> {
    config.plugins.iter().map(|p| p.name()).collect()
}

fn build(env: &BuildEnv, args: &BuildArgs, options: PresetOptions) -> (Configuration, Vec<PluginRequest>) {
    let requests = RefCell::new(Vec::new());
    let provider = |request: &PluginRequest| -> Option<SharedPlugin> {
        requests.borrow_mut().push(request.clone());
        Some(Arc::new(Stub(request.kind())))
    };
    let config = Preset::new("src/index.tsx", "build/app.js", options)
        .config(env, args, &provider)
        .unwrap();
    (config, requests.into_inner())
}

#[test]
fn development_build_requests_core_plugins_in_order() {
    let env = BuildEnv::new("/project");
    let (config, _) = build(&env, &BuildArgs::default(), PresetOptions::default());

    assert_eq!(
        plugin_names(&config),
        vec!["extract-css", "manifest", "type-check", "environment"]
    );
    assert_eq!(config.mode, Some(Mode::Development));
    assert_eq!(config.devtool, Some(Devtool::InlineSourceMap));
}

#[test]
fn analyzer_only_when_enabled() {
    let (config, _) = build(
        &BuildEnv::new("/project").with_analyze(false),
        &BuildArgs::default(),
        PresetOptions::default(),
    );
    assert!(!plugin_names(&config).contains(&"bundle-analyzer"));

    let env = BuildEnv::new("/project").with_analyze(true);
    let (config, requests) = build(&env, &BuildArgs::default(), PresetOptions::default());

    assert_eq!(plugin_names(&config).last(), Some(&"bundle-analyzer"));
    assert!(requests.contains(&PluginRequest::BundleAnalyzer {
        host: ANALYZER_HOST.to_string(),
        port: DEFAULT_ANALYZER_PORT,
    }));
}

#[test]
fn analyzer_port_can_be_overridden() {
    let env = BuildEnv::new("/project")
        .with_analyze(true)
        .with_analyzer_port(8888);
    let (_, requests) = build(&env, &BuildArgs::default(), PresetOptions::default());
    assert!(requests.contains(&PluginRequest::BundleAnalyzer {
        host: ANALYZER_HOST.to_string(),
        port: 8888,
    }));
}

#[test]
fn live_reload_is_requested_last() {
    let env = BuildEnv::new("/project").with_analyze(true);
    let options = PresetOptions {
        live_reload: true,
        ..PresetOptions::default()
    };
    let (config, _) = build(&env, &BuildArgs::default(), options);
    let names = plugin_names(&config);
    assert_eq!(names[names.len() - 2..], ["bundle-analyzer", "live-reload"]);
}

#[test]
fn production_output_names_carry_hash_token() {
    let env = BuildEnv::new("/project").with_environment_mode(Mode::Production);
    let (config, requests) = build(&env, &BuildArgs::default(), PresetOptions::default());

    let output = config.output.unwrap();
    assert_eq!(output.path, PathBuf::from("/project/build"));
    assert_eq!(output.filename, "app.js");
    assert_eq!(output.chunk_filename.as_deref(), Some("assets/[id].app.[hash:8].js"));
    assert_eq!(output.public_path.as_deref(), Some("/"));
    assert_eq!(
        requests[0],
        PluginRequest::ExtractCss {
            filename: "app.css".to_string(),
            chunk_filename: "assets/[id].app.[hash:8].css".to_string(),
        }
    );

    let PluginRequest::Environment { defaults } = &requests[3] else {
        panic!("expected environment request, got {:?}", requests[3]);
    };
    assert_eq!(defaults["NODE_ENV"], "production");
    assert_eq!(defaults["DEBUG"], "false");
}

#[test]
fn development_chunks_have_no_suffix() {
    let (config, _) = build(
        &BuildEnv::new("/project"),
        &BuildArgs::default(),
        PresetOptions::default(),
    );
    assert_eq!(
        config.output.unwrap().chunk_filename.as_deref(),
        Some("assets/[id].app.js")
    );
}

#[test]
fn rules_are_narrowed_to_sources_and_shared_packages() {
    let options = PresetOptions {
        include: vec![PathBuf::from("vendor/widgets")],
        ..PresetOptions::default()
    };
    let (config, _) = build(&BuildEnv::new("/project"), &BuildArgs::default(), options);

    let expected: Vec<PathBuf> = vec![
        PathBuf::from("/project").join(CODEURS_PACKAGES),
        PathBuf::from("/project/src"),
        PathBuf::from("/project/vendor/widgets"),
    ];
    assert_eq!(config.rules().len(), 8);
    for rule in config.rules() {
        let include: Vec<PathBuf> = rule.include.iter().cloned().collect();
        assert_eq!(include, expected);
    }

    assert_eq!(config.matching_rules("/project/src/app.tsx").len(), 1);
    assert!(config.matching_rules("/elsewhere/app.tsx").is_empty());
    assert_eq!(
        config
            .matching_rules("/project/node_modules/@codeurs/ui/button.less")
            .len(),
        1
    );
}

#[test]
fn relative_root_yields_absolute_paths() {
    let cwd = std::env::current_dir().unwrap();
    let (config, _) = build(&BuildEnv::new("."), &BuildArgs::default(), PresetOptions::default());

    assert_eq!(config.entry, Some(cwd.join("src/index.tsx")));
    assert_eq!(config.output.as_ref().unwrap().path, cwd.join("build"));
    for rule in config.rules() {
        assert!(rule.include.iter().all(|path| path.is_absolute()));
    }
    assert_eq!(config.matching_rules(cwd.join("src/app.tsx")).len(), 1);
}

#[test]
fn resolve_prefers_source_directory() {
    let options = PresetOptions {
        preact: true,
        ..PresetOptions::default()
    };
    let (config, _) = build(&BuildEnv::new("/project"), &BuildArgs::default(), options);
    let resolve = config.resolve.unwrap();
    assert_eq!(resolve.modules, vec!["/project/src", "node_modules"]);
    assert_eq!(resolve.alias["react"], "preact/compat");
    assert!(resolve.extensions.contains(&".tsx".to_string()));
}

#[test]
fn provider_may_decline_requests() {
    let config = Preset::new("src/index.tsx", "build/app.js", PresetOptions::default())
        .config(&BuildEnv::new("/project"), &BuildArgs::default(), &NoPlugins)
        .unwrap();
    assert!(config.plugins.is_empty());
    assert_eq!(config.rules().len(), 8);
}

#[test]
fn explicit_mode_argument_overrides_environment() {
    let env = BuildEnv::new("/project").with_environment_mode(Mode::Production);
    let (config, _) = build(
        &env,
        &BuildArgs::with_mode(Mode::Development),
        PresetOptions::default(),
    );
    assert_eq!(config.mode, Some(Mode::Development));
    assert_eq!(
        config.output.unwrap().chunk_filename.as_deref(),
        Some("assets/[id].app.js")
    );
}

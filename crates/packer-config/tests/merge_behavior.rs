//! Merge engine laws: list concatenation is associative, scalars are right-biased.

use std::sync::Arc;

use packer_config::{
    merge, BuildHooks, Configuration, Devtool, ExtensionMatcher, Mode, Pipeline, Plugin, Rule,
    RuleMeta, SharedPlugin,
};
use proptest::prelude::*;

struct Named(String);

impl Plugin for Named {
    fn name(&self) -> &str {
        &self.0
    }

    fn attach(&self, _hooks: &mut BuildHooks) {}
}

fn named(name: &str) -> SharedPlugin {
    Arc::new(Named(name.to_string()))
}

fn rule(ext: &str, loader: &str) -> Rule {
    Rule::new(
        ExtensionMatcher::new([ext]).unwrap(),
        Pipeline::from(loader),
        RuleMeta::default(),
    )
}

fn plugin_names(config: &Configuration) -> Vec<String> {
    config.plugins.iter().map(|p| p.name().to_string()).collect()
}

fn mode_strategy() -> impl Strategy<Value = Option<Mode>> {
    prop_oneof![
        Just(None),
        Just(Some(Mode::Development)),
        Just(Some(Mode::Production)),
        Just(Some(Mode::None)),
    ]
}

prop_compose! {
    fn fragment()(
        mode in mode_strategy(),
        rules in prop::collection::vec(("[a-z]{1,4}", "[a-z]{1,6}-loader"), 0..4),
        plugins in prop::collection::vec("[a-z]{1,8}", 0..4),
    ) -> Configuration {
        Configuration {
            mode,
            plugins: plugins.iter().map(|name| named(name)).collect(),
            ..Configuration::with_rules(rules.iter().map(|(ext, loader)| rule(ext, loader)))
        }
    }
}

proptest! {
    #[test]
    fn merge_is_associative_for_lists(a in fragment(), b in fragment(), c in fragment()) {
        let left = merge(&merge(&a, &b), &c);
        let right = merge(&a, &merge(&b, &c));

        prop_assert_eq!(left.rules(), right.rules());
        prop_assert_eq!(plugin_names(&left), plugin_names(&right));
        prop_assert_eq!(left.mode, right.mode);
    }

    #[test]
    fn merge_lengths_add_up(a in fragment(), b in fragment()) {
        let merged = merge(&a, &b);
        prop_assert_eq!(merged.rules().len(), a.rules().len() + b.rules().len());
        prop_assert_eq!(merged.plugins.len(), a.plugins.len() + b.plugins.len());
    }
}

#[test]
fn merge_keeps_duplicate_plugins() {
    let plugin = named("manifest");
    let a = Configuration::with_plugins([Arc::clone(&plugin)]);
    let b = Configuration::with_plugins([plugin]);
    assert_eq!(plugin_names(&merge(&a, &b)), vec!["manifest", "manifest"]);
}

#[test]
fn merge_with_empty_fragment_is_identity_on_lists() {
    let a = Configuration {
        devtool: Some(Devtool::SourceMap),
        plugins: vec![named("env")],
        ..Configuration::with_rules([rule("js", "babel-loader")])
    };
    let empty = Configuration::default();

    for merged in [merge(&a, &empty), merge(&empty, &a)] {
        assert_eq!(merged.rules(), a.rules());
        assert_eq!(plugin_names(&merged), vec!["env"]);
        assert_eq!(merged.devtool, Some(Devtool::SourceMap));
    }
}

#[test]
fn unset_scalar_on_right_does_not_clear_left() {
    let a = Configuration {
        mode: Some(Mode::Production),
        ..Configuration::default()
    };
    let b = Configuration {
        devtool: Some(Devtool::InlineSourceMap),
        ..Configuration::default()
    };
    let merged = merge(&a, &b);
    assert_eq!(merged.mode, Some(Mode::Production));
    assert_eq!(merged.devtool, Some(Devtool::InlineSourceMap));
}

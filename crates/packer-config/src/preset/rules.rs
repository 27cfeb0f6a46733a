//! Default rule table for script, style and asset files.

use serde_json::{json, Value};

use crate::mode::ResolvedMode;
use crate::rule::{Enforce, Pipeline, RuleMeta, TransformStep};
use crate::table::{RuleSpec, RuleTable};

use super::{PresetOptions, ProjectLayout};

const CSS_EXTRACT_LOADER: &str = "mini-css-extract-plugin/loader";

/// Rules for a typical web project, in registration order.
pub fn default_rule_table(
    resolved: &ResolvedMode,
    layout: &ProjectLayout,
    options: &PresetOptions,
) -> RuleTable {
    let suffix = resolved.cache_bust_token;
    let side_effects = RuleMeta::default().side_effects(true);

    RuleTable::new()
        .with(
            RuleSpec::new(["js"], "source-map-loader")
                .with_meta(RuleMeta::default().enforce(Enforce::Pre)),
        )
        .with(RuleSpec::new(["ts", "tsx"], swc_loader()))
        .with(
            RuleSpec::new(
                ["less"],
                style_pipeline(
                    resolved,
                    options,
                    TransformStep::new("less-loader").with_options(json!({
                        "sourceMap": !resolved.is_prod,
                        "paths": [layout.src_dir.to_string_lossy(), "node_modules"]
                    })),
                ),
            )
            .with_meta(side_effects.clone()),
        )
        .with(
            RuleSpec::new(
                ["scss", "sass"],
                style_pipeline(
                    resolved,
                    options,
                    TransformStep::new("sass-loader").with_options(json!({
                        "sourceMap": !resolved.is_prod,
                        "implementation": "sass"
                    })),
                ),
            )
            .with_meta(side_effects.clone()),
        )
        .with(
            RuleSpec::new(
                ["eot", "ttf", "woff", "woff2"],
                file_loader(format!("assets/fonts/[name]{suffix}.[ext]")),
            )
            .with_meta(side_effects.clone()),
        )
        .with(
            RuleSpec::new(
                ["ico", "webp", "mp4", "webm"],
                file_loader(format!("assets/data/[name]{suffix}.[ext]")),
            )
            .with_meta(side_effects.clone()),
        )
        .with(
            RuleSpec::new(
                ["svg", "jpg", "png", "gif"],
                TransformStep::new("sizeof-loader").with_options(json!({
                    "useFileLoader": true,
                    "name": format!("assets/images/[name]{suffix}.[ext]")
                })),
            )
            .with_meta(side_effects.clone()),
        )
        .with(RuleSpec::new(["glsl", "obj", "html"], "raw-loader").with_meta(side_effects))
}

fn swc_loader() -> TransformStep {
    TransformStep::new("swc-loader").with_options(json!({
        "jsc": {
            "parser": {
                "syntax": "typescript",
                "tsx": true,
                "decorators": true,
                "dynamicImport": true
            }
        }
    }))
}

fn file_loader(name: String) -> TransformStep {
    TransformStep::new("file-loader").with_options(json!({ "name": name }))
}

/// extract → css → postcss → preprocessor
fn style_pipeline(
    resolved: &ResolvedMode,
    options: &PresetOptions,
    preprocessor: TransformStep,
) -> Pipeline {
    Pipeline::new(vec![
        TransformStep::new(CSS_EXTRACT_LOADER),
        TransformStep::new("css-loader").with_options(json!({ "sourceMap": !resolved.is_prod })),
        TransformStep::new("postcss-loader").with_options(json!({
            "sourceMap": !resolved.is_prod,
            "plugins": postcss_plugins(resolved, options)
        })),
        preprocessor,
    ])
}

fn postcss_plugins(resolved: &ResolvedMode, options: &PresetOptions) -> Vec<Value> {
    let mut plugins = Vec::new();
    if options.px_to_rem {
        plugins.push(json!({
            "plugin": "postcss-pxtorem",
            "options": { "propList": ["*"], "minPixelValue": 2 }
        }));
    }
    plugins.push(json!({ "plugin": "autoprefixer", "options": { "grid": "autoplace" } }));
    if resolved.is_prod {
        plugins.push(json!({ "plugin": "cssnano", "options": { "preset": "default" } }));
    }
    plugins
}

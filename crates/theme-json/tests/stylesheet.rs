//! Integration tests for full stylesheet assembly.
//!
//! Covers:
//! - Root ruleset ordering (margin reset, alignment, block gap)
//! - Per-block and per-element rulesets, pseudo variants included
//! - Duotone declaration segregation
//! - Layout definition expansion, theme and classic paths
//! - The deprecated string-typed `types` argument

use std::sync::Arc;

use serde_json::json;
use theme_json::{
    BlockRegistry, BlockSupports, BlockType, MetadataCache, StyleType, ThemeJson, ALL_STYLE_TYPES,
};

fn engine(document: serde_json::Value) -> ThemeJson {
    let registry = Arc::new(BlockRegistry::new());
    registry.register(BlockType::new("core/group"));
    registry.register(BlockType::new("core/image").with_duotone_selector("img"));
    let cache = Arc::new(MetadataCache::new());
    ThemeJson::new(document, registry, cache)
}

fn styles_only(document: serde_json::Value) -> String {
    engine(document).get_stylesheet(&[StyleType::Styles], None)
}

// ============================================================================
// ROOT RULESET
// ============================================================================

#[test]
fn test_root_styles_follow_margin_reset() {
    let css = styles_only(json!({
        "version": 2,
        "styles": { "color": { "text": "#1e1e1e" } }
    }));

    assert!(css.starts_with("body { margin: 0; }body{color: #1e1e1e;}"));
}

#[test]
fn test_root_alignment_rules_are_always_present() {
    let css = styles_only(json!({
        "version": 2,
        "styles": { "color": { "text": "#111" } }
    }));

    assert!(css.contains(".wp-site-blocks > .alignleft { float: left; margin-right: 2em; }"));
    assert!(css.contains(".wp-site-blocks > .alignright { float: right; margin-left: 2em; }"));
    assert!(css.contains(
        ".wp-site-blocks > .aligncenter { justify-content: center; margin-left: auto; margin-right: auto; }"
    ));
}

#[test]
fn test_block_gap_opt_in_emits_collapse_rules() {
    let css = styles_only(json!({
        "version": 2,
        "settings": { "spacing": { "blockGap": true } },
        "styles": { "spacing": { "blockGap": "2rem" } }
    }));

    assert!(css.contains(".wp-site-blocks > * { margin-block-start: 0; margin-block-end: 0; }"));
    assert!(css.contains(".wp-site-blocks > * + * { margin-block-start: 2rem; }"));
    assert!(css.contains("body { --wp--style--block-gap: 2rem; }"));
}

#[test]
fn test_block_gap_defaults_when_unset_in_styles() {
    let css = styles_only(json!({
        "version": 2,
        "settings": { "spacing": { "blockGap": true } },
        "styles": { "color": { "text": "#111" } }
    }));

    assert!(css.contains(".wp-site-blocks > * + * { margin-block-start: 0.5em; }"));
}

#[test]
fn test_block_gap_null_opts_out() {
    let css = styles_only(json!({
        "version": 2,
        "settings": { "spacing": { "blockGap": null } },
        "styles": { "spacing": { "blockGap": "2rem" } }
    }));

    assert!(!css.contains("--wp--style--block-gap"));
    assert!(!css.contains("margin-block-start"));
}

#[test]
fn test_block_gap_side_object_collapses() {
    let css = styles_only(json!({
        "version": 2,
        "settings": { "spacing": { "blockGap": true } },
        "styles": { "spacing": { "blockGap": { "top": "1rem", "left": "2rem" } } }
    }));

    assert!(css.contains("body { --wp--style--block-gap: 1rem 2rem; }"));
}

// ============================================================================
// BLOCKS AND ELEMENTS
// ============================================================================

#[test]
fn test_block_styles_use_block_selector() {
    let css = styles_only(json!({
        "version": 2,
        "styles": {
            "blocks": {
                "core/group": { "spacing": { "padding": "24px" } }
            }
        }
    }));

    assert!(css.contains(".wp-block-group{padding: 24px;}"));
}

#[test]
fn test_element_and_pseudo_rulesets() {
    let css = styles_only(json!({
        "version": 2,
        "styles": {
            "elements": {
                "link": {
                    "color": { "text": "#00f" },
                    ":hover": { "color": { "text": "#f00" } }
                }
            }
        }
    }));

    assert!(css.contains("a{color: #00f;}"));
    assert!(css.contains("a:hover{color: #f00;}"));
}

#[test]
fn test_button_element_compound_selector() {
    let css = styles_only(json!({
        "version": 2,
        "styles": {
            "elements": {
                "button": { "color": { "background": "#32373c" } }
            }
        }
    }));

    assert!(css.contains(".wp-element-button, .wp-block-button__link{background-color: #32373c;}"));
}

#[test]
fn test_block_element_selector_descends() {
    let css = styles_only(json!({
        "version": 2,
        "styles": {
            "blocks": {
                "core/group": {
                    "elements": {
                        "link": { "color": { "text": "#060" } }
                    }
                }
            }
        }
    }));

    assert!(css.contains(".wp-block-group a{color: #060;}"));
}

#[test]
fn test_unregistered_block_emits_nothing() {
    let css = styles_only(json!({
        "version": 2,
        "styles": {
            "blocks": {
                "core/group": { "color": { "text": "#111" } }
            }
        }
    }));
    let registry = Arc::new(BlockRegistry::new());
    let cache = Arc::new(MetadataCache::new());
    let empty = ThemeJson::new(
        json!({
            "version": 2,
            "styles": {
                "blocks": {
                    "core/group": { "color": { "text": "#111" } }
                }
            }
        }),
        registry,
        cache,
    )
    .get_stylesheet(&[StyleType::Styles], None);

    assert!(css.contains(".wp-block-group{color: #111;}"));
    assert!(!empty.contains(".wp-block-group"));
}

// ============================================================================
// DUOTONE
// ============================================================================

#[test]
fn test_duotone_declarations_move_to_scoped_selector() {
    let css = styles_only(json!({
        "version": 2,
        "styles": {
            "blocks": {
                "core/image": {
                    "filter": { "duotone": "var(--wp--preset--duotone--dark)" }
                }
            }
        }
    }));

    assert!(css.contains(".wp-block-image img{filter: var(--wp--preset--duotone--dark);}"));
    // The filter never appears under the main block selector.
    assert!(!css.contains(".wp-block-image{filter"));
}

// ============================================================================
// LAYOUT DEFINITIONS
// ============================================================================

fn layout_definitions() -> serde_json::Value {
    json!({
        "default": {
            "className": "is-layout-flow",
            "blockGapStyles": [
                {
                    "selector": " > * + *",
                    "rules": { "margin-block-start": null, "margin-block-end": "0" }
                }
            ],
            "baseStyles": [
                { "selector": " > .alignwide", "rules": { "max-width": "var(--wp--style--global--wide-size)" } }
            ]
        },
        "flex": {
            "className": "is-layout-flex",
            "blockGapStyles": [
                { "selector": "", "rules": { "gap": null } }
            ],
            "baseStyles": [
                { "selector": "", "rules": { "display": "flex" } }
            ]
        }
    })
}

#[test]
fn test_root_layout_gap_rules_substitute_gap_value() {
    let css = styles_only(json!({
        "version": 2,
        "settings": {
            "spacing": { "blockGap": true },
            "layout": { "definitions": layout_definitions() }
        },
        "styles": { "spacing": { "blockGap": "1.5rem" } }
    }));

    assert!(css.contains(
        "body .is-layout-flow > * + *{margin-block-start: 1.5rem;margin-block-end: 0;}"
    ));
    assert!(css.contains("body .is-layout-flex{gap: 1.5rem;}"));
    // Base styles are root-only and carry no gap substitution.
    assert!(css.contains("body .is-layout-flex{display: flex;}"));
    assert!(css.contains(
        "body .is-layout-flow > .alignwide{max-width: var(--wp--style--global--wide-size);}"
    ));
}

#[test]
fn test_classic_theme_base_layout_skips_default_definition() {
    let registry = Arc::new(BlockRegistry::new());
    registry.register(
        BlockType::new("core/columns")
            .with_supports(BlockSupports::BLOCK_GAP)
            .with_block_gap_default("2em"),
    );
    let cache = Arc::new(MetadataCache::new());
    let theme = ThemeJson::new(
        json!({
            "version": 2,
            "settings": { "layout": { "definitions": layout_definitions() } }
        }),
        registry,
        cache,
    )
    .with_block_styles_support(true);

    let css = theme.get_stylesheet(&[StyleType::BaseLayoutStyles], None);

    // No block gap support: flow (default) gap rules are skipped, flex gap
    // falls back to the fixed default at the root and the block's declared
    // default below it.
    assert!(!css.contains("is-layout-flow > * + *{margin-block-start"));
    assert!(css.contains("body .is-layout-flex{gap: 0.5em;}"));
    assert!(css.contains(".wp-block-columns.is-layout-flex{gap: 2em;}"));
}

#[test]
fn test_block_level_gap_emits_layout_rules() {
    let registry = Arc::new(BlockRegistry::new());
    registry.register(BlockType::new("core/columns"));
    let cache = Arc::new(MetadataCache::new());
    let theme = ThemeJson::new(
        json!({
            "version": 2,
            "settings": {
                "spacing": { "blockGap": true },
                "layout": { "definitions": layout_definitions() }
            },
            "styles": {
                "spacing": { "blockGap": "1rem" },
                "blocks": {
                    "core/columns": { "spacing": { "blockGap": "2.5rem" } }
                }
            }
        }),
        registry,
        cache,
    );

    let css = theme.get_stylesheet(&[StyleType::Styles], None);

    // The block's own gap value, not the root one, drives its layout rules.
    assert!(css.contains(".wp-block-columns.is-layout-flex{gap: 2.5rem;}"));
    assert!(css.contains(
        ".wp-block-columns.is-layout-flow > * + *{margin-block-start: 2.5rem;margin-block-end: 0;}"
    ));
}

#[test]
fn test_unsafe_layout_selector_is_skipped() {
    let css = styles_only(json!({
        "version": 2,
        "settings": {
            "spacing": { "blockGap": true },
            "layout": {
                "definitions": {
                    "evil": {
                        "className": "is-layout-evil",
                        "blockGapStyles": [
                            { "selector": "}</style>", "rules": { "gap": null } }
                        ]
                    }
                }
            }
        },
        "styles": { "spacing": { "blockGap": "1rem" } }
    }));

    assert!(!css.contains("is-layout-evil"));
}

// ============================================================================
// OUTPUT TYPE SELECTION
// ============================================================================

#[test]
fn test_styles_type_excludes_variables_and_presets() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": { "palette": [{ "slug": "primary", "color": "#007cba" }] }
        },
        "styles": { "color": { "text": "#111" } }
    }));

    let css = theme.get_stylesheet(&[StyleType::Styles], None);
    assert!(css.contains("body{color: #111;}"));
    assert!(!css.contains("--wp--preset--color--primary"));
    assert!(!css.contains(".has-primary-color"));

    let all = theme.get_stylesheet(ALL_STYLE_TYPES, None);
    assert!(all.contains("--wp--preset--color--primary: #007cba;"));
    assert!(all.contains("body{color: #111;}"));
    assert!(all.contains(".has-primary-color"));
}

#[test]
fn test_legacy_string_types_map_to_style_types() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": { "palette": [{ "slug": "primary", "color": "#007cba" }] }
        },
        "styles": { "color": { "text": "#111" } }
    }));

    assert_eq!(
        theme.get_stylesheet_legacy("css_variables", None),
        theme.get_stylesheet(&[StyleType::Variables], None)
    );
    assert_eq!(
        theme.get_stylesheet_legacy("block_styles", None),
        theme.get_stylesheet(&[StyleType::Styles, StyleType::Presets], None)
    );
    assert_eq!(
        theme.get_stylesheet_legacy("anything-else", None),
        theme.get_stylesheet(ALL_STYLE_TYPES, None)
    );
}

// ============================================================================
// DOCUMENT LOADING
// ============================================================================

#[test]
fn test_from_str_rejects_malformed_json() {
    let registry = Arc::new(BlockRegistry::new());
    let cache = Arc::new(MetadataCache::new());

    let result = ThemeJson::from_str("{ not json", registry, cache);
    assert!(result.is_err());
}

#[test]
fn test_from_str_parses_and_sanitizes() {
    let registry = Arc::new(BlockRegistry::new());
    let cache = Arc::new(MetadataCache::new());

    let theme = ThemeJson::from_str(
        r##"{ "version": 2, "styles": { "color": { "text": "#333" }, "junk": true } }"##,
        registry,
        cache,
    )
    .unwrap();

    assert!(theme.tree()["styles"].get("junk").is_none());
    let css = theme.get_stylesheet(&[StyleType::Styles], None);
    assert!(css.contains("body{color: #333;}"));
}

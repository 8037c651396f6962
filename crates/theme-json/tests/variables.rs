//! Integration tests for CSS custom property and preset class output.
//!
//! Covers:
//! - Preset custom properties per family
//! - Per-origin storage, cascade override, and origin filtering
//! - `settings.custom` flattening
//! - Preset utility classes, root and block scoped

use std::sync::Arc;

use serde_json::json;
use theme_json::{BlockRegistry, BlockType, MetadataCache, Origin, StyleType, ThemeJson};

fn engine(document: serde_json::Value) -> ThemeJson {
    let registry = Arc::new(BlockRegistry::new());
    registry.register(BlockType::new("core/group"));
    let cache = Arc::new(MetadataCache::new());
    ThemeJson::new(document, registry, cache)
}

// ============================================================================
// PRESET CUSTOM PROPERTIES
// ============================================================================

#[test]
fn test_variables_output_is_custom_properties_only() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": { "palette": [{ "slug": "primary", "color": "#007cba" }] },
            "custom": { "spacing": "1rem" }
        },
        "styles": { "color": { "text": "#111" } }
    }));

    let css = theme.get_stylesheet(&[StyleType::Variables], None);

    assert_eq!(
        css,
        "body{--wp--preset--color--primary: #007cba;--wp--custom--spacing: 1rem;}"
    );
}

#[test]
fn test_each_preset_family_gets_its_infix() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": {
                "palette": [{ "slug": "primary", "color": "#007cba" }],
                "gradients": [{ "slug": "sunset", "gradient": "linear-gradient(#f00, #00f)" }],
                "duotone": [{ "slug": "dark-grayscale", "colors": ["#000", "#fff"] }]
            },
            "typography": {
                "fontSizes": [{ "slug": "large", "size": "2rem" }],
                "fontFamilies": [{ "slug": "serif", "fontFamily": "Georgia, serif" }]
            }
        }
    }));

    let css = theme.get_stylesheet(&[StyleType::Variables], None);

    assert!(css.contains("--wp--preset--color--primary: #007cba;"));
    assert!(css.contains("--wp--preset--gradient--sunset: linear-gradient(#f00, #00f);"));
    assert!(css.contains("--wp--preset--duotone--dark-grayscale: url(#wp-duotone-dark-grayscale);"));
    assert!(css.contains("--wp--preset--font-size--large: 2rem;"));
    assert!(css.contains("--wp--preset--font-family--serif: Georgia, serif;"));
}

#[test]
fn test_slugs_are_kebab_cased() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": { "palette": [{ "slug": "warmBlue", "color": "#36c" }] }
        }
    }));

    let css = theme.get_stylesheet(&[StyleType::Variables], None);

    assert!(css.contains("--wp--preset--color--warm-blue: #36c;"));
}

// ============================================================================
// ORIGINS
// ============================================================================

#[test]
fn test_later_origins_override_per_slug() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": {
                "palette": {
                    "default": [
                        { "slug": "primary", "color": "#111" },
                        { "slug": "base", "color": "#fff" }
                    ],
                    "theme": [{ "slug": "primary", "color": "#222" }],
                    "custom": [{ "slug": "primary", "color": "#333" }]
                }
            }
        }
    }));

    let css = theme.get_stylesheet(&[StyleType::Variables], None);

    // One declaration per slug, the last origin's value, first origin's slot.
    assert_eq!(
        css,
        "body{--wp--preset--color--primary: #333;--wp--preset--color--base: #fff;}"
    );
}

#[test]
fn test_origin_filter_excludes_other_layers() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": {
                "palette": {
                    "default": [{ "slug": "base", "color": "#fff" }],
                    "theme": [{ "slug": "accent", "color": "#e91e63" }]
                }
            }
        }
    }));

    let css = theme.get_stylesheet(&[StyleType::Variables], Some(&[Origin::Default]));

    assert!(css.contains("--wp--preset--color--base"));
    assert!(!css.contains("--wp--preset--color--accent"));
}

#[test]
fn test_bare_array_belongs_to_theme_origin() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": { "palette": [{ "slug": "primary", "color": "#007cba" }] }
        }
    }));

    let default_only = theme.get_stylesheet(&[StyleType::Variables], Some(&[Origin::Default]));
    let theme_only = theme.get_stylesheet(&[StyleType::Variables], Some(&[Origin::Theme]));

    assert!(default_only.is_empty());
    assert!(theme_only.contains("--wp--preset--color--primary"));
}

// ============================================================================
// CUSTOM SETTINGS
// ============================================================================

#[test]
fn test_custom_settings_flatten_with_kebab_keys() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "custom": {
                "lineHeight": { "body": 1.7, "heading": { "small": 1.3 } },
                "spacing": "clamp(1rem, 2vw, 2rem)"
            }
        }
    }));

    let css = theme.get_stylesheet(&[StyleType::Variables], None);

    assert!(css.contains("--wp--custom--line-height--body: 1.7;"));
    assert!(css.contains("--wp--custom--line-height--heading--small: 1.3;"));
    assert!(css.contains("--wp--custom--spacing: clamp(1rem, 2vw, 2rem);"));
}

// ============================================================================
// BLOCK-SCOPED SETTINGS
// ============================================================================

#[test]
fn test_block_settings_emit_under_block_selector() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "blocks": {
                "core/group": {
                    "color": { "palette": [{ "slug": "inner", "color": "#abc" }] }
                }
            }
        }
    }));

    let css = theme.get_stylesheet(&[StyleType::Variables], None);

    assert_eq!(css, ".wp-block-group{--wp--preset--color--inner: #abc;}");
}

// ============================================================================
// PRESET CLASSES
// ============================================================================

#[test]
fn test_palette_generates_three_class_families() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": { "palette": [{ "slug": "primary", "color": "#007cba" }] }
        }
    }));

    let css = theme.get_stylesheet(&[StyleType::Presets], None);

    assert!(css.contains(
        ".has-primary-color{color: var(--wp--preset--color--primary) !important;}"
    ));
    assert!(css.contains(
        ".has-primary-background-color{background-color: var(--wp--preset--color--primary) !important;}"
    ));
    assert!(css.contains(
        ".has-primary-border-color{border-color: var(--wp--preset--color--primary) !important;}"
    ));
}

#[test]
fn test_duotone_presets_generate_no_classes() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": { "duotone": [{ "slug": "dark-grayscale" }] }
        }
    }));

    let css = theme.get_stylesheet(&[StyleType::Presets], None);

    assert!(css.is_empty());
}

#[test]
fn test_block_scoped_classes_nest_under_block_selector() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "blocks": {
                "core/group": {
                    "typography": { "fontSizes": [{ "slug": "large", "size": "2rem" }] }
                }
            }
        }
    }));

    let css = theme.get_stylesheet(&[StyleType::Presets], None);

    assert_eq!(
        css,
        ".wp-block-group .has-large-font-size{font-size: var(--wp--preset--font-size--large) !important;}"
    );
}

#[test]
fn test_class_slugs_are_kebab_cased() {
    let theme = engine(json!({
        "version": 2,
        "settings": {
            "color": { "palette": [{ "slug": "warmBlue", "color": "#36c" }] }
        }
    }));

    let css = theme.get_stylesheet(&[StyleType::Presets], None);

    assert!(css.contains(".has-warm-blue-color{color: var(--wp--preset--color--warm-blue) !important;}"));
}

//! Design-token presets: CSS custom properties and preset classes.
//!
//! Presets are named design-token values (colors, gradients, font sizes)
//! that compile to CSS custom property references rather than literal
//! values. Each entry in [`PRESETS_METADATA`] describes where a preset
//! family lives inside `settings`, the infix its custom properties use
//! (`--wp--preset--<infix>--<slug>`), and the utility classes generated
//! for it.
//!
//! Presets are stored per origin: the settings subtree is either a map of
//! `default`/`theme`/`custom` arrays, or a bare array treated as the
//! theme origin. Output is filtered by the requested origins, with later
//! origins overriding earlier ones per slug.

use serde_json::{Map, Value};

use crate::properties::Declaration;
use crate::schema::{Origin, ROOT_BLOCK_SELECTOR, VALID_ORIGINS};
use crate::stylesheet::{scope_selector, to_ruleset};
use crate::tree::{get_in, set_in};
use crate::values::{is_safe_css_declaration, to_kebab_case};

/// How a preset entry's CSS value is obtained.
#[derive(Debug, Clone, Copy)]
pub enum PresetValue {
    /// Read this key from the preset entry.
    Key(&'static str),
    /// Derive a duotone SVG filter reference from the slug.
    DuotoneFilter,
}

/// Metadata for one preset family.
#[derive(Debug, Clone, Copy)]
pub struct PresetMetadata {
    /// Path of the family inside a settings subtree.
    pub path: &'static [&'static str],
    /// Infix used in `--wp--preset--<infix>--<slug>` custom properties,
    /// and the type token matched by `var:preset|<type>|<slug>` references.
    pub css_var_infix: &'static str,
    /// How the CSS value is read from an entry.
    pub value: PresetValue,
    /// Utility classes: (class template containing `$slug`, CSS property).
    pub classes: &'static [(&'static str, &'static str)],
}

/// All preset families, in output order.
pub static PRESETS_METADATA: &[PresetMetadata] = &[
    PresetMetadata {
        path: &["color", "palette"],
        css_var_infix: "color",
        value: PresetValue::Key("color"),
        classes: &[
            ("has-$slug-color", "color"),
            ("has-$slug-background-color", "background-color"),
            ("has-$slug-border-color", "border-color"),
        ],
    },
    PresetMetadata {
        path: &["color", "gradients"],
        css_var_infix: "gradient",
        value: PresetValue::Key("gradient"),
        classes: &[("has-$slug-gradient-background", "background")],
    },
    PresetMetadata {
        path: &["color", "duotone"],
        css_var_infix: "duotone",
        value: PresetValue::DuotoneFilter,
        classes: &[],
    },
    PresetMetadata {
        path: &["typography", "fontSizes"],
        css_var_infix: "font-size",
        value: PresetValue::Key("size"),
        classes: &[("has-$slug-font-size", "font-size")],
    },
    PresetMetadata {
        path: &["typography", "fontFamilies"],
        css_var_infix: "font-family",
        value: PresetValue::Key("fontFamily"),
        classes: &[("has-$slug-font-family", "font-family")],
    },
];

/// The entries of a preset family for one origin. A bare array belongs to
/// the theme origin; anything else yields nothing.
fn origin_entries<'a>(
    settings: &'a Map<String, Value>,
    metadata: &PresetMetadata,
    origin: Origin,
) -> Option<&'a Vec<Value>> {
    match get_in(settings, metadata.path)? {
        Value::Object(by_origin) => by_origin.get(origin.as_str())?.as_array(),
        Value::Array(entries) if origin == Origin::Theme => Some(entries),
        _ => None,
    }
}

fn preset_value(metadata: &PresetMetadata, entry: &Map<String, Value>) -> Option<String> {
    match metadata.value {
        PresetValue::Key(key) => match entry.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        },
        PresetValue::DuotoneFilter => {
            let slug = entry.get("slug")?.as_str()?;
            Some(format!("url(#wp-duotone-{})", to_kebab_case(slug)))
        }
    }
}

/// Checks whether a preset of the given type and slug is defined in any
/// origin of the settings tree. Used to validate `var:preset|...`
/// references before substitution.
pub fn has_preset(settings: &Map<String, Value>, infix: &str, slug: &str) -> bool {
    let target = to_kebab_case(slug);
    PRESETS_METADATA
        .iter()
        .filter(|metadata| metadata.css_var_infix == infix)
        .any(|metadata| {
            VALID_ORIGINS.iter().any(|origin| {
                origin_entries(settings, metadata, *origin).is_some_and(|entries| {
                    entries.iter().any(|entry| {
                        entry
                            .get("slug")
                            .and_then(Value::as_str)
                            .is_some_and(|s| to_kebab_case(s) == target)
                    })
                })
            })
        })
}

/// Compiles the preset custom properties of a settings subtree, filtered
/// by origin. Later origins override earlier ones per custom property.
pub fn compute_preset_vars(
    settings: &Map<String, Value>,
    origins: &[Origin],
) -> Vec<Declaration> {
    let mut declarations: Vec<Declaration> = Vec::new();
    for metadata in PRESETS_METADATA {
        for origin in origins {
            let Some(entries) = origin_entries(settings, metadata, *origin) else {
                continue;
            };
            for entry in entries {
                let Value::Object(entry) = entry else {
                    continue;
                };
                let Some(slug) = entry.get("slug").and_then(Value::as_str) else {
                    continue;
                };
                let Some(value) = preset_value(metadata, entry) else {
                    continue;
                };
                let property = format!(
                    "--wp--preset--{}--{}",
                    metadata.css_var_infix,
                    to_kebab_case(slug)
                );
                upsert(&mut declarations, property, value);
            }
        }
    }
    declarations
}

/// Replaces the value of an existing declaration with the same property,
/// keeping its position, or appends a new one.
fn upsert(declarations: &mut Vec<Declaration>, property: String, value: String) {
    match declarations.iter_mut().find(|d| d.property == property) {
        Some(existing) => existing.value = value,
        None => declarations.push(Declaration { property, value }),
    }
}

/// Compiles `settings.custom` into `--wp--custom--*` declarations, with
/// nested keys flattened and kebab-cased.
pub fn compute_theme_vars(settings: &Map<String, Value>) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    if let Some(custom) = settings.get("custom") {
        flatten_tree(custom, "--wp--custom", &mut declarations);
    }
    declarations
}

fn flatten_tree(value: &Value, prefix: &str, out: &mut Vec<Declaration>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_tree(nested, &format!("{prefix}--{}", to_kebab_case(key)), out);
            }
        }
        Value::String(text) => out.push(Declaration::new(prefix, text.clone())),
        Value::Number(number) => out.push(Declaration::new(prefix, number.to_string())),
        Value::Bool(flag) => out.push(Declaration::new(prefix, flag.to_string())),
        _ => {}
    }
}

/// Generates the preset utility classes of a settings subtree, scoped to
/// the given selector.
pub fn preset_classes(
    settings: &Map<String, Value>,
    selector: &str,
    origins: &[Origin],
) -> String {
    let mut stylesheet = String::new();
    for metadata in PRESETS_METADATA {
        if metadata.classes.is_empty() {
            continue;
        }
        let slugs = preset_slugs(settings, metadata, origins);
        for (template, property) in metadata.classes {
            for slug in &slugs {
                let class = format!(".{}", template.replace("$slug", slug));
                let scoped = if selector == ROOT_BLOCK_SELECTOR {
                    class
                } else {
                    scope_selector(selector, &class)
                };
                let reference = format!(
                    "var(--wp--preset--{}--{slug}) !important",
                    metadata.css_var_infix
                );
                stylesheet.push_str(&to_ruleset(
                    &scoped,
                    &[Declaration::new(*property, reference)],
                ));
            }
        }
    }
    stylesheet
}

fn preset_slugs(
    settings: &Map<String, Value>,
    metadata: &PresetMetadata,
    origins: &[Origin],
) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::new();
    for origin in origins {
        let Some(entries) = origin_entries(settings, metadata, *origin) else {
            continue;
        };
        for entry in entries {
            let Some(slug) = entry.get("slug").and_then(Value::as_str) else {
                continue;
            };
            let slug = to_kebab_case(slug);
            if !slugs.contains(&slug) {
                slugs.push(slug);
            }
        }
    }
    slugs
}

/// Keeps only the preset entries whose value passes the CSS safety policy.
/// Non-preset settings are dropped: untrusted settings carry presets only.
pub(crate) fn remove_insecure_settings(input: &Map<String, Value>) -> Map<String, Value> {
    let mut output = Map::new();
    for metadata in PRESETS_METADATA {
        let Some(node) = get_in(input, metadata.path) else {
            continue;
        };
        match node {
            Value::Object(by_origin) => {
                let mut safe_origins = Map::new();
                for origin in VALID_ORIGINS {
                    let Some(entries) = by_origin.get(origin.as_str()).and_then(Value::as_array)
                    else {
                        continue;
                    };
                    let safe = secure_entries(metadata, entries);
                    if !safe.is_empty() {
                        safe_origins.insert(origin.as_str().to_string(), Value::Array(safe));
                    }
                }
                if !safe_origins.is_empty() {
                    set_in(&mut output, metadata.path, Value::Object(safe_origins));
                }
            }
            Value::Array(entries) => {
                let safe = secure_entries(metadata, entries);
                if !safe.is_empty() {
                    set_in(&mut output, metadata.path, Value::Array(safe));
                }
            }
            _ => {}
        }
    }
    output
}

fn secure_entries(metadata: &PresetMetadata, entries: &[Value]) -> Vec<Value> {
    entries
        .iter()
        .filter(|entry| {
            let Value::Object(entry) = entry else {
                return false;
            };
            if entry.get("slug").and_then(Value::as_str).is_none() {
                return false;
            }
            match preset_value(metadata, entry) {
                Some(value) => is_safe_css_declaration(metadata.css_var_infix, &value),
                None => false,
            }
        })
        .cloned()
        .collect()
}

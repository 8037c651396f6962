//! Declaration compilation: style subtrees → ordered CSS declarations.
//!
//! [`PROPERTIES_METADATA`] is the single source of truth mapping each CSS
//! property to its path inside a style subtree. Compilation walks the
//! table in order, so output order is deterministic regardless of input
//! key order.
//!
//! Values pass through two transforms on the way out:
//!
//! - `var:preset|<type>|<slug>` references resolve to
//!   `var(--wp--preset--<type>--<slug>)`, but only when the slug exists in
//!   the settings presets; unresolved references are dropped
//! - every declaration is checked against the CSS safety policy and
//!   silently dropped on failure

use log::debug;
use serde_json::{Map, Value};

use crate::presets;
use crate::tree::get_in;
use crate::values::{is_safe_css_declaration, parse_preset_ref, to_kebab_case};

/// A single CSS property/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Metadata for style properties: CSS property name → path to the value in
/// a style subtree. Table order fixes output order.
pub static PROPERTIES_METADATA: &[(&str, &[&str])] = &[
    ("background", &["color", "gradient"]),
    ("background-color", &["color", "background"]),
    ("border-radius", &["border", "radius"]),
    ("border-top-left-radius", &["border", "radius", "topLeft"]),
    ("border-top-right-radius", &["border", "radius", "topRight"]),
    ("border-bottom-left-radius", &["border", "radius", "bottomLeft"]),
    ("border-bottom-right-radius", &["border", "radius", "bottomRight"]),
    ("border-color", &["border", "color"]),
    ("border-width", &["border", "width"]),
    ("border-style", &["border", "style"]),
    ("border-top-color", &["border", "top", "color"]),
    ("border-top-width", &["border", "top", "width"]),
    ("border-top-style", &["border", "top", "style"]),
    ("border-right-color", &["border", "right", "color"]),
    ("border-right-width", &["border", "right", "width"]),
    ("border-right-style", &["border", "right", "style"]),
    ("border-bottom-color", &["border", "bottom", "color"]),
    ("border-bottom-width", &["border", "bottom", "width"]),
    ("border-bottom-style", &["border", "bottom", "style"]),
    ("border-left-color", &["border", "left", "color"]),
    ("border-left-width", &["border", "left", "width"]),
    ("border-left-style", &["border", "left", "style"]),
    ("color", &["color", "text"]),
    ("font-family", &["typography", "fontFamily"]),
    ("font-size", &["typography", "fontSize"]),
    ("font-style", &["typography", "fontStyle"]),
    ("font-weight", &["typography", "fontWeight"]),
    ("letter-spacing", &["typography", "letterSpacing"]),
    ("line-height", &["typography", "lineHeight"]),
    ("margin", &["spacing", "margin"]),
    ("margin-top", &["spacing", "margin", "top"]),
    ("margin-right", &["spacing", "margin", "right"]),
    ("margin-bottom", &["spacing", "margin", "bottom"]),
    ("margin-left", &["spacing", "margin", "left"]),
    ("padding", &["spacing", "padding"]),
    ("padding-top", &["spacing", "padding", "top"]),
    ("padding-right", &["spacing", "padding", "right"]),
    ("padding-bottom", &["spacing", "padding", "bottom"]),
    ("padding-left", &["spacing", "padding", "left"]),
    ("text-decoration", &["typography", "textDecoration"]),
    ("text-transform", &["typography", "textTransform"]),
    ("filter", &["filter", "duotone"]),
];

const SIDES: &[&str] = &["top", "right", "bottom", "left"];

/// Compiles a style subtree into an ordered list of declarations.
///
/// `settings` supplies the preset definitions used to resolve
/// `var:preset|...` references; pass `None` when no settings are
/// available, in which case all preset references are dropped.
pub fn compute_style_properties(
    node: &Map<String, Value>,
    settings: Option<&Map<String, Value>>,
) -> Vec<Declaration> {
    let mut declarations = Vec::new();

    for (css_property, path) in PROPERTIES_METADATA {
        let Some(value) = get_in(node, path) else {
            continue;
        };

        // Per-side `margin`/`padding` objects yield nothing here; the side
        // entries of the table pick the values up as longhands.
        if let Some(resolved) = resolve_value(value, settings) {
            push_safe(&mut declarations, (*css_property).to_string(), resolved);
        }
    }

    collapse_border_longhands(&mut declarations);
    declarations
}

fn push_safe(declarations: &mut Vec<Declaration>, property: String, value: String) {
    if is_safe_css_declaration(&property, &value) {
        declarations.push(Declaration { property, value });
    } else {
        debug!("dropping unsafe declaration `{property}: {value}`");
    }
}

/// Resolves a JSON value to a CSS value string. Objects and arrays yield
/// `None`; preset references resolve through the settings tree.
fn resolve_value(value: &Value, settings: Option<&Map<String, Value>>) -> Option<String> {
    match value {
        Value::String(text) if text.starts_with("var:") => resolve_preset_ref(text, settings),
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn resolve_preset_ref(reference: &str, settings: Option<&Map<String, Value>>) -> Option<String> {
    let (kind, slug) = parse_preset_ref(reference)?;
    let settings = settings?;
    if !presets::has_preset(settings, kind, slug) {
        // Unresolved references are dropped, never emitted as placeholders.
        return None;
    }
    Some(format!(
        "var(--wp--preset--{kind}--{})",
        to_kebab_case(slug)
    ))
}

/// Collapses four identical per-side border longhands into the shorthand.
/// Mismatched sides keep their longhand declarations.
fn collapse_border_longhands(declarations: &mut Vec<Declaration>) {
    for suffix in ["color", "style", "width"] {
        let names: Vec<String> = SIDES
            .iter()
            .map(|side| format!("border-{side}-{suffix}"))
            .collect();
        let found: Vec<usize> = declarations
            .iter()
            .enumerate()
            .filter(|(_, d)| names.contains(&d.property))
            .map(|(i, _)| i)
            .collect();
        if found.len() != SIDES.len() {
            continue;
        }
        let value = declarations[found[0]].value.clone();
        if !found.iter().all(|&i| declarations[i].value == value) {
            continue;
        }
        let first = found[0];
        for &i in found.iter().rev() {
            declarations.remove(i);
        }
        declarations.insert(first, Declaration::new(format!("border-{suffix}"), value));
    }
}

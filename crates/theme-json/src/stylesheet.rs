//! The engine type and stylesheet assembly.
//!
//! [`ThemeJson`] owns a sanitized configuration tree for its lifetime
//! (mutation means constructing a new instance) and compiles it into CSS
//! text on demand. Callers choose which output types to include
//! ([`StyleType`]) and which origin layers presets are drawn from.
//!
//! Rule generation order per selector:
//!
//! 1. body-margin reset (root only, so later user margins win the cascade)
//! 2. main declarations ruleset
//! 3. duotone declarations under the scoped duotone selector
//! 4. block-gap layout rules for non-root nodes with an explicit gap
//! 5. root extras: alignment rules, margin-collapse rules, the legacy
//!    block-gap custom property, and the root layout styles

use std::path::Path;
use std::sync::Arc;

use log::warn;
use serde_json::{Map, Value};

use crate::blocks::{BlockRegistry, MetadataCache};
use crate::error::ThemeJsonError;
use crate::nodes::{self, SettingNode, StyleNode};
use crate::presets;
use crate::properties::{compute_style_properties, Declaration};
use crate::schema::{
    migrate, Origin, ELEMENTS, ELEMENT_PSEUDO_SELECTORS, ROOT_BLOCK_SELECTOR, VALID_ORIGINS,
};
use crate::sanitize::sanitize;
use crate::tree::{get_in, get_object};
use crate::values::{is_safe_css_declaration, is_safe_layout_selector, sanitize_class_name};

/// The output types a stylesheet can include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    /// CSS custom properties for presets and custom settings.
    Variables,
    /// The styles section: per-node rulesets.
    Styles,
    /// Utility classes for presets.
    Presets,
    /// Layout rules only; honored when `Styles` is not requested.
    BaseLayoutStyles,
}

/// The default output: variables, styles, and presets.
pub const ALL_STYLE_TYPES: &[StyleType] =
    &[StyleType::Variables, StyleType::Styles, StyleType::Presets];

/// An engine instance over one merged theme.json tree.
///
/// The document is migrated and sanitized at construction; the resulting
/// tree is immutable for the lifetime of the instance.
#[derive(Debug)]
pub struct ThemeJson {
    tree: Map<String, Value>,
    registry: Arc<BlockRegistry>,
    cache: Arc<MetadataCache>,
    block_styles_support: bool,
}

impl ThemeJson {
    /// Builds an engine from an already-parsed document.
    pub fn new(document: Value, registry: Arc<BlockRegistry>, cache: Arc<MetadataCache>) -> Self {
        let document = migrate(document);
        let valid_block_names = registry.names();
        let valid_element_names: Vec<&str> = ELEMENTS.iter().map(|(name, _)| *name).collect();
        let tree = sanitize(&document, &valid_block_names, &valid_element_names);
        Self {
            tree,
            registry,
            cache,
            block_styles_support: false,
        }
    }

    /// Builds an engine from JSON source text.
    pub fn from_str(
        source: &str,
        registry: Arc<BlockRegistry>,
        cache: Arc<MetadataCache>,
    ) -> Result<Self, ThemeJsonError> {
        let document = serde_json::from_str(source)?;
        Ok(Self::new(document, registry, cache))
    }

    /// Builds an engine from a theme.json file.
    pub fn from_file(
        path: impl AsRef<Path>,
        registry: Arc<BlockRegistry>,
        cache: Arc<MetadataCache>,
    ) -> Result<Self, ThemeJsonError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_str(&source, registry, cache)
    }

    /// Builder method to flag legacy per-theme block styles support, which
    /// enables fallback layout gap output for classic themes.
    pub fn with_block_styles_support(mut self, enabled: bool) -> Self {
        self.block_styles_support = enabled;
        self
    }

    /// The sanitized configuration tree.
    pub fn tree(&self) -> &Map<String, Value> {
        &self.tree
    }

    /// The sanitized `settings` subtree, if present.
    pub fn settings(&self) -> Option<&Map<String, Value>> {
        get_object(&self.tree, &["settings"])
    }

    /// Enumerates the style nodes of this tree.
    pub fn style_nodes(&self) -> Vec<StyleNode> {
        let metadata = self.cache.blocks_metadata(&self.registry);
        nodes::style_nodes(&self.tree, &metadata)
    }

    /// Compiles the stylesheet for the requested output types and origins.
    /// `None` origins means all origins.
    pub fn get_stylesheet(&self, types: &[StyleType], origins: Option<&[Origin]>) -> String {
        let origins = origins.unwrap_or(VALID_ORIGINS);
        let metadata = self.cache.blocks_metadata(&self.registry);
        let style_nodes = nodes::style_nodes(&self.tree, &metadata);
        let setting_nodes = nodes::setting_nodes(&self.tree, &metadata);

        let mut stylesheet = String::new();

        if types.contains(&StyleType::Variables) {
            stylesheet.push_str(&self.get_css_variables(&setting_nodes, origins));
        }

        if types.contains(&StyleType::Styles) {
            stylesheet.push_str(&self.get_block_classes(&style_nodes));
        } else if types.contains(&StyleType::BaseLayoutStyles) {
            // Base layout styles ship as part of `styles`; output them
            // separately only when explicitly requested. The columns block
            // is included for its distinct default gap value.
            let base_nodes = [
                StyleNode {
                    path: vec!["styles".to_string()],
                    selector: Some(ROOT_BLOCK_SELECTOR.to_string()),
                    duotone_selector: None,
                    block_name: None,
                },
                StyleNode {
                    path: vec![
                        "styles".to_string(),
                        "blocks".to_string(),
                        "core/columns".to_string(),
                    ],
                    selector: Some(".wp-block-columns".to_string()),
                    duotone_selector: None,
                    block_name: Some("core/columns".to_string()),
                },
            ];
            for node in &base_nodes {
                stylesheet.push_str(&self.get_layout_styles(node));
            }
        }

        if types.contains(&StyleType::Presets) {
            stylesheet.push_str(&self.get_preset_classes(&setting_nodes, origins));
        }

        stylesheet
    }

    /// Deprecated call shape: string-typed `types` argument. Accepted with
    /// a translation shim and a non-fatal deprecation signal.
    pub fn get_stylesheet_legacy(&self, types: &str, origins: Option<&[Origin]>) -> String {
        warn!("get_stylesheet: string `types` argument is deprecated, pass &[StyleType]");
        let mapped: &[StyleType] = match types {
            "block_styles" => &[StyleType::Styles, StyleType::Presets],
            "css_variables" => &[StyleType::Variables],
            _ => ALL_STYLE_TYPES,
        };
        self.get_stylesheet(mapped, origins)
    }

    /// Converts each style node into rulesets and concatenates them. Nodes
    /// with an unresolved selector are skipped.
    fn get_block_classes(&self, style_nodes: &[StyleNode]) -> String {
        let mut block_rules = String::new();
        for metadata in style_nodes {
            if metadata.selector.is_none() {
                continue;
            }
            block_rules.push_str(&self.get_styles_for_block(metadata));
        }
        block_rules
    }

    /// The CSS rules for one style node.
    pub fn get_styles_for_block(&self, metadata: &StyleNode) -> String {
        let Some(selector) = metadata.selector.as_deref() else {
            return String::new();
        };
        let empty = Map::new();
        let node = get_object(&self.tree, &metadata.path).unwrap_or(&empty);
        let settings = self.settings();

        // A pseudo-selector variant (e.g. "a:hover") compiles the payload
        // stored under its pseudo key instead of the element node itself.
        let pseudo = pseudo_suffix(selector);
        let is_element_node = metadata.path.iter().any(|p| p == "elements");
        let current_element = if is_element_node {
            metadata.path.last().map(String::as_str)
        } else {
            None
        };
        let pseudo_payload = match (pseudo, current_element) {
            (Some(pseudo), Some(element)) => {
                let allowed = ELEMENT_PSEUDO_SELECTORS
                    .get(element)
                    .is_some_and(|list| list.contains(&pseudo));
                if allowed {
                    match node.get(pseudo) {
                        Some(Value::Object(payload)) => Some(payload),
                        _ => None,
                    }
                } else {
                    None
                }
            }
            _ => None,
        };

        let declarations = compute_style_properties(pseudo_payload.unwrap_or(node), settings);

        // Separate the declarations that use the duotone selector.
        let (duotone_declarations, declarations): (Vec<_>, Vec<_>) = declarations
            .into_iter()
            .partition(|d| d.property == "filter");

        let mut block_rules = String::new();

        // Reset default browser margin on the root body element before the
        // ruleset generated from the tree, so user-declared root margins
        // win in the cascade.
        if selector == ROOT_BLOCK_SELECTOR {
            block_rules.push_str("body { margin: 0; }");
        }

        block_rules.push_str(&to_ruleset(selector, &declarations));

        if let Some(duotone) = &metadata.duotone_selector {
            if !duotone_declarations.is_empty() {
                let scoped = scope_selector(selector, duotone);
                block_rules.push_str(&to_ruleset(&scoped, &duotone_declarations));
            }
        }

        // Layout block gap styles, for named blocks with an explicit gap.
        let has_block_gap_support = self.has_block_gap_support();
        let has_block_gap_value = gap_value(get_in(node, &["spacing", "blockGap"])).is_some();
        if selector != ROOT_BLOCK_SELECTOR
            && has_block_gap_support
            && has_block_gap_value
            && metadata.block_name.is_some()
        {
            block_rules.push_str(&self.get_layout_styles(metadata));
        }

        if selector == ROOT_BLOCK_SELECTOR {
            block_rules
                .push_str(".wp-site-blocks > .alignleft { float: left; margin-right: 2em; }");
            block_rules
                .push_str(".wp-site-blocks > .alignright { float: right; margin-left: 2em; }");
            block_rules.push_str(
                ".wp-site-blocks > .aligncenter { justify-content: center; margin-left: auto; margin-right: auto; }",
            );

            if has_block_gap_support {
                let block_gap_value = gap_value(get_in(&self.tree, &["styles", "spacing", "blockGap"]))
                    .unwrap_or_else(|| "0.5em".to_string());
                block_rules
                    .push_str(".wp-site-blocks > * { margin-block-start: 0; margin-block-end: 0; }");
                block_rules.push_str(&format!(
                    ".wp-site-blocks > * + * {{ margin-block-start: {block_gap_value}; }}"
                ));
                // Keep the legacy block gap custom property available.
                block_rules.push_str(&format!(
                    "{selector} {{ --wp--style--block-gap: {block_gap_value}; }}"
                ));
            }
            block_rules.push_str(&self.get_layout_styles(metadata));
        }

        block_rules
    }

    /// The CSS layout rules for one node, driven by the registered layout
    /// definitions (`settings.layout.definitions`).
    fn get_layout_styles(&self, metadata: &StyleNode) -> String {
        let selector = metadata.selector.as_deref().unwrap_or("");
        let has_block_gap_support = self.has_block_gap_support();
        let node = get_object(&self.tree, &metadata.path);
        let definitions = get_object(&self.tree, &["settings", "layout", "definitions"]);
        let mut block_rules = String::new();

        // Gap styles are tied to themes that opt in to block gap, or ship
        // legacy block styles; everything else gets no gap output at all.
        if has_block_gap_support || self.block_styles_support {
            let block_gap_value = if has_block_gap_support {
                node.and_then(|n| gap_value(get_in(n, &["spacing", "blockGap"])))
            } else {
                // Classic-theme fallback: the block's declared default gap.
                metadata
                    .block_name
                    .as_deref()
                    .and_then(|name| self.registry.block_gap_default(name))
                    .or_else(|| Some("0.5em".to_string()))
            };

            if let (Some(block_gap_value), Some(definitions)) = (block_gap_value, definitions) {
                for (definition_key, definition) in definitions {
                    // Classic themes skip the default layout so they can
                    // still output flex gap styles.
                    if !has_block_gap_support && definition_key == "default" {
                        continue;
                    }
                    block_rules.push_str(&layout_definition_rules(
                        definition,
                        "blockGapStyles",
                        selector,
                        Some(block_gap_value.as_str()),
                    ));
                }
            }
        }

        // Base styles are root-only.
        if selector == ROOT_BLOCK_SELECTOR {
            if let Some(definitions) = definitions {
                for (_, definition) in definitions {
                    block_rules.push_str(&layout_definition_rules(
                        definition,
                        "baseStyles",
                        selector,
                        None,
                    ));
                }
            }
        }

        block_rules
    }

    /// Whether the tree opts in to block gap handling. An explicit `null`
    /// is an opt-out, same as absence.
    fn has_block_gap_support(&self) -> bool {
        matches!(
            get_in(&self.tree, &["settings", "spacing", "blockGap"]),
            Some(value) if !value.is_null()
        )
    }

    /// One ruleset per setting node, containing only custom property
    /// assignments (presets filtered by origin, plus `settings.custom`).
    fn get_css_variables(&self, setting_nodes: &[SettingNode], origins: &[Origin]) -> String {
        let mut stylesheet = String::new();
        for node in setting_nodes {
            let Some(selector) = node.selector.as_deref() else {
                continue;
            };
            let Some(subtree) = get_object(&self.tree, &node.path) else {
                continue;
            };
            let mut declarations = presets::compute_preset_vars(subtree, origins);
            declarations.extend(presets::compute_theme_vars(subtree));
            stylesheet.push_str(&to_ruleset(selector, &declarations));
        }
        stylesheet
    }

    /// Preset utility classes per setting node, filtered by origin.
    fn get_preset_classes(&self, setting_nodes: &[SettingNode], origins: &[Origin]) -> String {
        let mut stylesheet = String::new();
        for node in setting_nodes {
            let Some(selector) = node.selector.as_deref() else {
                continue;
            };
            let Some(subtree) = get_object(&self.tree, &node.path) else {
                continue;
            };
            stylesheet.push_str(&presets::preset_classes(subtree, selector, origins));
        }
        stylesheet
    }
}

/// Expands one layout definition's rule list (`blockGapStyles` or
/// `baseStyles`) into rulesets. `gap` substitutes non-string rule values;
/// when `None`, non-string values are dropped.
fn layout_definition_rules(
    definition: &Value,
    rules_key: &str,
    selector: &str,
    gap: Option<&str>,
) -> String {
    let Some(definition) = definition.as_object() else {
        return String::new();
    };
    let class_name = definition
        .get("className")
        .and_then(Value::as_str)
        .map(sanitize_class_name)
        .unwrap_or_default();
    if class_name.is_empty() {
        return String::new();
    }
    let Some(rule_groups) = definition.get(rules_key).and_then(Value::as_array) else {
        return String::new();
    };

    let mut block_rules = String::new();
    for group in rule_groups {
        let Some(group) = group.as_object() else {
            continue;
        };
        let Some(suffix) = group.get("selector").and_then(Value::as_str) else {
            continue;
        };
        // Strict allowlist: malformed custom selectors are skipped, never
        // an error.
        if !is_safe_layout_selector(suffix) {
            continue;
        }
        let Some(rules) = group.get("rules").and_then(Value::as_object) else {
            continue;
        };
        if rules.is_empty() {
            continue;
        }

        let mut declarations = Vec::new();
        for (css_property, css_value) in rules {
            let value = match css_value {
                Value::String(text) => Some(text.clone()),
                _ => gap.map(str::to_string),
            };
            let Some(value) = value else {
                continue;
            };
            if is_safe_css_declaration(css_property, &value) {
                declarations.push(Declaration::new(css_property.clone(), value));
            }
        }

        let layout_selector = if selector == ROOT_BLOCK_SELECTOR {
            format!("{selector} .{class_name}{suffix}")
        } else {
            format!("{selector}.{class_name}{suffix}")
        };
        block_rules.push_str(&to_ruleset(&layout_selector, &declarations));
    }
    block_rules
}

/// Joins declarations into a ruleset for one selector. Empty declaration
/// lists yield no output.
pub fn to_ruleset(selector: &str, declarations: &[Declaration]) -> String {
    if declarations.is_empty() {
        return String::new();
    }
    let declaration_block: String = declarations
        .iter()
        .map(|d| format!("{}: {};", d.property, d.value))
        .collect();
    format!("{selector}{{{declaration_block}}}")
}

/// Scopes an inner selector under an outer one, cross-producting the
/// comma-separated parts of both sides.
pub fn scope_selector(scope: &str, selector: &str) -> String {
    let mut scoped = Vec::new();
    for outer in scope.split(',').map(str::trim) {
        for inner in selector.split(',').map(str::trim) {
            scoped.push(format!("{outer} {inner}"));
        }
    }
    scoped.join(", ")
}

/// Resolves a block-gap value: strings and numbers pass through, a
/// `{top, left}` object collapses to the `row column` shorthand (or the
/// single value when both match). Partial objects yield `None`.
fn gap_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(sides) => {
            let row = sides.get("top").and_then(Value::as_str)?;
            let column = sides.get("left").and_then(Value::as_str)?;
            if row == column {
                Some(row.to_string())
            } else {
                Some(format!("{row} {column}"))
            }
        }
        _ => None,
    }
}

/// Extracts the first pseudo-selector suffix (e.g. ":hover") from a
/// selector, if any.
fn pseudo_suffix(selector: &str) -> Option<&str> {
    let start = selector.find(':')?;
    let rest = &selector[start..];
    let end = rest[1..]
        .find(|c: char| !c.is_ascii_lowercase())
        .map(|i| i + 1)
        .unwrap_or(rest.len());
    if end > 1 {
        Some(&rest[..end])
    } else {
        None
    }
}

//! Style and setting node enumeration.
//!
//! A *style node* pairs a path into the sanitized tree with the CSS
//! selector its declarations are emitted under. Enumeration order is
//! deterministic: root first, then each top-level element (plus any
//! pseudo-selector variants present in the tree), then each block (plus
//! its elements and their pseudo variants).
//!
//! Selector lookup misses are not errors: a node whose selector cannot be
//! resolved carries `None` and is silently skipped by the assembler.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::blocks::BlockMetadata;
use crate::schema::{self, ELEMENT_PSEUDO_SELECTORS, ROOT_BLOCK_SELECTOR};

/// Where in the tree a set of CSS declarations applies, and under what
/// selector to emit them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleNode {
    /// Path into the configuration tree (e.g. `["styles", "blocks", "core/group"]`).
    pub path: Vec<String>,
    /// Resolved CSS selector, or `None` on a metadata lookup miss.
    pub selector: Option<String>,
    /// Resolved duotone attachment selector, if any.
    pub duotone_selector: Option<String>,
    /// The owning block, for per-block nodes.
    pub block_name: Option<String>,
}

impl StyleNode {
    fn new<S: Into<String>>(path: Vec<S>, selector: Option<String>) -> Self {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            selector,
            duotone_selector: None,
            block_name: None,
        }
    }
}

/// A settings subtree paired with the selector its custom properties are
/// emitted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingNode {
    /// Path into the configuration tree.
    pub path: Vec<String>,
    /// Resolved CSS selector, or `None` on a metadata lookup miss.
    pub selector: Option<String>,
}

/// Enumerates the style nodes of a sanitized tree.
pub fn style_nodes(
    tree: &Map<String, Value>,
    metadata: &BTreeMap<String, BlockMetadata>,
) -> Vec<StyleNode> {
    let mut nodes = Vec::new();
    let Some(Value::Object(styles)) = tree.get("styles") else {
        return nodes;
    };

    // Top-level.
    nodes.push(StyleNode::new(
        vec!["styles"],
        Some(ROOT_BLOCK_SELECTOR.to_string()),
    ));

    if let Some(Value::Object(elements)) = styles.get("elements") {
        for (element, node) in elements {
            let Some(base) = schema::element_selector(element) else {
                continue;
            };
            nodes.push(StyleNode::new(
                vec!["styles".to_string(), "elements".to_string(), element.clone()],
                Some(base.to_string()),
            ));

            // Pseudo variants, only when present in the tree.
            if let Some(pseudo_selectors) = ELEMENT_PSEUDO_SELECTORS.get(element.as_str()) {
                for pseudo in *pseudo_selectors {
                    if node.get(*pseudo).is_some() {
                        nodes.push(StyleNode::new(
                            vec![
                                "styles".to_string(),
                                "elements".to_string(),
                                element.clone(),
                            ],
                            Some(format!("{base}{pseudo}")),
                        ));
                    }
                }
            }
        }
    }

    nodes.extend(block_nodes(tree, metadata));
    nodes
}

/// Enumerates the per-block style nodes (blocks, block elements, and their
/// pseudo variants).
pub fn block_nodes(
    tree: &Map<String, Value>,
    metadata: &BTreeMap<String, BlockMetadata>,
) -> Vec<StyleNode> {
    let mut nodes = Vec::new();
    let Some(Value::Object(styles)) = tree.get("styles") else {
        return nodes;
    };
    let Some(Value::Object(blocks)) = styles.get("blocks") else {
        return nodes;
    };

    for (name, node) in blocks {
        let block_metadata = metadata.get(name);
        nodes.push(StyleNode {
            path: vec!["styles".to_string(), "blocks".to_string(), name.clone()],
            selector: block_metadata.map(|m| m.selector.clone()),
            duotone_selector: block_metadata.and_then(|m| m.duotone_selector.clone()),
            block_name: Some(name.clone()),
        });

        let Some(Value::Object(elements)) = node.get("elements") else {
            continue;
        };
        for (element, element_node) in elements {
            let element_selector =
                block_metadata.and_then(|m| m.elements.get(element.as_str()).cloned());
            nodes.push(StyleNode::new(
                vec![
                    "styles".to_string(),
                    "blocks".to_string(),
                    name.clone(),
                    "elements".to_string(),
                    element.clone(),
                ],
                element_selector.clone(),
            ));

            if let Some(pseudo_selectors) = ELEMENT_PSEUDO_SELECTORS.get(element.as_str()) {
                for pseudo in *pseudo_selectors {
                    if element_node.get(*pseudo).is_some() {
                        nodes.push(StyleNode::new(
                            vec![
                                "styles".to_string(),
                                "blocks".to_string(),
                                name.clone(),
                                "elements".to_string(),
                                element.clone(),
                            ],
                            element_selector.as_ref().map(|s| format!("{s}{pseudo}")),
                        ));
                    }
                }
            }
        }
    }
    nodes
}

/// Enumerates the setting nodes (root plus per-block) used for CSS custom
/// property generation. No element or pseudo layer exists here.
pub fn setting_nodes(
    tree: &Map<String, Value>,
    metadata: &BTreeMap<String, BlockMetadata>,
) -> Vec<SettingNode> {
    let mut nodes = Vec::new();
    let Some(Value::Object(settings)) = tree.get("settings") else {
        return nodes;
    };

    nodes.push(SettingNode {
        path: vec!["settings".to_string()],
        selector: Some(ROOT_BLOCK_SELECTOR.to_string()),
    });

    if let Some(Value::Object(blocks)) = settings.get("blocks") {
        for (name, _) in blocks {
            nodes.push(SettingNode {
                path: vec!["settings".to_string(), "blocks".to_string(), name.clone()],
                selector: metadata.get(name).map(|m| m.selector.clone()),
            });
        }
    }
    nodes
}

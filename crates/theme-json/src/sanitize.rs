//! Tree sanitization: schema intersection and insecure-property removal.
//!
//! [`sanitize`] prunes an arbitrary input tree down to only schema-valid
//! keys, contextualized by the set of valid block and element names. It
//! fails closed: non-object input yields an empty result, unknown keys are
//! dropped silently at every depth, and empty branches are omitted
//! entirely. The operation is idempotent.
//!
//! [`remove_insecure_properties`] is the stronger pass used for
//! untrusted (user-origin) documents: after sanitizing, every style node
//! and preset entry is additionally filtered through the CSS safety
//! policy.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::blocks::{BlockRegistry, MetadataCache};
use crate::nodes;
use crate::presets;
use crate::properties::PROPERTIES_METADATA;
use crate::schema::{
    migrate, StyleScope, ELEMENTS, ELEMENT_PSEUDO_SELECTORS, VALID_SETTINGS, VALID_STYLES,
    VALID_TOP_LEVEL_KEYS,
};
use crate::tree::{get_in, get_object, set_in};
use crate::values::is_safe_css_declaration;

/// A node in the expected-schema tree the input is intersected against.
///
/// A `Leaf` keeps the input subtree as-is; a `Branch` recurses, dropping
/// keys the branch does not list.
#[derive(Debug, Clone)]
enum SchemaNode {
    Leaf,
    Branch(Arc<BTreeMap<String, SchemaNode>>),
}

type SchemaBranch = BTreeMap<String, SchemaNode>;

/// Style groups/properties valid at any level.
static STYLES_SCHEMA: Lazy<Arc<SchemaBranch>> = Lazy::new(|| Arc::new(style_properties(true)));

/// Style groups/properties with the root-only entries removed; used for
/// element and block schemas.
static STYLES_SCHEMA_NON_TOP: Lazy<Arc<SchemaBranch>> =
    Lazy::new(|| Arc::new(style_properties(false)));

static SETTINGS_SCHEMA: Lazy<Arc<SchemaBranch>> = Lazy::new(|| {
    let mut branch = SchemaBranch::new();
    for (key, props) in VALID_SETTINGS {
        let node = match props {
            None => SchemaNode::Leaf,
            Some(props) => SchemaNode::Branch(Arc::new(
                props
                    .iter()
                    .map(|p| ((*p).to_string(), SchemaNode::Leaf))
                    .collect(),
            )),
        };
        branch.insert((*key).to_string(), node);
    }
    Arc::new(branch)
});

fn style_properties(include_top_only: bool) -> SchemaBranch {
    let mut branch = SchemaBranch::new();
    for (group, props) in VALID_STYLES {
        let props: SchemaBranch = props
            .iter()
            .filter(|(_, scope)| include_top_only || *scope != StyleScope::TopOnly)
            .map(|(p, _)| ((*p).to_string(), SchemaNode::Leaf))
            .collect();
        branch.insert((*group).to_string(), SchemaNode::Branch(Arc::new(props)));
    }
    branch
}

/// Sanitizes an input tree against the schema registry.
///
/// Only the declared top-level keys survive; the `styles` and `settings`
/// branches are recursively intersected against the expected schema built
/// from the given block and element names.
pub fn sanitize<S: AsRef<str>>(
    input: &Value,
    valid_block_names: &[S],
    valid_element_names: &[&str],
) -> Map<String, Value> {
    let mut output = Map::new();
    let Value::Object(input) = input else {
        return output;
    };

    // Preserve only the top most level keys.
    for (key, value) in input {
        if VALID_TOP_LEVEL_KEYS.contains(&key.as_str()) {
            output.insert(key.clone(), value.clone());
        }
    }

    // Per-element style schema: the non-top style set, plus a nested copy
    // under each allowed pseudo selector.
    let mut schema_styles_elements = SchemaBranch::new();
    for element in valid_element_names {
        let mut element_schema = (**STYLES_SCHEMA_NON_TOP).clone();
        if let Some(pseudo_selectors) = ELEMENT_PSEUDO_SELECTORS.get(*element) {
            for pseudo in *pseudo_selectors {
                element_schema.insert(
                    (*pseudo).to_string(),
                    SchemaNode::Branch(STYLES_SCHEMA_NON_TOP.clone()),
                );
            }
        }
        schema_styles_elements.insert(
            (*element).to_string(),
            SchemaNode::Branch(Arc::new(element_schema)),
        );
    }
    let elements_branch = SchemaNode::Branch(Arc::new(schema_styles_elements));

    // Per-block schemas: non-top styles plus the element schema; full
    // settings per block.
    let mut schema_styles_blocks = SchemaBranch::new();
    let mut schema_settings_blocks = SchemaBranch::new();
    for block in valid_block_names {
        let mut block_schema = (**STYLES_SCHEMA_NON_TOP).clone();
        block_schema.insert("elements".to_string(), elements_branch.clone());
        schema_styles_blocks.insert(
            block.as_ref().to_string(),
            SchemaNode::Branch(Arc::new(block_schema)),
        );
        schema_settings_blocks.insert(
            block.as_ref().to_string(),
            SchemaNode::Branch(SETTINGS_SCHEMA.clone()),
        );
    }

    let mut styles_schema = (**STYLES_SCHEMA).clone();
    styles_schema.insert(
        "blocks".to_string(),
        SchemaNode::Branch(Arc::new(schema_styles_blocks)),
    );
    styles_schema.insert("elements".to_string(), elements_branch);

    let mut settings_schema = (**SETTINGS_SCHEMA).clone();
    settings_schema.insert(
        "blocks".to_string(),
        SchemaNode::Branch(Arc::new(schema_settings_blocks)),
    );

    // Remove anything that's not present in the schema.
    for (subtree, schema) in [("styles", styles_schema), ("settings", settings_schema)] {
        match input.get(subtree) {
            None => {}
            Some(Value::Object(map)) => {
                let result = remove_keys_not_in_schema(map, &schema);
                if result.is_empty() {
                    output.remove(subtree);
                } else {
                    output.insert(subtree.to_string(), Value::Object(result));
                }
            }
            Some(_) => {
                output.remove(subtree);
            }
        }
    }

    output
}

/// Recursive schema intersection. Keys absent from the schema are dropped;
/// branch keys whose input is not an object are dropped; empty results are
/// omitted.
fn remove_keys_not_in_schema(input: &Map<String, Value>, schema: &SchemaBranch) -> Map<String, Value> {
    let mut output = Map::new();
    for (key, value) in input {
        match schema.get(key) {
            None => {}
            Some(SchemaNode::Leaf) => {
                output.insert(key.clone(), value.clone());
            }
            Some(SchemaNode::Branch(branch)) => {
                if let Value::Object(map) = value {
                    let result = remove_keys_not_in_schema(map, branch);
                    if !result.is_empty() {
                        output.insert(key.clone(), Value::Object(result));
                    }
                }
            }
        }
    }
    output
}

/// Removes insecure data from an untrusted document.
///
/// The document is migrated and sanitized, then every style node is
/// reduced to the properties whose declarations pass the CSS safety
/// policy, and every setting node is reduced to its safe preset entries.
pub fn remove_insecure_properties(
    document: Value,
    registry: &BlockRegistry,
    cache: &MetadataCache,
) -> Value {
    let document = migrate(document);
    let valid_block_names = registry.names();
    let valid_element_names: Vec<&str> = ELEMENTS.iter().map(|(name, _)| *name).collect();
    let tree = sanitize(&document, &valid_block_names, &valid_element_names);

    let metadata = cache.blocks_metadata(registry);
    let mut secured = Map::new();

    for node in nodes::style_nodes(&tree, &metadata) {
        let Some(input) = get_object(&tree, &node.path) else {
            continue;
        };
        let mut output = remove_insecure_styles(input);

        // The pass above is path-table driven and so skips pseudo-selector
        // branches; re-add the allowlisted ones, filtered the same way.
        if let Some(element) = node.path.last() {
            if let Some(pseudo_selectors) = ELEMENT_PSEUDO_SELECTORS.get(element.as_str()) {
                for pseudo in *pseudo_selectors {
                    if let Some(Value::Object(sub)) = input.get(*pseudo) {
                        let safe = remove_insecure_styles(sub);
                        if !safe.is_empty() {
                            output.insert((*pseudo).to_string(), Value::Object(safe));
                        }
                    }
                }
            }
        }

        if !output.is_empty() {
            set_in(&mut secured, &node.path, Value::Object(output));
        }
    }

    for node in nodes::setting_nodes(&tree, &metadata) {
        let Some(input) = get_object(&tree, &node.path) else {
            continue;
        };
        let output = presets::remove_insecure_settings(input);
        if !output.is_empty() {
            set_in(&mut secured, &node.path, Value::Object(output));
        }
    }

    let mut result = tree;
    for subtree in ["styles", "settings"] {
        match secured.remove(subtree) {
            Some(safe) => {
                result.insert(subtree.to_string(), safe);
            }
            None => {
                result.remove(subtree);
            }
        }
    }
    Value::Object(result)
}

/// Keeps only the style values whose compiled declaration would be safe.
fn remove_insecure_styles(input: &Map<String, Value>) -> Map<String, Value> {
    let mut output = Map::new();
    for (css_property, path) in PROPERTIES_METADATA {
        let Some(value) = get_in(input, path) else {
            continue;
        };
        if insecure_style_value(css_property, value) {
            continue;
        }
        set_in(&mut output, path, value.clone());
    }
    output
}

fn insecure_style_value(css_property: &str, value: &Value) -> bool {
    match value {
        Value::String(text) => !is_safe_css_declaration(css_property, text),
        Value::Object(sides) => sides
            .values()
            .any(|side| insecure_style_value(css_property, side)),
        _ => false,
    }
}

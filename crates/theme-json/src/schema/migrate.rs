//! Schema-version migration for theme.json documents.
//!
//! Documents carry a `version` field. Trees with no version, or version 1,
//! predate the v2 settings layout and are upgraded in place before
//! sanitization. Unknown future versions pass through untouched so that a
//! newer document is never mangled by an older engine.

use serde_json::{Map, Value};

/// The schema version documents are migrated up to.
pub const LATEST_SCHEMA_VERSION: u64 = 2;

/// Settings keys renamed between v1 and v2: (group, old leaf, new leaf).
const V1_TO_V2_RENAMED_PATHS: &[(&str, &str, &str)] = &[
    ("border", "customRadius", "radius"),
    ("spacing", "customMargin", "margin"),
    ("spacing", "customPadding", "padding"),
    ("typography", "customLineHeight", "lineHeight"),
];

/// Migrates a document to the latest schema version.
///
/// Non-object input is returned unchanged; the sanitizer downstream fails
/// closed on it anyway.
pub fn migrate(document: Value) -> Value {
    let Value::Object(mut tree) = document else {
        return document;
    };

    let version = tree.get("version").and_then(Value::as_u64);
    if matches!(version, None | Some(1)) {
        migrate_v1_to_v2(&mut tree);
    }

    Value::Object(tree)
}

/// Applies the v1 → v2 settings renames to the root settings and to every
/// per-block settings branch, then stamps the version.
fn migrate_v1_to_v2(tree: &mut Map<String, Value>) {
    if let Some(Value::Object(settings)) = tree.get_mut("settings") {
        rename_settings_paths(settings);

        if let Some(Value::Object(blocks)) = settings.get_mut("blocks") {
            for (_, block_settings) in blocks.iter_mut() {
                if let Value::Object(block_settings) = block_settings {
                    rename_settings_paths(block_settings);
                }
            }
        }
    }

    tree.insert("version".to_string(), Value::from(LATEST_SCHEMA_VERSION));
}

fn rename_settings_paths(settings: &mut Map<String, Value>) {
    for (group, old_key, new_key) in V1_TO_V2_RENAMED_PATHS {
        let Some(Value::Object(group)) = settings.get_mut(*group) else {
            continue;
        };
        if let Some(value) = group.remove(*old_key) {
            group.insert((*new_key).to_string(), value);
        }
    }
}

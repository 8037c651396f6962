//! The schema registry: static validity tables for theme.json trees.
//!
//! These tables are pure, stateless lookup data. Absent entries simply mean
//! "invalid"; no lookup here ever errors:
//!
//! - [`VALID_SETTINGS`]: setting keys valid under `settings`
//! - [`VALID_STYLES`]: style properties valid under `styles`, with a scope
//!   marker distinguishing root-only properties
//! - [`ELEMENTS`]: the fixed element set and its base CSS selectors
//! - [`ELEMENT_PSEUDO_SELECTORS`]: pseudo-selector allowlist per element
//!
//! ## Path validity
//!
//! [`is_valid_setting_path`] and [`is_valid_style_path`] walk the tables.
//! A path that reaches a leaf marker before it is exhausted stays valid:
//! leaf entries keep their whole subtree (e.g. `settings.custom.anything`).

pub mod migrate;

use phf::phf_map;

pub use migrate::{migrate, LATEST_SCHEMA_VERSION};

/// The CSS selector styles at the tree root apply to.
pub const ROOT_BLOCK_SELECTOR: &str = "body";

/// Top-level document keys that survive sanitization.
pub const VALID_TOP_LEVEL_KEYS: &[&str] = &[
    "customTemplates",
    "patterns",
    "settings",
    "styles",
    "templateParts",
    "title",
    "version",
];

/// Scope marker for entries in [`VALID_STYLES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleScope {
    /// Valid at any tree level.
    Any,
    /// Valid only at the tree root; stripped from element/block schemas.
    TopOnly,
}

/// The tree level a style path is being validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Root,
    Element,
    Block,
    BlockElement,
}

/// Valid keys under `settings`. `None` marks a leaf whose subtree is kept
/// as-is; `Some` lists the allowed properties of a group.
pub static VALID_SETTINGS: &[(&str, Option<&[&str]>)] = &[
    ("appearanceTools", None),
    ("border", Some(&["color", "radius", "style", "width"])),
    (
        "color",
        Some(&[
            "background",
            "custom",
            "customDuotone",
            "customGradient",
            "defaultDuotone",
            "defaultGradients",
            "defaultPalette",
            "duotone",
            "gradients",
            "link",
            "palette",
            "text",
        ]),
    ),
    ("custom", None),
    ("layout", Some(&["contentSize", "definitions", "wideSize"])),
    ("spacing", Some(&["blockGap", "margin", "padding", "units"])),
    (
        "typography",
        Some(&[
            "customFontSize",
            "dropCap",
            "fontFamilies",
            "fontSizes",
            "fontStyle",
            "fontWeight",
            "letterSpacing",
            "lineHeight",
            "textDecoration",
            "textTransform",
        ]),
    ),
];

/// Valid style groups and properties under `styles`.
///
/// The scope marker narrows a property to the tree root, removing it from
/// element and block schemas. No property in the current set is narrowed;
/// `blockGap` in particular must stay valid at the block level so that
/// per-block layout gap rules can be emitted.
pub static VALID_STYLES: &[(&str, &[(&str, StyleScope)])] = &[
    (
        "border",
        &[
            ("color", StyleScope::Any),
            ("radius", StyleScope::Any),
            ("style", StyleScope::Any),
            ("width", StyleScope::Any),
            ("top", StyleScope::Any),
            ("right", StyleScope::Any),
            ("bottom", StyleScope::Any),
            ("left", StyleScope::Any),
        ],
    ),
    (
        "color",
        &[
            ("background", StyleScope::Any),
            ("gradient", StyleScope::Any),
            ("text", StyleScope::Any),
        ],
    ),
    ("filter", &[("duotone", StyleScope::Any)]),
    (
        "spacing",
        &[
            ("blockGap", StyleScope::Any),
            ("margin", StyleScope::Any),
            ("padding", StyleScope::Any),
        ],
    ),
    (
        "typography",
        &[
            ("fontFamily", StyleScope::Any),
            ("fontSize", StyleScope::Any),
            ("fontStyle", StyleScope::Any),
            ("fontWeight", StyleScope::Any),
            ("letterSpacing", StyleScope::Any),
            ("lineHeight", StyleScope::Any),
            ("textDecoration", StyleScope::Any),
            ("textTransform", StyleScope::Any),
        ],
    ),
];

/// The fixed element set and the base selector each maps to.
///
/// The button selector is compound: the `.wp-block-button__link` class
/// keeps targeting older serialized buttons.
pub static ELEMENTS: &[(&str, &str)] = &[
    ("link", "a"),
    ("h1", "h1"),
    ("h2", "h2"),
    ("h3", "h3"),
    ("h4", "h4"),
    ("h5", "h5"),
    ("h6", "h6"),
    ("button", ".wp-element-button, .wp-block-button__link"),
];

/// Pseudo-selector allowlist per element. Applies at both the top level
/// and the block level.
pub static ELEMENT_PSEUDO_SELECTORS: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "link" => &[":hover", ":focus", ":active"],
};

static ELEMENT_CLASS_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "button" => "wp-element-button",
};

/// The configuration layers presets can be drawn from, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Core-provided defaults.
    Default,
    /// The active theme's theme.json.
    Theme,
    /// User customizations.
    Custom,
}

impl Origin {
    /// The key this origin uses inside per-origin preset maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Default => "default",
            Origin::Theme => "theme",
            Origin::Custom => "custom",
        }
    }
}

/// All origins, in cascade order (later layers win).
pub const VALID_ORIGINS: &[Origin] = &[Origin::Default, Origin::Theme, Origin::Custom];

/// Returns the base selector for a top-level element, if it is one of the
/// fixed element set.
pub fn element_selector(element: &str) -> Option<&'static str> {
    ELEMENTS
        .iter()
        .find(|(name, _)| *name == element)
        .map(|(_, selector)| *selector)
}

/// Given an element name, returns its class name, or `""` when the element
/// has none.
pub fn element_class_name(element: &str) -> &'static str {
    ELEMENT_CLASS_NAMES.get(element).copied().unwrap_or("")
}

/// Checks whether a path is valid under `settings`.
pub fn is_valid_setting_path<S: AsRef<str>>(path: &[S]) -> bool {
    let Some(first) = path.first() else {
        return false;
    };
    let Some((_, props)) = VALID_SETTINGS
        .iter()
        .find(|(key, _)| *key == first.as_ref())
    else {
        return false;
    };
    match (props, path.len()) {
        // Leaf entries keep their whole subtree.
        (None, _) => true,
        (Some(_), 1) => true,
        (Some(props), _) => props.contains(&path[1].as_ref()),
    }
}

/// Checks whether a path is valid under `styles` at the given tree level.
///
/// Properties marked [`StyleScope::TopOnly`] are valid only at
/// [`Level::Root`].
pub fn is_valid_style_path<S: AsRef<str>>(path: &[S], level: Level) -> bool {
    let Some(first) = path.first() else {
        return false;
    };
    let Some((_, props)) = VALID_STYLES.iter().find(|(key, _)| *key == first.as_ref()) else {
        return false;
    };
    if path.len() == 1 {
        return true;
    }
    match props.iter().find(|(prop, _)| *prop == path[1].as_ref()) {
        Some((_, StyleScope::Any)) => true,
        Some((_, StyleScope::TopOnly)) => level == Level::Root,
        None => false,
    }
}

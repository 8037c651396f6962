//! # theme-json - Global Styles Configuration Engine
//!
//! A Rust implementation of the theme.json global-styles pipeline: a layered
//! configuration tree (settings + styles) is validated against a schema,
//! merged with block-registration metadata, and compiled into CSS text.
//!
//! The pipeline flows one direction:
//!
//! raw tree → sanitize → enumerate nodes → compile declarations → assemble rulesets
//!
//! This crate provides:
//!
//! - **Schema registry**: static tables describing valid settings/style keys,
//!   element selectors, and allowed pseudo-selectors ([`schema`])
//! - **Sanitization**: recursive schema intersection that silently drops
//!   unknown keys at any depth ([`sanitize`])
//! - **Block metadata**: per-block CSS selectors with a version-keyed,
//!   process-wide cache ([`blocks`])
//! - **Compilation**: property-path metadata driving declaration emission,
//!   with preset-variable substitution and a CSS safety policy
//!   ([`properties`], [`values`], [`presets`])
//! - **Assembly**: the [`ThemeJson`] engine that concatenates rulesets into
//!   the final stylesheet ([`stylesheet`])
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use theme_json::{BlockRegistry, BlockType, MetadataCache, StyleType, ThemeJson};
//!
//! let registry = Arc::new(BlockRegistry::new());
//! registry.register(BlockType::new("core/paragraph"));
//! let cache = Arc::new(MetadataCache::new());
//!
//! let document = serde_json::json!({
//!     "version": 2,
//!     "styles": {
//!         "color": { "text": "#1e1e1e" }
//!     }
//! });
//!
//! let theme = ThemeJson::new(document, registry, cache);
//! let css = theme.get_stylesheet(&[StyleType::Styles], None);
//! assert!(css.contains("color: #1e1e1e;"));
//! ```
//!
//! ## Error Handling
//!
//! Malformed configuration never raises errors: sanitization, selector
//! resolution, and CSS safety checks all fail closed by omitting the
//! offending data. Only the document-loading entry points
//! ([`ThemeJson::from_str`], [`ThemeJson::from_file`]) return a
//! [`ThemeJsonError`].
//!
//! ## Modules
//!
//! - [`schema`]: static validity tables and the v1→v2 migration
//! - [`blocks`]: block registry, metadata resolution, and caching
//! - [`sanitize`]: schema intersection and insecure-property removal
//! - [`nodes`]: style/setting node enumeration
//! - [`properties`]: declaration compilation
//! - [`presets`]: design-token presets and CSS custom properties
//! - [`values`]: value-level parsing and the CSS safety policy
//! - [`stylesheet`]: the engine type and ruleset assembly
//! - [`error`]: error types for document loading

pub mod blocks;
pub mod error;
pub mod nodes;
pub mod presets;
pub mod properties;
pub mod sanitize;
pub mod schema;
pub mod stylesheet;
pub mod values;

mod tree;

pub use blocks::{BlockMetadata, BlockRegistry, BlockSupports, BlockType, MetadataCache};
pub use error::ThemeJsonError;
pub use nodes::{SettingNode, StyleNode};
pub use properties::Declaration;
pub use sanitize::remove_insecure_properties;
pub use schema::{Origin, ROOT_BLOCK_SELECTOR, VALID_ORIGINS};
pub use stylesheet::{StyleType, ThemeJson, ALL_STYLE_TYPES};

//! Error types for loading theme.json documents.
//!
//! Errors are confined to the document-loading boundary. Everything past
//! that point (sanitization, selector resolution, declaration safety)
//! fails closed by dropping data instead of raising.

use thiserror::Error;

/// Errors that can occur while loading a theme.json document.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use theme_json::{BlockRegistry, MetadataCache, ThemeJson};
///
/// let registry = Arc::new(BlockRegistry::new());
/// let cache = Arc::new(MetadataCache::new());
/// let result = ThemeJson::from_str("{ not json", registry, cache);
/// assert!(result.is_err());
/// ```
#[derive(Error, Debug)]
pub enum ThemeJsonError {
    /// The document is not valid JSON.
    #[error("invalid theme.json document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// An I/O error occurred while reading a theme.json file.
    #[error("I/O error reading theme.json")]
    Io(#[from] std::io::Error),
}

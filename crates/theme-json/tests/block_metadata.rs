//! Integration tests for block registration and derived selector metadata.
//!
//! Covers:
//! - Default selector derivation from block names
//! - Explicit selector overrides
//! - Element selector cross-products (compound selectors included)
//! - Cache consistency across registry mutations

use std::sync::Arc;

use theme_json::{BlockRegistry, BlockSupports, BlockType, MetadataCache};

// ============================================================================
// SELECTOR DERIVATION
// ============================================================================

#[test]
fn test_default_selector_strips_core_namespace() {
    let registry = BlockRegistry::new();
    registry.register(BlockType::new("core/paragraph"));
    let cache = MetadataCache::new();

    let metadata = cache.blocks_metadata(&registry);
    assert_eq!(metadata["core/paragraph"].selector, ".wp-block-paragraph");
}

#[test]
fn test_default_selector_flattens_other_namespaces() {
    let registry = BlockRegistry::new();
    registry.register(BlockType::new("myplugin/fancy-quote"));
    let cache = MetadataCache::new();

    let metadata = cache.blocks_metadata(&registry);
    assert_eq!(
        metadata["myplugin/fancy-quote"].selector,
        ".wp-block-myplugin-fancy-quote"
    );
}

#[test]
fn test_explicit_selector_wins_over_derivation() {
    let registry = BlockRegistry::new();
    registry.register(BlockType::new("core/site-title").with_selector(".wp-block-site-title h1"));
    let cache = MetadataCache::new();

    let metadata = cache.blocks_metadata(&registry);
    assert_eq!(
        metadata["core/site-title"].selector,
        ".wp-block-site-title h1"
    );
}

#[test]
fn test_duotone_selector_is_carried_through() {
    let registry = BlockRegistry::new();
    registry.register(BlockType::new("core/image").with_duotone_selector("img"));
    registry.register(BlockType::new("core/group"));
    let cache = MetadataCache::new();

    let metadata = cache.blocks_metadata(&registry);
    assert_eq!(
        metadata["core/image"].duotone_selector.as_deref(),
        Some("img")
    );
    assert!(metadata["core/group"].duotone_selector.is_none());
}

// ============================================================================
// ELEMENT SELECTORS
// ============================================================================

#[test]
fn test_element_selectors_descend_from_block_selector() {
    let registry = BlockRegistry::new();
    registry.register(BlockType::new("core/group"));
    let cache = MetadataCache::new();

    let metadata = cache.blocks_metadata(&registry);
    let elements = &metadata["core/group"].elements;
    assert_eq!(elements["link"], ".wp-block-group a");
    assert_eq!(elements["h2"], ".wp-block-group h2");
}

#[test]
fn test_compound_selectors_cross_product() {
    let registry = BlockRegistry::new();
    registry.register(BlockType::new("core/quote").with_selector(".a, .b"));
    let cache = MetadataCache::new();

    let metadata = cache.blocks_metadata(&registry);
    let elements = &metadata["core/quote"].elements;
    assert_eq!(elements["link"], ".a a, .b a");
    // Both sides compound: every pairing appears, in order.
    assert_eq!(
        elements["button"],
        ".a .wp-element-button, .a .wp-block-button__link, .b .wp-element-button, .b .wp-block-button__link"
    );
}

#[test]
fn test_block_selector_matching_element_short_circuits() {
    let registry = BlockRegistry::new();
    registry.register(BlockType::new("custom/heading").with_selector("h1"));
    let cache = MetadataCache::new();

    let metadata = cache.blocks_metadata(&registry);
    assert_eq!(metadata["custom/heading"].elements["h1"], "h1");
}

// ============================================================================
// REGISTRY + CACHE
// ============================================================================

#[test]
fn test_registration_replaces_same_name() {
    let registry = BlockRegistry::new();
    registry.register(BlockType::new("core/group"));
    registry.register(BlockType::new("core/group").with_selector(".custom-group"));

    assert_eq!(registry.names(), vec!["core/group".to_string()]);
    let block = registry.get("core/group").unwrap();
    assert_eq!(block.selector.as_deref(), Some(".custom-group"));
}

#[test]
fn test_cache_tracks_registry_version() {
    let registry = Arc::new(BlockRegistry::new());
    registry.register(BlockType::new("core/group"));
    let cache = MetadataCache::new();

    let first = cache.blocks_metadata(&registry);
    assert_eq!(first.len(), 1);

    // Same version: same snapshot.
    let again = cache.blocks_metadata(&registry);
    assert!(Arc::ptr_eq(&first, &again));

    // Mutation bumps the version and forces a rebuild.
    registry.register(BlockType::new("core/image"));
    let rebuilt = cache.blocks_metadata(&registry);
    assert_eq!(rebuilt.len(), 2);
    assert!(rebuilt.contains_key("core/image"));
}

#[test]
fn test_invalidate_forces_rebuild() {
    let registry = BlockRegistry::new();
    registry.register(BlockType::new("core/group"));
    let cache = MetadataCache::new();

    let first = cache.blocks_metadata(&registry);
    cache.invalidate();
    let second = cache.blocks_metadata(&registry);

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
}

#[test]
fn test_gap_default_requires_gap_support() {
    let registry = BlockRegistry::new();
    registry.register(
        BlockType::new("core/columns")
            .with_supports(BlockSupports::BLOCK_GAP)
            .with_block_gap_default("2em"),
    );
    registry.register(BlockType::new("core/gallery").with_block_gap_default("1em"));

    let columns = registry.get("core/columns").unwrap();
    assert!(columns.supports.contains(BlockSupports::BLOCK_GAP));
    assert_eq!(
        registry.block_gap_default("core/columns").as_deref(),
        Some("2em")
    );
    // The default is part of the gap support declaration.
    assert!(registry.block_gap_default("core/gallery").is_none());
    assert!(registry.block_gap_default("core/group").is_none());
}

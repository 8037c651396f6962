//! Block registry and per-block CSS selector metadata.
//!
//! The host registers its block types here; the engine derives, per block,
//! its main CSS selector, its per-element sub-selectors, and an optional
//! duotone selector. Derivation is memoized process-wide in a
//! [`MetadataCache`] keyed by the registry version: readers get a
//! consistent snapshot, and the cache rebuilds lazily after any registry
//! mutation (single-writer, multi-reader discipline).

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use bitflags::bitflags;
use log::debug;

use crate::schema;

bitflags! {
    /// Support flags a block type declares at registration.
    ///
    /// # Example
    ///
    /// ```
    /// use theme_json::BlockSupports;
    ///
    /// let supports = BlockSupports::BLOCK_GAP;
    /// assert!(supports.contains(BlockSupports::BLOCK_GAP));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BlockSupports: u8 {
        /// Block opts in to layout block-gap handling.
        const BLOCK_GAP = 0b0000_0001;
    }
}

/// A block type as declared by the host's block registry.
#[derive(Debug, Clone)]
pub struct BlockType {
    /// Namespaced block name (e.g. "core/paragraph").
    pub name: String,
    /// Explicit CSS selector override. When absent the selector is derived
    /// from the block name.
    pub selector: Option<String>,
    /// Selector the duotone filter attaches to, relative to the block.
    pub duotone_selector: Option<String>,
    /// Declared support flags.
    pub supports: BlockSupports,
    /// Default block-gap value for themes without block-gap support.
    pub block_gap_default: Option<String>,
}

impl BlockType {
    /// Creates a block type with derived selector and no special supports.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            selector: None,
            duotone_selector: None,
            supports: BlockSupports::empty(),
            block_gap_default: None,
        }
    }

    /// Builder method to set an explicit CSS selector.
    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selector = Some(selector.to_string());
        self
    }

    /// Builder method to set the duotone attachment selector.
    pub fn with_duotone_selector(mut self, selector: &str) -> Self {
        self.duotone_selector = Some(selector.to_string());
        self
    }

    /// Builder method to set support flags.
    pub fn with_supports(mut self, supports: BlockSupports) -> Self {
        self.supports = supports;
        self
    }

    /// Builder method to set the fallback block-gap value.
    pub fn with_block_gap_default(mut self, value: &str) -> Self {
        self.block_gap_default = Some(value.to_string());
        self
    }
}

/// Derived selector metadata for one block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockMetadata {
    /// The block's main CSS selector.
    pub selector: String,
    /// Scoped duotone selector, if the block declares one.
    pub duotone_selector: Option<String>,
    /// Element name → derived element selector.
    pub elements: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    blocks: Vec<BlockType>,
    version: u64,
}

/// The host's block-type registry.
///
/// Registration replaces any existing block of the same name and bumps the
/// registry version, which invalidates derived metadata on next read.
#[derive(Debug, Default)]
pub struct BlockRegistry {
    inner: RwLock<RegistryInner>,
}

impl BlockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a block type, replacing any previous registration of the
    /// same name.
    pub fn register(&self, block: BlockType) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.blocks.retain(|b| b.name != block.name);
        inner.blocks.push(block);
        inner.version += 1;
    }

    /// The current registry version. Bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// Names of all registered blocks, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .blocks
            .iter()
            .map(|b| b.name.clone())
            .collect()
    }

    /// Looks up a registered block type by name.
    pub fn get(&self, name: &str) -> Option<BlockType> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .blocks
            .iter()
            .find(|b| b.name == name)
            .cloned()
    }

    /// The declared fallback block-gap value for a block. The default is
    /// part of the block's gap support declaration, so blocks without
    /// [`BlockSupports::BLOCK_GAP`] report none.
    pub fn block_gap_default(&self, name: &str) -> Option<String> {
        self.get(name)
            .filter(|b| b.supports.contains(BlockSupports::BLOCK_GAP))
            .and_then(|b| b.block_gap_default)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    version: u64,
    metadata: Arc<BTreeMap<String, BlockMetadata>>,
}

/// Process-wide cache of derived block metadata.
///
/// Lazily computed on first access and rebuilt when the registry version
/// changes. [`MetadataCache::invalidate`] is the explicit invalidation
/// entry point; stale reads otherwise persist for process lifetime.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entry: RwLock<Option<CacheEntry>>,
}

impl MetadataCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the derived metadata for every registered block, rebuilding
    /// if the registry has changed since the last build.
    pub fn blocks_metadata(&self, registry: &BlockRegistry) -> Arc<BTreeMap<String, BlockMetadata>> {
        // Snapshot the registry under a single read lock so the build is
        // consistent even if a writer races us.
        let inner = registry
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let version = inner.version;

        if let Some(entry) = &*self.entry.read().unwrap_or_else(PoisonError::into_inner) {
            if entry.version == version {
                return Arc::clone(&entry.metadata);
            }
        }

        let mut guard = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = &*guard {
            if entry.version == version {
                return Arc::clone(&entry.metadata);
            }
        }

        debug!("rebuilding block metadata for registry version {version}");
        let metadata = Arc::new(build_metadata(&inner.blocks));
        *guard = Some(CacheEntry {
            version,
            metadata: Arc::clone(&metadata),
        });
        metadata
    }

    /// Drops the cached metadata; the next read rebuilds it.
    pub fn invalidate(&self) {
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn build_metadata(blocks: &[BlockType]) -> BTreeMap<String, BlockMetadata> {
    let mut metadata = BTreeMap::new();
    for block in blocks {
        let selector = block
            .selector
            .clone()
            .unwrap_or_else(|| default_selector(&block.name));
        metadata.insert(
            block.name.clone(),
            BlockMetadata {
                elements: element_selectors(&selector),
                duotone_selector: block.duotone_selector.clone(),
                selector,
            },
        );
    }
    metadata
}

/// The derived selector for a block without an explicit one:
/// `core/group` → `.wp-block-group`, `my/nested/name` → `.wp-block-my-nested-name`.
fn default_selector(name: &str) -> String {
    let slug = name.strip_prefix("core/").unwrap_or(name).replace('/', "-");
    format!(".wp-block-{slug}")
}

/// Derives element selectors by cross-producting the block selector parts
/// with each element's base selector parts.
///
/// A block selector part equal to the element's base selector
/// short-circuits to the bare element selector (e.g. a heading block whose
/// selector is already `h1`).
fn element_selectors(block_selector: &str) -> BTreeMap<String, String> {
    let block_parts: Vec<&str> = block_selector.split(',').map(str::trim).collect();

    let mut elements = BTreeMap::new();
    for (element, base) in schema::ELEMENTS {
        let mut parts: Vec<String> = Vec::new();
        for block_part in &block_parts {
            if block_part == base {
                parts = vec![(*base).to_string()];
                break;
            }
            for element_part in base.split(',').map(str::trim) {
                parts.push(format!("{block_part} {element_part}"));
            }
        }
        elements.insert((*element).to_string(), parts.join(", "));
    }
    elements
}

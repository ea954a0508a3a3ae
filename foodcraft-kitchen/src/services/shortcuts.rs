//! Shortcut combinations that bypass generation
//!
//! Some pairs resolve to a uniform random draw from a fixed catalog instead of
//! calling the text provider. Shortcut results are never written to, or read
//! from, the global discovery cache: each draw is independent.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

use foodcraft_common::CanonicalPair;

/// One possible shortcut result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub emoji: &'static str,
    pub category: &'static str,
}

const fn entry(name: &'static str, emoji: &'static str, category: &'static str) -> CatalogEntry {
    CatalogEntry { name, emoji, category }
}

/// What a seed grows into when planted
pub const SPROUT_CATALOG: &[CatalogEntry] = &[
    entry("Basil", "🌿", "herb"),
    entry("Mint", "🌱", "herb"),
    entry("Cilantro", "🌿", "herb"),
    entry("Tomato", "🍅", "vegetable"),
    entry("Carrot", "🥕", "vegetable"),
    entry("Potato", "🥔", "vegetable"),
    entry("Garlic", "🧄", "vegetable"),
    entry("Chili Pepper", "🌶️", "vegetable"),
    entry("Strawberry", "🍓", "fruit"),
    entry("Watermelon", "🍉", "fruit"),
    entry("Wheat", "🌾", "grain"),
    entry("Corn", "🌽", "grain"),
    entry("Sunflower", "🌻", "flower"),
];

/// Soil-like partners for a seed
const SEED_BEDS: &[&str] = &["Mud", "Soil", "Dirt", "Earth"];

/// How a shortcut pair resolves
#[derive(Debug, Clone, Copy)]
pub enum ShortcutPolicy {
    /// Uniform random draw from a catalog
    CatalogDraw(&'static [CatalogEntry]),
}

impl ShortcutPolicy {
    /// `None` only if the catalog is empty
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'static CatalogEntry> {
        match *self {
            ShortcutPolicy::CatalogDraw(catalog) => catalog.choose(rng),
        }
    }
}

/// Canonical pair → shortcut policy, matched case-insensitively
#[derive(Debug, Clone, Default)]
pub struct ShortcutTable {
    entries: HashMap<CanonicalPair, ShortcutPolicy>,
}

impl ShortcutTable {
    /// Table with no shortcuts (every pair is generated)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seed + Mud/Soil/Dirt/Earth grow into a plant
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        for bed in SEED_BEDS {
            table.insert("Seed", bed, ShortcutPolicy::CatalogDraw(SPROUT_CATALOG));
        }
        table
    }

    pub fn insert(&mut self, a: &str, b: &str, policy: ShortcutPolicy) {
        self.entries
            .insert(CanonicalPair::new(a, b).to_ascii_lowercase(), policy);
    }

    pub fn lookup(&self, pair: &CanonicalPair) -> Option<&ShortcutPolicy> {
        self.entries.get(&pair.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Combination Resolver/Cache
//!
//! Turns two ingredient names into a dish. Every pair is generated at most
//! once globally: the result is cached under the canonical (sorted) pair and
//! the first successful write is authoritative for every later lookup.
//!
//! # Resolution order
//! 1. Validate and canonicalize the names
//! 2. Shortcut table (catalog draw, no provider, no cache)
//! 3. Credential check (fails before any I/O)
//! 4. Cache lookup
//! 5. Prompt → text provider with credential rotation → strict JSON parse
//! 6. Optional, best-effort image
//! 7. Atomic insert-if-absent; a lost race returns the winner's row

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use foodcraft_common::{CanonicalPair, Discovery};

use crate::db::{DiscoveryStore, InsertOutcome};
use crate::error::ResolveError;
use crate::providers::{parse_dish, ImageGenerator, TextGenerator};
use crate::services::prompt::build_prompt;
use crate::services::shortcuts::ShortcutTable;

/// Input to a resolution
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    pub ingredient_a: String,
    pub ingredient_b: String,
    /// Parents of `ingredient_a`; generation context only, never part of the key
    pub lineage_a: Option<Vec<String>>,
    pub lineage_b: Option<Vec<String>>,
}

impl ResolveRequest {
    pub fn new(ingredient_a: impl Into<String>, ingredient_b: impl Into<String>) -> Self {
        Self {
            ingredient_a: ingredient_a.into(),
            ingredient_b: ingredient_b.into(),
            lineage_a: None,
            lineage_b: None,
        }
    }

    pub fn with_lineage(
        mut self,
        lineage_a: Option<Vec<String>>,
        lineage_b: Option<Vec<String>>,
    ) -> Self {
        self.lineage_a = lineage_a;
        self.lineage_b = lineage_b;
        self
    }
}

/// Where a resolution came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Existing discovery row
    Cache,
    /// This call generated and stored the row
    Generated,
    /// Random catalog draw; not cached, not a global discovery
    Shortcut { category: String },
}

/// Resolved dish returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub name: String,
    pub emoji: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// True only for the caller whose write created the discovery row
    pub is_new_discovery: bool,
    pub source: ResolutionSource,
}

impl Resolution {
    fn from_discovery(discovery: Discovery, is_new_discovery: bool) -> Self {
        Self {
            name: discovery.result_name,
            emoji: discovery.result_emoji,
            image_url: discovery.result_image_url,
            is_new_discovery,
            source: if is_new_discovery {
                ResolutionSource::Generated
            } else {
                ResolutionSource::Cache
            },
        }
    }
}

/// Combination resolver
///
/// Stateless apart from its collaborators; share it behind an `Arc`.
pub struct CombinationResolver {
    store: Arc<dyn DiscoveryStore>,
    text: TextGenerator,
    image: Option<ImageGenerator>,
    shortcuts: ShortcutTable,
}

impl CombinationResolver {
    pub fn new(
        store: Arc<dyn DiscoveryStore>,
        text: TextGenerator,
        image: Option<ImageGenerator>,
        shortcuts: ShortcutTable,
    ) -> Self {
        Self {
            store,
            text,
            image,
            shortcuts,
        }
    }

    pub fn store(&self) -> &Arc<dyn DiscoveryStore> {
        &self.store
    }

    pub fn images_enabled(&self) -> bool {
        self.image.is_some()
    }

    /// Resolve a combination
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<Resolution, ResolveError> {
        let name_a = request.ingredient_a.trim();
        let name_b = request.ingredient_b.trim();
        if name_a.is_empty() || name_b.is_empty() {
            return Err(ResolveError::InvalidInput(
                "ingredient names must not be empty".to_string(),
            ));
        }

        let pair = CanonicalPair::new(name_a, name_b);

        if let Some(policy) = self.shortcuts.lookup(&pair) {
            // thread_rng is !Send, so the draw must not span an await
            let drawn = policy.draw(&mut rand::thread_rng());
            if let Some(entry) = drawn {
                info!(
                    pair = %pair,
                    result = entry.name,
                    category = entry.category,
                    "Shortcut combination"
                );
                return Ok(Resolution {
                    name: entry.name.to_string(),
                    emoji: entry.emoji.to_string(),
                    image_url: None,
                    is_new_discovery: false,
                    source: ResolutionSource::Shortcut {
                        category: entry.category.to_string(),
                    },
                });
            }
        }

        if !self.text.has_credentials() {
            return Err(ResolveError::Config(
                "no text provider API key configured".to_string(),
            ));
        }

        if let Some(cached) = self.store.find_by_canonical_pair(&pair).await? {
            debug!(pair = %pair, result = %cached.result_name, "Discovery cache hit");
            return Ok(Resolution::from_discovery(cached, false));
        }
        debug!(pair = %pair, "Discovery cache miss, generating");

        let prompt = build_prompt(
            name_a,
            request.lineage_a.as_deref(),
            name_b,
            request.lineage_b.as_deref(),
        );
        let content = self.text.generate(&prompt).await?;
        let dish = parse_dish(&content)?;

        let image_url = match &self.image {
            Some(image) => image.generate(&dish.name).await,
            None => None,
        };

        let outcome = self
            .store
            .insert_if_absent(Discovery::new(pair.clone(), dish.name, dish.emoji, image_url))
            .await?;

        match outcome {
            InsertOutcome::Inserted(discovery) => {
                info!(pair = %pair, result = %discovery.result_name, "New discovery");
                Ok(Resolution::from_discovery(discovery, true))
            }
            InsertOutcome::Existing(discovery) => {
                info!(
                    pair = %pair,
                    result = %discovery.result_name,
                    "Concurrent discovery won the race, returning stored result"
                );
                Ok(Resolution::from_discovery(discovery, false))
            }
        }
    }
}

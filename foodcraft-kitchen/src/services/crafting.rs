//! Combining two ingredients inside a saved game
//!
//! Loads the save, resolves the pair with each ingredient's lineage as
//! context, and appends the result unless the player already owns a dish with
//! that name. The save is left untouched when resolution fails.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use foodcraft_common::{time, GameId, GameState, Ingredient};

use crate::db::GameStateStore;
use crate::error::ResolveError;
use crate::services::resolver::{CombinationResolver, Resolution, ResolveRequest};

#[derive(Debug, Error)]
pub enum CraftError {
    #[error("game not found: {0}")]
    GameNotFound(GameId),

    #[error("ingredient not found in game: {0}")]
    IngredientNotFound(String),

    #[error("cannot combine ingredient {0} with itself")]
    SameIngredient(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] foodcraft_common::Error),
}

/// Result of a craft
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CraftOutcome {
    /// The new ingredient, or the one already owned under the same name
    pub ingredient: Ingredient,
    /// False when the player already had this dish
    pub added: bool,
    pub resolution: Resolution,
}

/// Combine two ingredients of a saved game
pub async fn craft(
    resolver: &CombinationResolver,
    games: &dyn GameStateStore,
    game_id: &GameId,
    first_id: &str,
    second_id: &str,
) -> Result<CraftOutcome, CraftError> {
    let mut game = games
        .load(game_id)
        .await?
        .ok_or_else(|| CraftError::GameNotFound(game_id.clone()))?;

    let first = find(&game, first_id)?;
    let second = find(&game, second_id)?;
    if first_id == second_id {
        return Err(CraftError::SameIngredient(first_id.to_string()));
    }

    let request = ResolveRequest::new(first.name.clone(), second.name.clone())
        .with_lineage(first.lineage(), second.lineage());
    let resolution = resolver.resolve(&request).await?;

    if let Some(existing) = game.discoveries.iter().find(|i| i.name == resolution.name) {
        debug!(game_id = %game_id, dish = %resolution.name, "Dish already discovered in this game");
        return Ok(CraftOutcome {
            ingredient: existing.clone(),
            added: false,
            resolution,
        });
    }

    let ingredient = Ingredient {
        id: format!("{}-{}-{}", first.id, second.id, time::now_millis()),
        name: resolution.name.clone(),
        emoji: resolution.emoji.clone(),
        image_url: resolution.image_url.clone(),
        is_base: false,
        made_from: Some([first.name, second.name]),
    };

    game.discoveries.push(ingredient.clone());
    games.save(game_id, &game.discoveries).await?;

    Ok(CraftOutcome {
        ingredient,
        added: true,
        resolution,
    })
}

fn find(game: &GameState, ingredient_id: &str) -> Result<Ingredient, CraftError> {
    game.find(ingredient_id)
        .cloned()
        .ok_or_else(|| CraftError::IngredientNotFound(ingredient_id.to_string()))
}

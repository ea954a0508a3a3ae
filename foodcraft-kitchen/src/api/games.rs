//! Game save endpoints
//!
//! The `game_id` path segment is the shareable capability: whoever has it
//! can load, overwrite and craft in that save.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use foodcraft_common::models::base_ingredients;
use foodcraft_common::{GameId, GameState, Ingredient};

use crate::services::crafting::{craft, CraftOutcome};
use crate::{ApiError, ApiResult, AppState};

/// A fresh (unsaved) game
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameResponse {
    pub game_id: GameId,
    pub discoveries: Vec<Ingredient>,
    pub share_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGameRequest {
    pub discoveries: Vec<Ingredient>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGameResponse {
    pub game_id: GameId,
    pub share_url: String,
    pub saved_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CraftRequest {
    pub first_id: String,
    pub second_id: String,
}

/// POST /api/games
///
/// Hands out a token and the base ingredients. Nothing is stored until the
/// first save.
pub async fn new_game(State(state): State<AppState>) -> Json<NewGameResponse> {
    let game_id = GameId::generate();
    Json(NewGameResponse {
        share_url: state.share_url(&game_id),
        game_id,
        discoveries: base_ingredients(),
    })
}

/// GET /api/games/:game_id
pub async fn load_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<Json<GameState>> {
    let game_id = GameId::parse(&game_id)?;
    let game = state
        .games
        .load(&game_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("game {}", game_id)))?;
    Ok(Json(game))
}

/// PUT /api/games/:game_id
pub async fn save_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(body): Json<SaveGameRequest>,
) -> ApiResult<Json<SaveGameResponse>> {
    let game_id = GameId::parse(&game_id)?;
    let saved = state.games.save(&game_id, &body.discoveries).await?;
    info!(game_id = %game_id, ingredients = saved.discoveries.len(), "Game saved");

    Ok(Json(SaveGameResponse {
        share_url: state.share_url(&game_id),
        saved_count: saved.discoveries.len(),
        game_id,
    }))
}

/// POST /api/games/:game_id/touch
pub async fn touch_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<StatusCode> {
    let game_id = GameId::parse(&game_id)?;
    if state.games.touch(&game_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("game {}", game_id)))
    }
}

/// POST /api/games/:game_id/craft
pub async fn craft_in_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(body): Json<CraftRequest>,
) -> ApiResult<Json<CraftOutcome>> {
    let game_id = GameId::parse(&game_id)?;
    let outcome = craft(
        &state.resolver,
        state.games.as_ref(),
        &game_id,
        &body.first_id,
        &body.second_id,
    )
    .await?;
    Ok(Json(outcome))
}

pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/api/games", post(new_game))
        .route("/api/games/:game_id", get(load_game).put(save_game))
        .route("/api/games/:game_id/touch", post(touch_game))
        .route("/api/games/:game_id/craft", post(craft_in_game))
}

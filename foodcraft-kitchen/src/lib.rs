//! foodcraft-kitchen library
//!
//! Combination resolver, provider adapters, stores and the HTTP API of the
//! FoodCraft backend. The binary in `main.rs` wires these together.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod providers;
pub mod services;

pub use crate::error::{ApiError, ApiResult, ResolveError};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use foodcraft_common::config::TomlConfig;
use foodcraft_common::GameId;

use crate::db::{GameStateStore, SqliteDiscoveryStore, SqliteGameStateStore};
use crate::providers::{ImageGenerator, TextGenerator};
use crate::services::{CombinationResolver, ShortcutTable};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<CombinationResolver>,
    pub games: Arc<dyn GameStateStore>,
    /// Origin used to build shareable save links
    pub public_base_url: String,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        resolver: Arc<CombinationResolver>,
        games: Arc<dyn GameStateStore>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            games,
            public_base_url: public_base_url.into(),
            startup_time: Utc::now(),
        }
    }

    /// Build the full production state from configuration and an open pool
    pub fn from_config(pool: SqlitePool, toml_config: &TomlConfig) -> Result<Self, ResolveError> {
        let text = TextGenerator::new(
            &toml_config.text_provider,
            config::resolve_text_credentials(toml_config),
        )?;
        if text.has_credentials() {
            info!(
                family = ?toml_config.text_provider.family,
                credentials = text.credential_count(),
                "Text provider configured"
            );
        } else {
            warn!("No text provider API key configured; only shortcut combinations will resolve");
        }

        let image = ImageGenerator::from_config(
            &toml_config.image_provider,
            config::resolve_image_key(toml_config),
        )?;
        if image.is_none() {
            info!("No image provider API key configured; dish images disabled");
        }

        let resolver = CombinationResolver::new(
            Arc::new(SqliteDiscoveryStore::new(pool.clone())),
            text,
            image,
            ShortcutTable::with_defaults(),
        );

        Ok(Self::new(
            Arc::new(resolver),
            Arc::new(SqliteGameStateStore::new(pool)),
            toml_config.public_base_url.clone(),
        ))
    }

    /// Link that lets anyone holding it resume the save
    pub fn share_url(&self, game_id: &GameId) -> String {
        format!(
            "{}/game?load={}",
            self.public_base_url.trim_end_matches('/'),
            game_id
        )
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::combine_routes())
        .merge(api::game_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

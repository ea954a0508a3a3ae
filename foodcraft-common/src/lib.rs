//! # FoodCraft Common Library
//!
//! Shared code for the FoodCraft backend:
//! - Domain models (ingredients, discoveries, game states)
//! - Canonical ingredient pairs used as cache keys
//! - Bootstrap configuration loading and root folder resolution
//! - Database initialization
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pair;
pub mod time;

pub use error::{Error, Result};
pub use models::{Discovery, GameId, GameState, Ingredient};
pub use pair::CanonicalPair;

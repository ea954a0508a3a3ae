//! Domain models shared between the resolver, the stores and the HTTP API
//!
//! JSON field names are camelCase to match the browser client.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CanonicalPair, Error, Result};

/// An ingredient card held in a player's inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_base: bool,
    /// Names of the two parents this ingredient was crafted from (one level only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub made_from: Option<[String; 2]>,
}

impl Ingredient {
    /// Create a base ingredient (no lineage)
    pub fn base(id: &str, name: &str, emoji: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            emoji: emoji.to_string(),
            image_url: None,
            is_base: true,
            made_from: None,
        }
    }

    /// Lineage passed to the resolver as generation context
    pub fn lineage(&self) -> Option<Vec<String>> {
        self.made_from.as_ref().map(|parents| parents.to_vec())
    }
}

/// Starting inventory for a new game
pub fn base_ingredients() -> Vec<Ingredient> {
    vec![
        Ingredient::base("water", "Water", "💧"),
        Ingredient::base("fire", "Fire", "🔥"),
        Ingredient::base("earth", "Earth", "🌍"),
        Ingredient::base("air", "Air", "💨"),
    ]
}

/// Globally shared cache row for one canonical pair
///
/// `ingredient1 <= ingredient2` always holds for rows built through
/// [`Discovery::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discovery {
    pub ingredient1: String,
    pub ingredient2: String,
    pub result_name: String,
    pub result_emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_image_url: Option<String>,
}

impl Discovery {
    pub fn new(
        pair: CanonicalPair,
        result_name: impl Into<String>,
        result_emoji: impl Into<String>,
        result_image_url: Option<String>,
    ) -> Self {
        let (ingredient1, ingredient2) = pair.into_parts();
        Self {
            ingredient1,
            ingredient2,
            result_name: result_name.into(),
            result_emoji: result_emoji.into(),
            result_image_url,
        }
    }

    /// Canonical key of this row
    pub fn pair(&self) -> CanonicalPair {
        CanonicalPair::new(self.ingredient1.clone(), self.ingredient2.clone())
    }
}

const GAME_ID_LEN: usize = 16;
const GAME_ID_MAX_LEN: usize = 64;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque save token
///
/// Anyone holding the token can load and overwrite the save. It is a
/// capability, not an authentication mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameId(String);

impl GameId {
    /// Generate a fresh random token (16 lowercase base-36 characters)
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token: String = (0..GAME_ID_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(token)
    }

    /// Validate a client-supplied token
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() || raw.len() > GAME_ID_MAX_LEN {
            return Err(Error::InvalidInput(format!(
                "game id must be 1-{} characters",
                GAME_ID_MAX_LEN
            )));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::InvalidInput(format!("invalid game id: {}", raw)));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GameId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<GameId> for String {
    fn from(id: GameId) -> Self {
        id.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-player save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub game_id: GameId,
    pub discoveries: Vec<Ingredient>,
    pub last_accessed: DateTime<Utc>,
}

impl GameState {
    pub fn find(&self, ingredient_id: &str) -> Option<&Ingredient> {
        self.discoveries.iter().find(|i| i.id == ingredient_id)
    }
}

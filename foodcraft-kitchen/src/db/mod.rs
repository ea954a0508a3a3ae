//! Persistence for foodcraft-kitchen
//!
//! Both stores sit behind traits so the resolver and the HTTP layer only see
//! the operations they need.

pub mod discoveries;
pub mod game_states;

pub use discoveries::{DiscoveryStore, InsertOutcome, SqliteDiscoveryStore};
pub use game_states::{GameStateStore, SqliteGameStateStore};

//! HTTP API handlers for foodcraft-kitchen

pub mod combine;
pub mod games;
pub mod health;

pub use combine::combine_routes;
pub use games::game_routes;
pub use health::health_routes;

//! Core services: combination resolution, crafting and retention

pub mod crafting;
pub mod prompt;
pub mod resolver;
pub mod retention;
pub mod shortcuts;

pub use resolver::{CombinationResolver, Resolution, ResolutionSource, ResolveRequest};
pub use shortcuts::ShortcutTable;

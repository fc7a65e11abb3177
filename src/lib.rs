//! Roster scraping and reconciliation for a two-game fantasy surf league.
//!
//! One page is fetched per tracked participant from either the WSL fantasy
//! game or Fantasy Surfer, athlete names are resolved against the canonical
//! athlete table, and complete rosters, athlete points and contest standings
//! are upserted into an embedded SQLite store.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod scraper;
pub mod session;
pub mod standings;
pub mod store;
pub mod validate;

pub use client::LeagueClient;
pub use config::Config;
pub use error::{LeagueError, Result, RosterError};
pub use model::*;
pub use store::Store;

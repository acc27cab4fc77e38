//! matchday-state — embedded state store for the Matchday fixture engine.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! storage for competitions, competition teams, and generated matches.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns.
//! Composite keys (`{competition_id}:{team_id}`, `{competition_id}:{seq}`)
//! enable efficient prefix scans for everything belonging to one
//! competition.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;

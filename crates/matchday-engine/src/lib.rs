//! matchday-engine — the competition fixture engine.
//!
//! Two request-scoped operations over competitions stored in
//! `matchday-state`:
//!
//! - Partition a seeded team list into balanced groups (pot-based snake
//!   draft)
//! - Generate the full match calendar under one of three tournament
//!   formats (double round-robin, group stage, single-elimination
//!   knockout first round)
//!
//! # Architecture
//!
//! ```text
//! FixtureEngine
//!   ├── StateStore (read Competition + CompetitionTeam, write labels/matches)
//!   ├── allocator::allocate_groups (pure: teams → group assignments)
//!   └── scheduler::schedule_fixtures (pure: competition + teams → matches)
//! ```
//!
//! The pure functions carry all combinatorial and date logic; the engine
//! wraps them with the store round-trips and persists each result as a
//! single write transaction.

pub mod allocator;
pub mod engine;
pub mod error;
pub mod scheduler;

pub use allocator::{GROUP_LETTERS, GroupAssignment, allocate_groups};
pub use engine::{AllocationSummary, FixtureEngine, ScheduleSummary};
pub use error::{EngineError, EngineResult};
pub use scheduler::{CompetitionFormat, schedule_fixtures};

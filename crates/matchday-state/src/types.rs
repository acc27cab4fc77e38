//! Domain types for the Matchday state store.
//!
//! These types represent the persisted state of competitions, their
//! registered teams, and the matches generated for them. All types are
//! serializable to/from JSON for storage in redb tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unique identifier for a competition.
pub type CompetitionId = String;

/// Unique identifier for a competition-team entry.
pub type TeamId = String;

/// Unique identifier for a club.
pub type ClubId = String;

// ── Competition ───────────────────────────────────────────────────

/// A competition to generate groups and fixtures for.
///
/// Immutable for the duration of one scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    /// Tournament format: "round_robin", "knockout", or "group_knockout".
    ///
    /// Stored as a string and parsed at the point of use; the engine
    /// rejects values it does not recognize.
    pub format: String,
    /// Declared group count for group-based formats. Defaults to 4.
    pub num_groups: Option<u32>,
    /// Declared team count (informational only).
    pub num_teams: Option<u32>,
    /// First possible match date.
    pub start_date: NaiveDate,
    /// Unix timestamp (seconds) when this competition was created.
    pub created_at: u64,
    /// Unix timestamp (seconds) when this competition was last updated.
    pub updated_at: u64,
}

// ── Competition team ──────────────────────────────────────────────

/// A team's entry into a competition, carrying its seed and (once
/// allocated) its group label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitionTeam {
    pub id: TeamId,
    pub competition_id: CompetitionId,
    pub club_id: ClubId,
    /// Seed rank — lower value denotes a stronger seed.
    pub seed: i32,
    /// Group label (single uppercase letter A–H), written by the group
    /// allocator. `None` until allocation runs.
    pub group_name: Option<String>,
}

// ── Match ─────────────────────────────────────────────────────────

/// A generated fixture between two clubs.
///
/// Created only by the fixture scheduler and never mutated by it
/// afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    /// Assigned by the store on insert.
    pub id: String,
    pub competition_id: CompetitionId,
    pub home_club_id: ClubId,
    pub away_club_id: ClubId,
    pub match_date: NaiveDate,
    /// Logical round number grouping matches played around the same time.
    /// Set for round-robin and group-stage matches only.
    pub matchday: Option<u32>,
    /// Group label for group-stage matches only.
    pub group_name: Option<String>,
    /// Round label for knockout matches ("Final", "Quarter-Final", …) and
    /// group-stage matches ("Group Stage").
    pub round: Option<String>,
    pub status: MatchStatus,
}

/// Lifecycle status of a match. The engine only ever writes `Scheduled`;
/// the surrounding system moves matches through the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Played,
    Postponed,
    Cancelled,
}

impl CompetitionTeam {
    /// Build the composite key for the teams table.
    pub fn table_key(&self) -> String {
        format!("{}:{}", self.competition_id, self.id)
    }
}

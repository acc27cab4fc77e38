//! FixtureEngine — request-scoped orchestration over the state store.
//!
//! Each operation is one pass: load the competition and its teams, run the
//! relevant pure algorithm in memory, persist the result as a single write
//! transaction, and return a summary. There is no intermediate persistence
//! and no resumption; invocations for different competitions are fully
//! independent.

use std::collections::{BTreeSet, HashMap};

use tracing::info;

use matchday_state::{Competition, CompetitionTeam, StateStore, TeamId};

use crate::allocator;
use crate::error::{EngineError, EngineResult};
use crate::scheduler;

/// Group count used when a competition doesn't declare one.
const DEFAULT_GROUP_COUNT: u32 = 4;

/// Summary returned by a group allocation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationSummary {
    pub groups_created: u32,
    pub teams_allocated: u32,
}

/// Summary returned by a fixture generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub matches_created: u32,
    pub format: String,
}

/// The fixture engine: group allocation and calendar generation over one
/// shared state store.
#[derive(Clone)]
pub struct FixtureEngine {
    state: StateStore,
}

impl FixtureEngine {
    pub fn new(state: StateStore) -> Self {
        Self { state }
    }

    /// Partition a competition's teams into balanced groups and persist the
    /// labels in one write transaction.
    ///
    /// Idempotent: re-running with an unchanged team list reproduces the
    /// same assignment and overwrites in place.
    pub fn allocate_groups(&self, competition_id: &str) -> EngineResult<AllocationSummary> {
        let (competition, mut teams) = self.load_competition(competition_id)?;

        let num_groups = competition.num_groups.unwrap_or(DEFAULT_GROUP_COUNT);
        let assignments = allocator::allocate_groups(&teams, num_groups)?;

        let groups_created = assignments
            .iter()
            .map(|a| a.group_name.as_str())
            .collect::<BTreeSet<_>>()
            .len() as u32;

        // Fold the labels back into the team rows and persist the batch.
        let labels: HashMap<&TeamId, &str> = assignments
            .iter()
            .map(|a| (&a.team_id, a.group_name.as_str()))
            .collect();
        for team in &mut teams {
            team.group_name = labels.get(&team.id).map(|g| g.to_string());
        }
        self.state.put_teams(&teams)?;

        info!(
            competition = %competition.id,
            groups = groups_created,
            teams = teams.len(),
            "groups allocated"
        );
        Ok(AllocationSummary {
            groups_created,
            teams_allocated: teams.len() as u32,
        })
    }

    /// Generate the full match calendar for a competition and persist it in
    /// one write transaction.
    ///
    /// Rejects competitions that already have matches: scheduling is not
    /// retryable once fixtures exist, so re-invocation is an explicit error
    /// rather than a silent duplication.
    pub fn generate_fixtures(&self, competition_id: &str) -> EngineResult<ScheduleSummary> {
        let (competition, teams) = self.load_competition(competition_id)?;

        if self.state.matches_exist_for_competition(competition_id)? {
            return Err(EngineError::FixturesAlreadyScheduled(
                competition_id.to_string(),
            ));
        }

        let matches = scheduler::schedule_fixtures(&competition, &teams)?;
        let matches_created = self.state.insert_matches(competition_id, matches)?;

        info!(
            competition = %competition.id,
            format = %competition.format,
            matches = matches_created,
            "fixtures scheduled"
        );
        Ok(ScheduleSummary {
            matches_created,
            format: competition.format,
        })
    }

    /// Load a competition and its teams sorted by seed ascending.
    fn load_competition(
        &self,
        competition_id: &str,
    ) -> EngineResult<(Competition, Vec<CompetitionTeam>)> {
        let competition = self
            .state
            .get_competition(competition_id)?
            .ok_or_else(|| EngineError::CompetitionNotFound(competition_id.to_string()))?;
        let teams = self.state.list_teams_for_competition(competition_id)?;
        if teams.is_empty() {
            return Err(EngineError::NoParticipants);
        }
        Ok((competition, teams))
    }
}

//! Group allocator — pot-based snake draft.
//!
//! Partitions a seeded team list into balanced groups the way continental
//! confederations seed their draws: teams are cut into pots of comparable
//! strength, then each pot is dealt across the groups, reversing the walk
//! direction on every other pot so that no group systematically collects
//! the weakest remainder.

use matchday_state::{CompetitionTeam, TeamId};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Fixed group label table. `num_groups` is capped at its length; the
/// allocator fails fast instead of wrapping around.
pub const GROUP_LETTERS: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

/// A single (team, group label) assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAssignment {
    pub team_id: TeamId,
    pub group_name: String,
}

/// Assign every team a group label via a seeded pot / snake draft.
///
/// `teams_by_seed` must already be sorted by seed ascending (strongest
/// first); the store returns teams in that order.
///
/// Pot `p` holds the teams at indices `[p * num_groups, (p+1) * num_groups)`,
/// so pot 0 holds the strongest `num_groups` seeds and no two teams from the
/// same pot can land in the same group. Even-indexed pots walk the groups
/// forward, odd-indexed pots walk them in reverse.
///
/// Deterministic: identical input order yields identical assignments, so
/// re-running safely overwrites previous labels.
pub fn allocate_groups(
    teams_by_seed: &[CompetitionTeam],
    num_groups: u32,
) -> EngineResult<Vec<GroupAssignment>> {
    if teams_by_seed.is_empty() {
        return Err(EngineError::NoParticipants);
    }
    if num_groups < 1 || num_groups as usize > GROUP_LETTERS.len() {
        return Err(EngineError::InvalidGroupCount(num_groups));
    }

    let groups = num_groups as usize;
    let pot_count = teams_by_seed.len().div_ceil(groups);

    // Deal teams into pots in seed order; the last pot may be partial.
    let mut pots: Vec<Vec<&CompetitionTeam>> = vec![Vec::new(); pot_count];
    for (idx, team) in teams_by_seed.iter().enumerate() {
        pots[idx / groups].push(team);
    }

    let mut assignments = Vec::with_capacity(teams_by_seed.len());
    for (pot_idx, pot) in pots.iter().enumerate() {
        for (position, team) in pot.iter().enumerate() {
            let group_idx = if pot_idx % 2 == 0 {
                position
            } else {
                groups - 1 - position
            };
            debug!(
                team = %team.id,
                pot = pot_idx,
                group = GROUP_LETTERS[group_idx],
                "team assigned"
            );
            assignments.push(GroupAssignment {
                team_id: team.id.clone(),
                group_name: GROUP_LETTERS[group_idx].to_string(),
            });
        }
    }

    Ok(assignments)
}

//! Fixture scheduler — match calendar generation.
//!
//! Three independent generation strategies selected by the competition
//! format:
//!
//! - `round_robin`: double round-robin in a single fixed pairing order
//! - `group_knockout`: single round-robin within each group (group stage
//!   only; the knockout bracket is seeded separately once the stage
//!   concludes)
//! - `knockout`: single-elimination opening round, consecutive seed
//!   pairing
//!
//! All date arithmetic is a forward-only cursor, so emitted match dates are
//! non-decreasing in generation order.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use tracing::debug;

use matchday_state::{Competition, CompetitionTeam, MatchRecord, MatchStatus};

use crate::error::{EngineError, EngineResult};

/// Days between consecutive matches in a (group) round-robin sequence.
const MATCH_SPACING_DAYS: u64 = 3;

/// Rest period between the two legs of a double round-robin.
const LEG_REST_DAYS: u64 = 14;

/// Rest period between one group's fixtures and the next group's.
const GROUP_REST_DAYS: u64 = 7;

/// Days between consecutive knockout pairings.
const KNOCKOUT_SPACING_DAYS: u64 = 7;

/// Round-robin matchday advances once every this many emitted matches.
const MATCHES_PER_MATCHDAY: u32 = 5;

/// Round label applied to every group-stage match.
const GROUP_STAGE_ROUND: &str = "Group Stage";

// ── Format ────────────────────────────────────────────────────────

/// Tournament format, parsed from the competition's stored format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetitionFormat {
    RoundRobin,
    Knockout,
    GroupKnockout,
}

impl CompetitionFormat {
    /// Parse a stored format string, rejecting unrecognized values.
    pub fn parse(value: &str) -> EngineResult<Self> {
        match value {
            "round_robin" => Ok(Self::RoundRobin),
            "knockout" => Ok(Self::Knockout),
            "group_knockout" => Ok(Self::GroupKnockout),
            other => Err(EngineError::UnknownFormat(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round_robin",
            Self::Knockout => "knockout",
            Self::GroupKnockout => "group_knockout",
        }
    }
}

// ── Scheduling ────────────────────────────────────────────────────

/// Generate the full match calendar for a competition.
///
/// Pure: the returned matches carry empty IDs (the store assigns them on
/// insert) and nothing is persisted here.
pub fn schedule_fixtures(
    competition: &Competition,
    teams: &[CompetitionTeam],
) -> EngineResult<Vec<MatchRecord>> {
    if teams.is_empty() {
        return Err(EngineError::NoParticipants);
    }

    let matches = match CompetitionFormat::parse(&competition.format)? {
        CompetitionFormat::RoundRobin => round_robin(competition, teams),
        CompetitionFormat::GroupKnockout => group_stage(competition, teams),
        CompetitionFormat::Knockout => knockout_first_round(competition, teams),
    };

    debug!(
        competition = %competition.id,
        format = %competition.format,
        matches = matches.len(),
        "fixtures generated"
    );
    Ok(matches)
}

/// Double round-robin in nested-loop pair order.
///
/// The first leg emits every `(i < j)` pair with the lower seed at home.
/// Each match consumes the date cursor, which then advances by the match
/// spacing; the matchday ticks up once every `MATCHES_PER_MATCHDAY`
/// matches. The second leg starts a fixed rest period after the last
/// first-leg date and replays every pair with home and away swapped, the
/// matchday count continuing where the first leg left off.
fn round_robin(competition: &Competition, teams: &[CompetitionTeam]) -> Vec<MatchRecord> {
    let mut pairs = Vec::new();
    for i in 0..teams.len() {
        for j in (i + 1)..teams.len() {
            pairs.push((teams[i].club_id.clone(), teams[j].club_id.clone()));
        }
    }

    let mut matches = Vec::with_capacity(pairs.len() * 2);
    let mut cursor = competition.start_date;
    let mut last_date = cursor;
    let mut emitted: u32 = 0;

    for (home, away) in &pairs {
        matches.push(league_match(competition, home, away, cursor, emitted));
        last_date = cursor;
        cursor = cursor + Days::new(MATCH_SPACING_DAYS);
        emitted += 1;
    }

    // Reverse fixtures: rest period counted from the last first-leg date.
    cursor = last_date + Days::new(LEG_REST_DAYS);
    for (home, away) in &pairs {
        matches.push(league_match(competition, away, home, cursor, emitted));
        cursor = cursor + Days::new(MATCH_SPACING_DAYS);
        emitted += 1;
    }

    matches
}

fn league_match(
    competition: &Competition,
    home: &str,
    away: &str,
    date: NaiveDate,
    emitted_before: u32,
) -> MatchRecord {
    MatchRecord {
        id: String::new(),
        competition_id: competition.id.clone(),
        home_club_id: home.to_string(),
        away_club_id: away.to_string(),
        match_date: date,
        matchday: Some(emitted_before / MATCHES_PER_MATCHDAY + 1),
        group_name: None,
        round: None,
        status: MatchStatus::Scheduled,
    }
}

/// Single round-robin within each group.
///
/// Teams are partitioned by their existing group label (teams without one
/// fall back to group "A"); groups are processed in discovery order. The
/// matchday is one per group, not per match, and every match is tagged
/// `round = "Group Stage"`. The next group's fixtures start a rest period
/// after the previous group's last match.
fn group_stage(competition: &Competition, teams: &[CompetitionTeam]) -> Vec<MatchRecord> {
    let mut group_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&CompetitionTeam>> = HashMap::new();
    for team in teams {
        let name = team.group_name.clone().unwrap_or_else(|| "A".to_string());
        if !groups.contains_key(&name) {
            group_order.push(name.clone());
        }
        groups.entry(name).or_default().push(team);
    }

    let mut matches = Vec::new();
    let mut cursor = competition.start_date;
    let mut last_date = cursor;

    for (group_idx, name) in group_order.iter().enumerate() {
        if group_idx > 0 {
            cursor = last_date + Days::new(GROUP_REST_DAYS);
        }
        let members = &groups[name];
        let matchday = group_idx as u32 + 1;

        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                matches.push(MatchRecord {
                    id: String::new(),
                    competition_id: competition.id.clone(),
                    home_club_id: members[i].club_id.clone(),
                    away_club_id: members[j].club_id.clone(),
                    match_date: cursor,
                    matchday: Some(matchday),
                    group_name: Some(name.clone()),
                    round: Some(GROUP_STAGE_ROUND.to_string()),
                    status: MatchStatus::Scheduled,
                });
                last_date = cursor;
                cursor = cursor + Days::new(MATCH_SPACING_DAYS);
            }
        }
    }

    matches
}

/// Single-elimination opening round.
///
/// Teams are paired consecutively in seed order; an odd team out receives
/// an implicit bye (no row is written for it). Only the first round is
/// generated — advancing the bracket once results are known is a separate
/// operation this engine does not provide.
fn knockout_first_round(
    competition: &Competition,
    teams: &[CompetitionTeam],
) -> Vec<MatchRecord> {
    let total_rounds = total_knockout_rounds(teams.len());
    let round = knockout_round_label(total_rounds);

    let mut matches = Vec::with_capacity(teams.len() / 2);
    let mut cursor = competition.start_date;

    for pair in teams.chunks(2) {
        let [home, away] = pair else {
            // Odd team count: the final unpaired team sits this round out.
            break;
        };
        matches.push(MatchRecord {
            id: String::new(),
            competition_id: competition.id.clone(),
            home_club_id: home.club_id.clone(),
            away_club_id: away.club_id.clone(),
            match_date: cursor,
            matchday: None,
            group_name: None,
            round: Some(round.clone()),
            status: MatchStatus::Scheduled,
        });
        cursor = cursor + Days::new(KNOCKOUT_SPACING_DAYS);
    }

    matches
}

/// `ceil(log2(team_count))` — the number of rounds a bracket of this size
/// needs to produce a winner.
fn total_knockout_rounds(team_count: usize) -> u32 {
    team_count.next_power_of_two().trailing_zeros()
}

/// Human label for a knockout round, counted by rounds remaining
/// (including the one being labeled).
pub fn knockout_round_label(rounds_remaining: u32) -> String {
    match rounds_remaining {
        1 => "Final".to_string(),
        2 => "Semi-Final".to_string(),
        3 => "Quarter-Final".to_string(),
        r => format!("Round of {}", 1u64 << r),
    }
}

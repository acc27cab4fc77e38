//! StateStore — redb-backed persistence for the Matchday fixture engine.
//!
//! Provides typed CRUD operations over competitions, competition teams, and
//! generated matches. All values are JSON-serialized into redb's `&[u8]`
//! value columns. The store supports both on-disk and in-memory backends
//! (the latter for testing).
//!
//! The fixture engine's write phases are single write transactions
//! (`put_teams`, `insert_matches`), so a batch either lands completely or
//! not at all.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(COMPETITIONS).map_err(map_err!(Table))?;
        txn.open_table(TEAMS).map_err(map_err!(Table))?;
        txn.open_table(MATCHES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Competitions ───────────────────────────────────────────────

    /// Insert or update a competition.
    pub fn put_competition(&self, competition: &Competition) -> StateResult<()> {
        let value = serde_json::to_vec(competition).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(COMPETITIONS).map_err(map_err!(Table))?;
            table
                .insert(competition.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(id = %competition.id, "competition stored");
        Ok(())
    }

    /// Get a competition by ID.
    pub fn get_competition(&self, id: &str) -> StateResult<Option<Competition>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(COMPETITIONS).map_err(map_err!(Table))?;
        match table.get(id).map_err(map_err!(Read))? {
            Some(guard) => {
                let competition: Competition =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(competition))
            }
            None => Ok(None),
        }
    }

    /// List all competitions.
    pub fn list_competitions(&self) -> StateResult<Vec<Competition>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(COMPETITIONS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let competition: Competition =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(competition);
        }
        Ok(results)
    }

    /// Delete a competition along with its teams and matches, all in one
    /// write transaction. Returns true if the competition existed.
    pub fn delete_competition(&self, id: &str) -> StateResult<bool> {
        let prefix = format!("{id}:");
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(COMPETITIONS).map_err(map_err!(Table))?;
            existed = table.remove(id).map_err(map_err!(Write))?.is_some();

            let mut teams = txn.open_table(TEAMS).map_err(map_err!(Table))?;
            Self::remove_prefix(&mut teams, &prefix)?;

            let mut matches = txn.open_table(MATCHES).map_err(map_err!(Table))?;
            Self::remove_prefix(&mut matches, &prefix)?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%id, existed, "competition deleted");
        Ok(existed)
    }

    /// Remove every entry whose key starts with `prefix`.
    fn remove_prefix(
        table: &mut redb::Table<'_, &'static str, &'static [u8]>,
        prefix: &str,
    ) -> StateResult<()> {
        let keys: Vec<String> = table
            .iter()
            .map_err(map_err!(Read))?
            .filter_map(|entry| {
                let (key, _) = entry.ok()?;
                let k = key.value().to_string();
                k.starts_with(prefix).then_some(k)
            })
            .collect();
        for key in &keys {
            table.remove(key.as_str()).map_err(map_err!(Write))?;
        }
        Ok(())
    }

    // ── Teams ──────────────────────────────────────────────────────

    /// Insert or update a single team entry.
    pub fn put_team(&self, team: &CompetitionTeam) -> StateResult<()> {
        let key = team.table_key();
        let value = serde_json::to_vec(team).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(TEAMS).map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Upsert a batch of team entries in one write transaction.
    ///
    /// Used by the group allocator to persist group labels all-or-nothing.
    /// Idempotent: re-writing the same entries overwrites in place.
    pub fn put_teams(&self, teams: &[CompetitionTeam]) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(TEAMS).map_err(map_err!(Table))?;
            for team in teams {
                let key = team.table_key();
                let value = serde_json::to_vec(team).map_err(map_err!(Serialize))?;
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(count = teams.len(), "team batch stored");
        Ok(())
    }

    /// Get a team by its composite key.
    pub fn get_team(&self, key: &str) -> StateResult<Option<CompetitionTeam>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(TEAMS).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let team: CompetitionTeam =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(team))
            }
            None => Ok(None),
        }
    }

    /// List all teams for a competition, sorted by seed ascending.
    ///
    /// The sort is stable over key order, so teams with equal seeds keep
    /// their store order.
    pub fn list_teams_for_competition(
        &self,
        competition_id: &str,
    ) -> StateResult<Vec<CompetitionTeam>> {
        let prefix = format!("{competition_id}:");
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(TEAMS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(&prefix) {
                let team: CompetitionTeam =
                    serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
                results.push(team);
            }
        }
        results.sort_by_key(|t| t.seed);
        Ok(results)
    }

    // ── Matches ────────────────────────────────────────────────────

    /// Insert a batch of generated matches in one write transaction.
    ///
    /// The store assigns each match its ID (`{competition_id}:{seq}`,
    /// continuing from the number of matches already present). Returns the
    /// number of matches inserted.
    pub fn insert_matches(
        &self,
        competition_id: &str,
        mut matches: Vec<MatchRecord>,
    ) -> StateResult<u32> {
        let prefix = format!("{competition_id}:");
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let count = matches.len() as u32;
        {
            let mut table = txn.open_table(MATCHES).map_err(map_err!(Table))?;
            let mut seq = Self::count_prefix(&table, &prefix)?;
            for m in &mut matches {
                m.id = format!("{competition_id}:{seq:04}");
                let value = serde_json::to_vec(&*m).map_err(map_err!(Serialize))?;
                table
                    .insert(m.id.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
                seq += 1;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%competition_id, count, "match batch inserted");
        Ok(count)
    }

    /// List all matches for a competition, in insertion (emission) order.
    pub fn list_matches_for_competition(
        &self,
        competition_id: &str,
    ) -> StateResult<Vec<MatchRecord>> {
        let prefix = format!("{competition_id}:");
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(MATCHES).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(&prefix) {
                let m: MatchRecord =
                    serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
                results.push(m);
            }
        }
        Ok(results)
    }

    /// Check whether any matches exist for a competition.
    pub fn matches_exist_for_competition(&self, competition_id: &str) -> StateResult<bool> {
        let prefix = format!("{competition_id}:");
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(MATCHES).map_err(map_err!(Table))?;
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, _) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(&prefix) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Count entries with a key prefix inside an open table.
    fn count_prefix(
        table: &redb::Table<'_, &'static str, &'static [u8]>,
        prefix: &str,
    ) -> StateResult<u32> {
        let mut count = 0;
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, _) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(prefix) {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_competition(id: &str, format: &str) -> Competition {
        Competition {
            id: id.to_string(),
            name: format!("{id} cup"),
            format: format.to_string(),
            num_groups: Some(4),
            num_teams: Some(16),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            created_at: 1000,
            updated_at: 1000,
        }
    }

    fn test_team(competition_id: &str, id: &str, seed: i32) -> CompetitionTeam {
        CompetitionTeam {
            id: id.to_string(),
            competition_id: competition_id.to_string(),
            club_id: format!("club-{id}"),
            seed,
            group_name: None,
        }
    }

    fn test_match(competition_id: &str, home: &str, away: &str) -> MatchRecord {
        MatchRecord {
            id: String::new(),
            competition_id: competition_id.to_string(),
            home_club_id: home.to_string(),
            away_club_id: away.to_string(),
            match_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            matchday: Some(1),
            group_name: None,
            round: None,
            status: MatchStatus::Scheduled,
        }
    }

    // ── Competition CRUD ───────────────────────────────────────────

    #[test]
    fn competition_put_and_get() {
        let store = StateStore::open_in_memory().unwrap();
        let competition = test_competition("liga-2025", "round_robin");

        store.put_competition(&competition).unwrap();
        let retrieved = store.get_competition("liga-2025").unwrap();

        assert_eq!(retrieved, Some(competition));
    }

    #[test]
    fn competition_get_nonexistent_returns_none() {
        let store = StateStore::open_in_memory().unwrap();
        let result = store.get_competition("nope").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn competition_list_all() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_competition(&test_competition("a", "round_robin")).unwrap();
        store.put_competition(&test_competition("b", "knockout")).unwrap();

        let all = store.list_competitions().unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn competition_update_in_place() {
        let store = StateStore::open_in_memory().unwrap();
        let mut competition = test_competition("liga", "round_robin");
        store.put_competition(&competition).unwrap();

        competition.num_groups = Some(8);
        competition.updated_at = 2000;
        store.put_competition(&competition).unwrap();

        let retrieved = store.get_competition("liga").unwrap().unwrap();
        assert_eq!(retrieved.num_groups, Some(8));
        assert_eq!(retrieved.updated_at, 2000);
    }

    #[test]
    fn competition_delete_cascades_to_teams_and_matches() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_competition(&test_competition("liga", "round_robin")).unwrap();
        store.put_team(&test_team("liga", "t1", 1)).unwrap();
        store.put_team(&test_team("liga", "t2", 2)).unwrap();
        store
            .insert_matches("liga", vec![test_match("liga", "club-t1", "club-t2")])
            .unwrap();

        assert!(store.delete_competition("liga").unwrap());
        assert!(!store.delete_competition("liga").unwrap());
        assert!(store.get_competition("liga").unwrap().is_none());
        assert!(store.list_teams_for_competition("liga").unwrap().is_empty());
        assert!(store.list_matches_for_competition("liga").unwrap().is_empty());
    }

    // ── Team CRUD ──────────────────────────────────────────────────

    #[test]
    fn team_put_and_get() {
        let store = StateStore::open_in_memory().unwrap();
        let team = test_team("liga", "t1", 1);

        store.put_team(&team).unwrap();
        let retrieved = store.get_team("liga:t1").unwrap();

        assert_eq!(retrieved, Some(team));
    }

    #[test]
    fn team_list_sorted_by_seed() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_team(&test_team("liga", "t1", 3)).unwrap();
        store.put_team(&test_team("liga", "t2", 1)).unwrap();
        store.put_team(&test_team("liga", "t3", 2)).unwrap();
        // Different competition, must not leak in.
        store.put_team(&test_team("other", "t9", 0)).unwrap();

        let teams = store.list_teams_for_competition("liga").unwrap();
        let seeds: Vec<i32> = teams.iter().map(|t| t.seed).collect();
        assert_eq!(seeds, vec![1, 2, 3]);
    }

    #[test]
    fn team_equal_seeds_keep_store_order() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_team(&test_team("liga", "a", 1)).unwrap();
        store.put_team(&test_team("liga", "b", 1)).unwrap();
        store.put_team(&test_team("liga", "c", 1)).unwrap();

        let teams = store.list_teams_for_competition("liga").unwrap();
        let ids: Vec<&str> = teams.iter().map(|t| t.id.as_str()).collect();
        // Key order is lexicographic on {competition_id}:{team_id}.
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn team_batch_upsert_overwrites_group_labels() {
        let store = StateStore::open_in_memory().unwrap();
        let mut teams = vec![test_team("liga", "t1", 1), test_team("liga", "t2", 2)];
        store.put_teams(&teams).unwrap();

        teams[0].group_name = Some("A".to_string());
        teams[1].group_name = Some("B".to_string());
        store.put_teams(&teams).unwrap();

        let stored = store.list_teams_for_competition("liga").unwrap();
        assert_eq!(stored[0].group_name.as_deref(), Some("A"));
        assert_eq!(stored[1].group_name.as_deref(), Some("B"));
        assert_eq!(stored.len(), 2);
    }

    // ── Match CRUD ─────────────────────────────────────────────────

    #[test]
    fn matches_insert_assigns_sequential_ids() {
        let store = StateStore::open_in_memory().unwrap();
        let batch = vec![
            test_match("liga", "c1", "c2"),
            test_match("liga", "c3", "c4"),
        ];

        let inserted = store.insert_matches("liga", batch).unwrap();
        assert_eq!(inserted, 2);

        let stored = store.list_matches_for_competition("liga").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, "liga:0000");
        assert_eq!(stored[1].id, "liga:0001");
    }

    #[test]
    fn matches_list_preserves_insertion_order() {
        let store = StateStore::open_in_memory().unwrap();
        let mut batch = Vec::new();
        for i in 0..12 {
            batch.push(test_match("liga", &format!("h{i}"), &format!("a{i}")));
        }
        store.insert_matches("liga", batch).unwrap();

        let stored = store.list_matches_for_competition("liga").unwrap();
        let homes: Vec<&str> = stored.iter().map(|m| m.home_club_id.as_str()).collect();
        let expected: Vec<String> = (0..12).map(|i| format!("h{i}")).collect();
        assert_eq!(homes, expected);
    }

    #[test]
    fn matches_exist_check() {
        let store = StateStore::open_in_memory().unwrap();
        assert!(!store.matches_exist_for_competition("liga").unwrap());

        store
            .insert_matches("liga", vec![test_match("liga", "c1", "c2")])
            .unwrap();
        assert!(store.matches_exist_for_competition("liga").unwrap());
        // Other competitions unaffected.
        assert!(!store.matches_exist_for_competition("other").unwrap());
    }

    #[test]
    fn matches_scoped_per_competition() {
        let store = StateStore::open_in_memory().unwrap();
        store
            .insert_matches("liga", vec![test_match("liga", "c1", "c2")])
            .unwrap();
        store
            .insert_matches("copa", vec![test_match("copa", "c3", "c4")])
            .unwrap();

        assert_eq!(store.list_matches_for_competition("liga").unwrap().len(), 1);
        assert_eq!(store.list_matches_for_competition("copa").unwrap().len(), 1);
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = StateStore::open(&db_path).unwrap();
            store.put_competition(&test_competition("liga", "round_robin")).unwrap();
        }

        // Reopen the same database file.
        let store = StateStore::open(&db_path).unwrap();
        let competition = store.get_competition("liga").unwrap();
        assert!(competition.is_some());
        assert_eq!(competition.unwrap().format, "round_robin");
    }

    // ── Edge cases ─────────────────────────────────────────────────

    #[test]
    fn empty_store_operations() {
        let store = StateStore::open_in_memory().unwrap();

        assert!(store.list_competitions().unwrap().is_empty());
        assert!(store.list_teams_for_competition("any").unwrap().is_empty());
        assert!(store.list_matches_for_competition("any").unwrap().is_empty());
        assert!(!store.matches_exist_for_competition("any").unwrap());
        assert!(!store.delete_competition("nope").unwrap());
    }

    #[test]
    fn empty_match_batch_is_noop() {
        let store = StateStore::open_in_memory().unwrap();
        let inserted = store.insert_matches("liga", Vec::new()).unwrap();
        assert_eq!(inserted, 0);
        assert!(!store.matches_exist_for_competition("liga").unwrap());
    }
}

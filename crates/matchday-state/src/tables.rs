//! redb table definitions for the Matchday state store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain
//! types). Child rows use composite keys of the form
//! `{competition_id}:{child_id}` so that one prefix scan collects everything
//! belonging to a competition.

use redb::TableDefinition;

/// Competitions keyed by `{competition_id}`.
pub const COMPETITIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("competitions");

/// Competition team entries keyed by `{competition_id}:{team_id}`.
pub const TEAMS: TableDefinition<&str, &[u8]> = TableDefinition::new("teams");

/// Generated matches keyed by `{competition_id}:{seq}` (zero-padded insert
/// order, so key order is emission order).
pub const MATCHES: TableDefinition<&str, &[u8]> = TableDefinition::new("matches");

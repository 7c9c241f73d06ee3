//! `SQLite` schema definitions for rushbook.
//!
//! Each collection is a two-column table holding the record key and its
//! JSON document.

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// SQL statement to create the games table.
pub const CREATE_GAMES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS games (
    id TEXT PRIMARY KEY,
    body TEXT NOT NULL
)
";

/// SQL statement to create the plays table.
pub const CREATE_PLAYS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS plays (
    id TEXT PRIMARY KEY,
    body TEXT NOT NULL
)
";

/// SQL statement to create the players table, keyed by `"{team}:{jersey}"`.
pub const CREATE_PLAYERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS players (
    id TEXT PRIMARY KEY,
    body TEXT NOT NULL
)
";

/// SQL statement to drop the players table ahead of a re-key.
pub const DROP_PLAYERS_TABLE: &str = "DROP TABLE IF EXISTS players";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_METADATA_TABLE,
    CREATE_GAMES_TABLE,
    CREATE_PLAYS_TABLE,
    CREATE_PLAYERS_TABLE,
];

//! `SQLite`-backed [`Store`].

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use super::migrations;
use super::{Collection, Record, Store};
use crate::error::{Error, Result};

/// Storage engine for players, games and plays.
///
/// One table per collection, each row holding a record key and its JSON
/// document. Writes are upserts on the key.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count records in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, collection: Collection) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", collection.table());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            players: self.count(Collection::Players)?,
            games: self.count(Collection::Games)?,
            plays: self.count(Collection::Plays)?,
            schema_version: migrations::get_schema_version(&self.conn)?,
            db_size_bytes,
        })
    }
}

impl Store for SqliteStore {
    fn get<R: Record>(&self, key: &str) -> Result<Option<R>> {
        let sql = format!("SELECT body FROM {} WHERE id = ?1", R::COLLECTION.table());
        let body: Option<String> = self
            .conn
            .query_row(&sql, [key], |row| row.get(0))
            .optional()?;
        body.map(|body| serde_json::from_str(&body).map_err(Error::from))
            .transpose()
    }

    fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        let sql = format!("SELECT body FROM {} ORDER BY id", R::COLLECTION.table());
        let mut stmt = self.conn.prepare(&sql)?;
        let bodies = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(Error::from))
            .collect()
    }

    fn put<R: Record>(&self, record: &R) -> Result<()> {
        let body = serde_json::to_string(record)?;
        let sql = format!(
            "INSERT INTO {} (id, body) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET body = excluded.body",
            R::COLLECTION.table()
        );
        self.conn.execute(&sql, params![record.key(), body])?;
        debug!("Stored {} record {}", R::COLLECTION, record.key());
        Ok(())
    }

    fn delete<R: Record>(&self, key: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", R::COLLECTION.table());
        let affected = self.conn.execute(&sql, [key])?;
        debug!("Deleted {} {} record(s) for {}", affected, R::COLLECTION, key);
        Ok(())
    }

    fn clear<R: Record>(&self) -> Result<()> {
        let sql = format!("DELETE FROM {}", R::COLLECTION.table());
        let affected = self.conn.execute(&sql, [])?;
        info!("Cleared {} {} record(s)", affected, R::COLLECTION);
        Ok(())
    }
}

/// Statistics about the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Rostered players across both teams.
    pub players: i64,
    /// Games ever created.
    pub games: i64,
    /// Plays across all games.
    pub plays: i64,
    /// Schema version recorded in the metadata table.
    pub schema_version: i32,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::model::{Game, Play, PlayType, Player, Quarter, Team};
    use crate::storage::migrations::CURRENT_VERSION;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    fn create_test_play(id: &str, yards: i32) -> Play {
        Play {
            id: id.to_string(),
            game_id: "g_1".to_string(),
            team: Team::Home,
            play_type: PlayType::Run,
            quarter: Quarter::First,
            jersey: 22,
            yards,
            touchdown: false,
            fumble: false,
            ts: Utc::now(),
        }
    }

    fn remove_db_files(db_path: &Path) {
        let _ = std::fs::remove_file(db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_put_and_get() {
        let store = create_test_store();
        let player = Player::new(Team::Home, 22, "Kofi");

        store.put(&player).unwrap();

        let retrieved: Option<Player> = store.get("home:22").unwrap();
        assert_eq!(retrieved, Some(player));
    }

    #[test]
    fn test_get_nonexistent() {
        let store = create_test_store();
        let result: Option<Game> = store.get("g_missing").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_put_upserts_by_key() {
        let store = create_test_store();
        store.put(&Player::new(Team::Home, 22, "First")).unwrap();
        store.put(&Player::new(Team::Home, 22, "Second")).unwrap();

        let players: Vec<Player> = store.get_all().unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Second");
        assert_eq!(store.count(Collection::Players).unwrap(), 1);
    }

    #[test]
    fn test_get_all_is_key_ordered() {
        let store = create_test_store();
        store.put(&create_test_play("p_3", 1)).unwrap();
        store.put(&create_test_play("p_1", 2)).unwrap();
        store.put(&create_test_play("p_2", 3)).unwrap();

        let plays: Vec<Play> = store.get_all().unwrap();
        let ids: Vec<&str> = plays.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p_1", "p_2", "p_3"]);
    }

    #[test]
    fn test_collections_are_separate() {
        let store = create_test_store();
        store.put(&Player::new(Team::Away, 5, "")).unwrap();
        store.put(&create_test_play("p_1", 4)).unwrap();

        store.clear::<Play>().unwrap();

        assert_eq!(store.count(Collection::Plays).unwrap(), 0);
        assert_eq!(store.count(Collection::Players).unwrap(), 1);
    }

    #[test]
    fn test_delete() {
        let store = create_test_store();
        store.put(&create_test_play("p_1", 4)).unwrap();

        store.delete::<Play>("p_1").unwrap();
        assert!(store.get::<Play>("p_1").unwrap().is_none());
    }

    #[test]
    fn test_delete_nonexistent_is_ok() {
        let store = create_test_store();
        assert!(store.delete::<Player>("home:99").is_ok());
    }

    #[test]
    fn test_legacy_play_document_without_team() {
        let store = create_test_store();
        store
            .conn
            .execute(
                "INSERT INTO plays (id, body) VALUES (?1, ?2)",
                params![
                    "p_old",
                    r#"{"id":"p_old","game_id":"g_1","type":"run","quarter":"1","jersey":3,"yards":-2,"ts":"2024-09-06T19:00:00Z"}"#
                ],
            )
            .unwrap();

        let play: Play = store.get("p_old").unwrap().unwrap();
        assert_eq!(play.team, Team::Home);
        assert_eq!(play.yards, -2);
        assert!(!play.touchdown);
    }

    #[test]
    fn test_corrupt_document_is_json_error() {
        let store = create_test_store();
        store
            .conn
            .execute(
                "INSERT INTO games (id, body) VALUES ('g_bad', 'not json')",
                [],
            )
            .unwrap();

        let err = store.get::<Game>("g_bad").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_stats_empty() {
        let store = create_test_store();
        let stats = store.stats().unwrap();

        assert_eq!(stats.players, 0);
        assert_eq!(stats.games, 0);
        assert_eq!(stats.plays, 0);
        assert_eq!(stats.schema_version, CURRENT_VERSION);
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_open_file_based_persists() {
        let db_path =
            std::env::temp_dir().join(format!("rushbook_test_{}.db", std::process::id()));
        remove_db_files(&db_path);

        let store = SqliteStore::open(&db_path).unwrap();
        store.put(&Player::new(Team::Home, 1, "Ari")).unwrap();
        assert_eq!(store.path(), db_path);
        drop(store);

        let reopened = SqliteStore::open(&db_path).unwrap();
        let players: Vec<Player> = reopened.get_all().unwrap();
        assert_eq!(players.len(), 1);
        assert!(reopened.stats().unwrap().db_size_bytes > 0);

        drop(reopened);
        remove_db_files(&db_path);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("rushbook_test_{}", std::process::id()));
        let nested_path = root.join("nested/rushbook.db");
        let _ = std::fs::remove_dir_all(&root);

        let store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&root);
    }
}

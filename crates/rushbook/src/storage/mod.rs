//! Storage layer for rushbook.
//!
//! Records live in three named collections (players, games, plays), each a
//! key-value map from a string id to a JSON document. [`Store`] is the
//! minimal interface the rest of the crate talks to; [`SqliteStore`] is the
//! on-disk implementation and [`MemoryStore`] an in-process one.

pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Game, Play, Player};

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StorageStats};

/// A named collection of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Rostered players, keyed by `"{team}:{jersey}"`.
    Players,
    /// Games, keyed by game id.
    Games,
    /// Recorded plays, keyed by play id.
    Plays,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Collection; 3] = [Collection::Players, Collection::Games, Collection::Plays];

    /// Name of the backing table.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Players => "players",
            Self::Games => "games",
            Self::Plays => "plays",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A document that can be kept in a [`Store`].
pub trait Record: Serialize + DeserializeOwned {
    /// The collection this record type lives in.
    const COLLECTION: Collection;

    /// The record's key within its collection.
    fn key(&self) -> &str;
}

impl Record for Player {
    const COLLECTION: Collection = Collection::Players;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Game {
    const COLLECTION: Collection = Collection::Games;

    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Play {
    const COLLECTION: Collection = Collection::Plays;

    fn key(&self) -> &str {
        &self.id
    }
}

/// Key-value object store with one map per [`Collection`].
///
/// `get_all` returns records in ascending key order. `delete` of a missing
/// key and `clear` of an empty collection both succeed.
pub trait Store {
    /// Fetch one record by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored document no
    /// longer decodes.
    fn get<R: Record>(&self, key: &str) -> Result<Option<R>>;

    /// Fetch every record in the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or a stored document no longer
    /// decodes.
    fn get_all<R: Record>(&self) -> Result<Vec<R>>;

    /// Insert or replace a record under its own key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the record cannot be encoded.
    fn put<R: Record>(&self, record: &R) -> Result<()>;

    /// Remove a record by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete<R: Record>(&self, key: &str) -> Result<()>;

    /// Remove every record in the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn clear<R: Record>(&self) -> Result<()>;
}

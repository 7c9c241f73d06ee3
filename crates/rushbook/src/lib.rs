//! `rushbook` - Sideline rushing stats for two-team football games
//!
//! This library provides roster management, play recording with single-step
//! undo, per-team and per-player rushing totals, and CSV export, all kept in
//! a local `SQLite` database.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod session;
pub mod shell;
pub mod stats;
pub mod storage;
pub mod view;

pub use config::Config;
pub use entry::{RushDraft, RushEntry};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Game, GameMeta, Play, Player, Quarter, Team};
pub use session::{AppState, Session};
pub use shell::Shell;
pub use stats::{StatLine, TeamSummary};
pub use storage::{MemoryStore, SqliteStore, StorageStats, Store};

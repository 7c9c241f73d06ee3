//! Command-line interface for rushbook.
//!
//! This module provides the CLI structure for the `rushbook` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, ExportCommand, GameCommand, MetaField, RecentCommand, ResetCommand,
    RosterCommand, RushCommand, SessionCommand, TeamArg, TotalsCommand, team_or,
};

/// rushbook - Sideline rushing stats for two-team football games
///
/// Record runs by jersey, watch team and player totals build up, undo
/// mistakes, and export the game as CSV.
#[derive(Debug, Parser)]
#[command(name = "rushbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run an interactive sideline session
    Session(SessionCommand),

    /// Manage the roster
    #[command(subcommand)]
    Roster(RosterCommand),

    /// Record one rush in the current game
    Rush(RushCommand),

    /// Show a team's latest plays
    Recent(RecentCommand),

    /// Show team and player totals
    Totals(TotalsCommand),

    /// View or edit the current game
    #[command(subcommand)]
    Game(GameCommand),

    /// Export the current game as CSV
    Export(ExportCommand),

    /// Delete every player and play
    Reset(ResetCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

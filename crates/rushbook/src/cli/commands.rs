//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::Team;

/// Interactive session arguments.
#[derive(Debug, Args)]
pub struct SessionCommand {
    /// Team selected at start (defaults to the configured team)
    #[arg(short, long, value_enum)]
    pub team: Option<TeamArg>,

    /// Continue the most recent game instead of starting a new one
    #[arg(short, long)]
    pub resume: bool,
}

/// Roster commands.
#[derive(Debug, Subcommand)]
pub enum RosterCommand {
    /// Add a player, replacing any existing entry for the same jersey
    Add {
        /// Jersey number
        jersey: String,

        /// Player name (optional, may contain spaces)
        name: Vec<String>,

        /// Team the player is on (defaults to the configured team)
        #[arg(short, long, value_enum)]
        team: Option<TeamArg>,
    },

    /// Remove a player by roster id (e.g. `home:22`)
    Remove {
        /// Roster id as shown by `roster list`
        id: String,
    },

    /// List every rostered player
    List,

    /// Add the quick-seed jersey numbers to a team
    Seed {
        /// Team to seed (defaults to the configured team)
        #[arg(short, long, value_enum)]
        team: Option<TeamArg>,
    },
}

/// Rush command arguments.
#[derive(Debug, Args)]
pub struct RushCommand {
    /// Runner's jersey number
    pub jersey: String,

    /// Yards gained, negative for a loss
    #[arg(allow_hyphen_values = true)]
    pub yards: String,

    /// Team that ran the play (defaults to the configured team)
    #[arg(short, long, value_enum)]
    pub team: Option<TeamArg>,

    /// Quarter: 1, 2, 3, 4 or OT
    #[arg(short = 'Q', long, default_value = "1")]
    pub quarter: String,

    /// The run scored
    #[arg(long)]
    pub td: bool,

    /// The runner fumbled
    #[arg(long)]
    pub fumble: bool,
}

/// Recent plays arguments.
#[derive(Debug, Args)]
pub struct RecentCommand {
    /// Team to show (defaults to the configured team)
    #[arg(short, long, value_enum)]
    pub team: Option<TeamArg>,
}

/// Totals arguments.
#[derive(Debug, Args)]
pub struct TotalsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Game metadata commands.
#[derive(Debug, Subcommand)]
pub enum GameCommand {
    /// Show the current game
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Set opponent, date, score or notes on the current game
    Set {
        /// Opponent name
        #[arg(long)]
        opponent: Option<String>,

        /// Game date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Score, as free text
        #[arg(long)]
        score: Option<String>,

        /// Notes
        #[arg(long)]
        notes: Option<String>,
    },
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write to this file instead of the export directory
    #[arg(short, long, value_name = "FILE", conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print the CSV instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Reset command arguments.
#[derive(Debug, Args)]
pub struct ResetCommand {
    /// Confirm deleting every player and play
    #[arg(short, long)]
    pub yes: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Team argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TeamArg {
    /// Home team
    Home,
    /// Away team
    Away,
}

impl From<TeamArg> for Team {
    fn from(arg: TeamArg) -> Self {
        match arg {
            TeamArg::Home => Self::Home,
            TeamArg::Away => Self::Away,
        }
    }
}

/// Resolve an optional `--team`, falling back to `default_team`.
#[must_use]
pub fn team_or(arg: Option<TeamArg>, default_team: Team) -> Team {
    arg.map_or(default_team, Team::from)
}

/// Game metadata field, for the session's `meta` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetaField {
    /// Opponent name
    Opponent,
    /// Game date
    Date,
    /// Score
    Score,
    /// Notes
    Notes,
}

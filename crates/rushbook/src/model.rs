//! Core record types for rushbook.
//!
//! Players, games and plays are the three kinds of document kept in the
//! store. Each one has a string key and serializes to JSON.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// One of the two sides being tracked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// The home side.
    #[default]
    Home,
    /// The visiting side.
    Away,
}

impl Team {
    /// Capitalized label used in tables and recent-play lines.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Away => "Away",
        }
    }

    /// Both teams, home first.
    pub const ALL: [Team; 2] = [Team::Home, Team::Away];
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Away => write!(f, "away"),
        }
    }
}

impl FromStr for Team {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "away" => Ok(Self::Away),
            other => Err(Error::validation(format!(
                "unknown team '{other}' (expected home or away)"
            ))),
        }
    }
}

/// Game period a play happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Quarter {
    /// First quarter.
    #[default]
    #[serde(rename = "1")]
    First,
    /// Second quarter.
    #[serde(rename = "2")]
    Second,
    /// Third quarter.
    #[serde(rename = "3")]
    Third,
    /// Fourth quarter.
    #[serde(rename = "4")]
    Fourth,
    /// Overtime.
    #[serde(rename = "OT")]
    Overtime,
}

impl Quarter {
    /// Short label: `1`..`4` or `OT`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::First => "1",
            Self::Second => "2",
            Self::Third => "3",
            Self::Fourth => "4",
            Self::Overtime => "OT",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quarter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim();
        let label = label
            .strip_prefix('Q')
            .or_else(|| label.strip_prefix('q'))
            .unwrap_or(label);
        match label.to_ascii_uppercase().as_str() {
            "1" => Ok(Self::First),
            "2" => Ok(Self::Second),
            "3" => Ok(Self::Third),
            "4" => Ok(Self::Fourth),
            "OT" => Ok(Self::Overtime),
            _ => Err(Error::validation(format!(
                "unknown quarter '{}' (expected 1, 2, 3, 4 or OT)",
                s.trim()
            ))),
        }
    }
}

/// Kind of play. Only rushing plays are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayType {
    /// A rushing play.
    #[default]
    Run,
}

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Composite key, `"{team}:{jersey}"`.
    pub id: String,
    /// Team the player is on.
    pub team: Team,
    /// Jersey number.
    pub jersey: u32,
    /// Display name; empty when unknown.
    #[serde(default)]
    pub name: String,
}

impl Player {
    /// Create a player. The name is trimmed.
    #[must_use]
    pub fn new(team: Team, jersey: u32, name: &str) -> Self {
        Self {
            id: Self::key(team, jersey),
            team,
            jersey,
            name: name.trim().to_string(),
        }
    }

    /// The roster key for a team and jersey number.
    #[must_use]
    pub fn key(team: Team, jersey: u32) -> String {
        format!("{team}:{jersey}")
    }
}

/// Free-text details about a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameMeta {
    /// Opponent name.
    pub opponent: String,
    /// Date the game was played.
    pub date: Option<NaiveDate>,
    /// Final or current score, as typed.
    pub score: String,
    /// Anything else.
    pub notes: String,
}

/// A partial update to [`GameMeta`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaPatch {
    /// New opponent.
    pub opponent: Option<String>,
    /// New date.
    pub date: Option<NaiveDate>,
    /// New score.
    pub score: Option<String>,
    /// New notes.
    pub notes: Option<String>,
}

impl MetaPatch {
    /// Check whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opponent.is_none()
            && self.date.is_none()
            && self.score.is_none()
            && self.notes.is_none()
    }
}

impl GameMeta {
    /// Apply a patch, trimming text fields.
    pub fn apply(&mut self, patch: MetaPatch) {
        if let Some(opponent) = patch.opponent {
            self.opponent = opponent.trim().to_string();
        }
        if let Some(date) = patch.date {
            self.date = Some(date);
        }
        if let Some(score) = patch.score {
            self.score = score.trim().to_string();
        }
        if let Some(notes) = patch.notes {
            self.notes = notes.trim().to_string();
        }
    }
}

/// A tracked game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Opaque id, `g_{unix millis}`.
    pub id: String,
    /// When the game record was created.
    pub created_at: DateTime<Utc>,
    /// Opponent, date, score and notes.
    #[serde(default)]
    pub meta: GameMeta,
}

impl Game {
    /// Create a game stamped with `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: format!("g_{}", now.timestamp_millis()),
            created_at: now,
            meta: GameMeta::default(),
        }
    }
}

/// One recorded play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    /// Opaque id, `p_{unix millis}_{suffix}`.
    pub id: String,
    /// The game this play belongs to.
    pub game_id: String,
    /// Team that ran the play.
    ///
    /// Compatibility shim: plays stored before two-team tracking have no
    /// `team` field and are read back as home.
    #[serde(default)]
    pub team: Team,
    /// Kind of play.
    #[serde(rename = "type", default)]
    pub play_type: PlayType,
    /// Quarter the play happened in.
    pub quarter: Quarter,
    /// Runner's jersey number.
    pub jersey: u32,
    /// Yards gained; negative for a loss.
    pub yards: i32,
    /// Whether the run scored.
    #[serde(default)]
    pub touchdown: bool,
    /// Whether the runner fumbled.
    #[serde(default)]
    pub fumble: bool,
    /// When the play was recorded.
    pub ts: DateTime<Utc>,
}

impl Play {
    /// Generate a fresh play id for `now`.
    ///
    /// The random suffix keeps ids unique when two plays land in the same
    /// millisecond.
    #[must_use]
    pub fn new_id(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("p_{}_{}", now.timestamp_millis(), &suffix[..8])
    }
}

/// Parse a jersey number typed by the user.
///
/// # Errors
///
/// Returns a validation error if the input is not a non-negative integer.
pub fn parse_jersey(input: &str) -> Result<u32> {
    input
        .trim()
        .parse()
        .map_err(|_| Error::validation("Enter jersey #"))
}

/// Parse a `YYYY-MM-DD` game date.
///
/// # Errors
///
/// Returns a validation error if the date is malformed.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        Error::validation(format!("invalid date '{input}' (expected YYYY-MM-DD)"))
    })
}

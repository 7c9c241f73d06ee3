//! Rushing stat aggregation.
//!
//! Pure functions over the stored plays and roster. Nothing here touches the
//! store; callers fetch the records and pass them in.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Play, PlayType, Player, Team};

/// Carries, yards, touchdowns, fumbles and long for a set of plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatLine {
    /// Number of plays.
    pub carries: u32,
    /// Sum of yards; may be negative.
    pub yards: i64,
    /// Plays that scored.
    pub touchdowns: u32,
    /// Plays with a fumble.
    pub fumbles: u32,
    /// Largest single-play yardage; 0 when there are no plays.
    pub long: i32,
}

impl StatLine {
    /// Total up a set of plays.
    #[must_use]
    pub fn from_plays<'a>(plays: impl IntoIterator<Item = &'a Play>) -> Self {
        let mut line = Self::default();
        let mut long: Option<i32> = None;
        for play in plays {
            line.carries += 1;
            line.yards += i64::from(play.yards);
            line.touchdowns += u32::from(play.touchdown);
            line.fumbles += u32::from(play.fumble);
            long = Some(long.map_or(play.yards, |l| l.max(play.yards)));
        }
        line.long = long.unwrap_or(0);
        line
    }

    /// Yards per carry with one decimal, `"0.0"` when there are no carries.
    #[must_use]
    pub fn average(&self) -> String {
        format_average(self.yards, self.carries)
    }
}

/// Render `yards / carries` to one decimal place.
///
/// Rounds half away from zero on the exact quotient. A result that rounds
/// to zero is shown as `"0.0"` regardless of sign.
#[must_use]
pub fn format_average(yards: i64, carries: u32) -> String {
    if carries == 0 {
        return "0.0".to_string();
    }
    let carries = u64::from(carries);
    let tenths = (yards.unsigned_abs() * 20 + carries) / (carries * 2);
    // A loss that rounds to zero prints 0.0, never -0.0.
    let sign = if yards < 0 && tenths > 0 { "-" } else { "" };
    format!("{sign}{}.{}", tenths / 10, tenths % 10)
}

/// One runner's line in a team's breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerLine {
    /// Jersey number.
    pub jersey: u32,
    /// Roster name, empty when the jersey isn't rostered.
    pub name: String,
    /// The runner's totals.
    #[serde(flatten)]
    pub stats: StatLine,
}

/// A team's totals plus per-runner rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamSummary {
    /// The team summarized.
    pub team: Team,
    /// Team-wide totals.
    pub totals: StatLine,
    /// One row per jersey with at least one carry, ascending by jersey.
    pub players: Vec<PlayerLine>,
}

fn is_team_run(play: &Play, game_id: &str, team: Team) -> bool {
    play.game_id == game_id && play.play_type == PlayType::Run && play.team == team
}

/// Summarize one team's rushing in one game.
#[must_use]
pub fn team_summary(plays: &[Play], roster: &[Player], game_id: &str, team: Team) -> TeamSummary {
    let team_plays: Vec<&Play> = plays
        .iter()
        .filter(|p| is_team_run(p, game_id, team))
        .collect();

    let mut by_runner: BTreeMap<u32, Vec<&Play>> = BTreeMap::new();
    for &play in &team_plays {
        by_runner.entry(play.jersey).or_default().push(play);
    }

    let players = by_runner
        .into_iter()
        .map(|(jersey, runs)| PlayerLine {
            jersey,
            name: roster
                .iter()
                .find(|p| p.team == team && p.jersey == jersey)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            stats: StatLine::from_plays(runs),
        })
        .collect();

    TeamSummary {
        team,
        totals: StatLine::from_plays(team_plays),
        players,
    }
}

/// The team's most recent plays in a game, newest first.
#[must_use]
pub fn recent_plays(plays: &[Play], game_id: &str, team: Team, limit: usize) -> Vec<Play> {
    let mut recent: Vec<Play> = plays
        .iter()
        .filter(|p| is_team_run(p, game_id, team))
        .cloned()
        .collect();
    recent.sort_by(|a, b| b.ts.cmp(&a.ts));
    recent.truncate(limit);
    recent
}

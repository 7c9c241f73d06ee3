//! Plain-text rendering for the terminal.
//!
//! Every function returns lines joined by `\n` without a trailing newline.

use crate::model::{Game, Play, Player, Team};
use crate::stats::{StatLine, TeamSummary};

/// Shown in place of player rows when a team has no carries.
pub const NO_PLAYS: &str = "No plays yet.";

const STAT_COLUMNS: [&str; 6] = ["CAR", "YDS", "AVG", "TD", "FUM", "LONG"];

fn header(label: &str) -> String {
    format!(
        "{label:<20} {:>4} {:>5} {:>5} {:>3} {:>4} {:>5}",
        STAT_COLUMNS[0],
        STAT_COLUMNS[1],
        STAT_COLUMNS[2],
        STAT_COLUMNS[3],
        STAT_COLUMNS[4],
        STAT_COLUMNS[5]
    )
}

fn stat_row(label: &str, line: &StatLine) -> String {
    format!(
        "{label:<20} {:>4} {:>5} {:>5} {:>3} {:>4} {:>5}",
        line.carries,
        line.yards,
        line.average(),
        line.touchdowns,
        line.fumbles,
        line.long
    )
}

/// The runner's label in tables: `#22 Name`, or `#22` when unnamed.
#[must_use]
pub fn runner_label(jersey: u32, name: &str) -> String {
    if name.is_empty() {
        format!("#{jersey}")
    } else {
        format!("#{jersey} {name}")
    }
}

/// One team's totals table.
#[must_use]
pub fn team_totals(summary: &TeamSummary) -> String {
    [
        header(&format!("{} Rushing", summary.team.label())),
        stat_row("Total", &summary.totals),
    ]
    .join("\n")
}

/// One team's per-runner table.
#[must_use]
pub fn player_table(summary: &TeamSummary) -> String {
    let mut lines = vec![format!("{} players", summary.team.label()), header("Player")];
    if summary.players.is_empty() {
        lines.push(format!("  {NO_PLAYS}"));
    }
    for player in &summary.players {
        lines.push(stat_row(
            &runner_label(player.jersey, &player.name),
            &player.stats,
        ));
    }
    lines.join("\n")
}

/// Totals then player tables for each summary.
#[must_use]
pub fn summaries(summaries: &[TeamSummary]) -> String {
    let totals = summaries.iter().map(team_totals);
    let players = summaries.iter().map(player_table);
    totals.chain(players).collect::<Vec<_>>().join("\n\n")
}

/// A single recent-play line, e.g. `Home • Q2 – #22 5y TD`.
#[must_use]
pub fn recent_line(play: &Play) -> String {
    let badge = if play.touchdown {
        " TD"
    } else if play.fumble {
        " FUM"
    } else {
        ""
    };
    format!(
        "{} • Q{} – #{} {}y{badge}",
        play.team.label(),
        play.quarter,
        play.jersey,
        play.yards
    )
}

/// The recent list under a `Recent` heading.
#[must_use]
pub fn recent(plays: &[Play]) -> String {
    let mut lines = vec!["Recent".to_string()];
    if plays.is_empty() {
        lines.push(format!("  {NO_PLAYS}"));
    }
    lines.extend(plays.iter().map(|p| format!("  {}", recent_line(p))));
    lines.join("\n")
}

/// Roster list with the ids `remove` expects.
#[must_use]
pub fn roster(players: &[Player]) -> String {
    if players.is_empty() {
        return "No players rostered.".to_string();
    }
    players
        .iter()
        .map(|p| {
            format!(
                "{} • {:<24} [{}]",
                p.team.label(),
                runner_label(p.jersey, &p.name),
                p.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The runners that can be picked for `team`, on one line.
#[must_use]
pub fn runners(team: Team, players: &[Player]) -> String {
    if players.is_empty() {
        return format!("Runners ({}): none rostered", team.label());
    }
    let labels: Vec<String> = players
        .iter()
        .map(|p| runner_label(p.jersey, &p.name))
        .collect();
    format!("Runners ({}): {}", team.label(), labels.join(" "))
}

/// Game id and metadata.
#[must_use]
pub fn game(game: &Game) -> String {
    let date = game
        .meta
        .date
        .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
    let or_dash = |s: &str| {
        if s.is_empty() {
            "-".to_string()
        } else {
            s.to_string()
        }
    };
    [
        format!("Game:      {}", game.id),
        format!("Started:   {}", game.created_at.format("%Y-%m-%d %H:%M")),
        format!("Opponent:  {}", or_dash(&game.meta.opponent)),
        format!("Date:      {date}"),
        format!("Score:     {}", or_dash(&game.meta.score)),
        format!("Notes:     {}", or_dash(&game.meta.notes)),
    ]
    .join("\n")
}

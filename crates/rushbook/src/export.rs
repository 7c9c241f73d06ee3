//! CSV export of a game's plays.
//!
//! Fields are written verbatim. A comma or newline inside the opponent
//! name splits the row; this is a known limitation of the format.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::model::{Game, Play, PlayType};

/// Column names of the export, in order.
pub const HEADER: [&str; 9] = [
    "gameId", "date", "opponent", "team", "quarter", "player", "yards", "td", "fumble",
];

/// A rendered export, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Suggested file name, e.g. `rushing_20240906.csv`.
    pub filename: String,
    /// The CSV text.
    pub contents: String,
    /// Number of play rows.
    pub rows: usize,
}

/// Render every run play of `game`, both teams, oldest first.
///
/// The date column uses the game's date, falling back to `today`.
///
/// # Errors
///
/// Returns an error if writing the CSV fails.
pub fn export_csv(
    game: &Game,
    plays: &[Play],
    today: NaiveDate,
    prefix: &str,
) -> Result<CsvExport> {
    let date = game.meta.date.unwrap_or(today);
    let date_str = date.format("%Y-%m-%d").to_string();

    let mut rows: Vec<&Play> = plays
        .iter()
        .filter(|p| p.game_id == game.id && p.play_type == PlayType::Run)
        .collect();
    rows.sort_by_key(|p| p.ts);

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for play in &rows {
        let team = play.team.to_string();
        let jersey = play.jersey.to_string();
        let yards = play.yards.to_string();
        writer.write_record([
            game.id.as_str(),
            date_str.as_str(),
            game.meta.opponent.as_str(),
            team.as_str(),
            play.quarter.label(),
            jersey.as_str(),
            yards.as_str(),
            flag(play.touchdown),
            flag(play.fumble),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::internal(format!("flushing CSV buffer: {e}")))?;
    let mut contents =
        String::from_utf8(bytes).map_err(|e| Error::internal(format!("CSV is not UTF-8: {e}")))?;
    if contents.ends_with('\n') {
        contents.pop();
    }

    Ok(CsvExport {
        filename: export_filename(prefix, date),
        contents,
        rows: rows.len(),
    })
}

/// File name for an export: the prefix plus the date without separators.
#[must_use]
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}_{}.csv", date.format("%Y%m%d"))
}

/// Write an export into `dir` under its suggested file name.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn write_export(export: &CsvExport, dir: &Path) -> Result<PathBuf> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let path = dir.join(&export.filename);
    std::fs::write(&path, &export.contents)?;
    Ok(path)
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

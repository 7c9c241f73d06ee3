//! Interactive sideline session.
//!
//! Reads one command per line, applies it to a [`Session`] and a
//! [`RushDraft`], and prints the recent plays and totals after every change.
//! Validation errors are printed and the loop keeps going; anything else
//! ends the session.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cli::{MetaField, TeamArg};
use crate::entry::{RushDraft, RushEntry};
use crate::error::Result;
use crate::export;
use crate::model::{parse_date, parse_jersey, MetaPatch, Team};
use crate::session::Session;
use crate::storage::Store;
use crate::view;

/// Confirmation asked before `reset` deletes anything.
pub const RESET_PROMPT: &str = "Delete ALL data for this app? [y/N]";

#[derive(Debug, Parser)]
#[command(name = "rushbook", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// Switch the active team
    Team {
        #[arg(value_enum)]
        team: TeamArg,
    },
    /// Add or rename a player on the active team
    Add { jersey: String, name: Vec<String> },
    /// Remove a player by roster id, e.g. home:22
    Remove { id: String },
    /// Roster the quick-seed jerseys on the active team
    Seed,
    /// List the roster
    Roster,
    /// List the active team's runners
    Runners,
    /// Pick the runner for the next play
    Runner { jersey: String },
    /// Set the quarter: 1, 2, 3, 4 or OT
    Quarter { quarter: String },
    /// Set the yards field
    Yards {
        #[arg(allow_hyphen_values = true)]
        yards: String,
    },
    /// Add to the yards field, e.g. bump 5 or bump -1
    Bump {
        #[arg(allow_negative_numbers = true)]
        delta: i32,
    },
    /// Toggle touchdown on the next play
    Td,
    /// Toggle fumble on the next play
    Fumble,
    /// Record the play in the form
    Record,
    /// Record a play in one line
    Rush {
        jersey: String,
        #[arg(allow_hyphen_values = true)]
        yards: String,
        #[arg(long)]
        td: bool,
        #[arg(long)]
        fumble: bool,
    },
    /// Remove the last play recorded in this session
    Undo,
    /// Show the active team's latest plays
    Recent,
    /// Show team and player totals
    Totals,
    /// Set game details, e.g. meta opponent Central High
    Meta {
        #[arg(value_enum)]
        field: MetaField,
        value: Vec<String>,
    },
    /// Write the game's CSV export
    Export { file: Option<PathBuf> },
    /// Delete every player and play
    Reset {
        #[arg(skip)]
        confirmed: bool,
    },
    /// End the session
    #[command(alias = "exit")]
    Quit,
}

enum Flow {
    Continue,
    Refresh,
    Quit,
}

/// Line-oriented front end over a [`Session`].
#[derive(Debug)]
pub struct Shell<S: Store> {
    session: Session<S>,
    draft: RushDraft,
    export_dir: PathBuf,
    file_prefix: String,
}

impl<S: Store> Shell<S> {
    /// Wrap a session. Exports land in `export_dir`.
    #[must_use]
    pub fn new(session: Session<S>, export_dir: PathBuf, file_prefix: String) -> Self {
        Self {
            session,
            draft: RushDraft::default(),
            export_dir,
            file_prefix,
        }
    }

    /// The wrapped session.
    #[must_use]
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// The in-progress play.
    #[must_use]
    pub fn draft(&self) -> &RushDraft {
        &self.draft
    }

    /// Run until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input, writing output, or the store
    /// fails. Invalid commands and validation errors are reported to `out`
    /// and do not stop the loop.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        let game_id = self.session.ensure_game()?;
        writeln!(out, "Tracking game {game_id}. Type `help` for commands.")?;
        self.refresh(out)?;

        let mut lines = input.lines();
        loop {
            write!(out, "\n{}> ", self.session.active_team().label())?;
            out.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let mut command = match ShellLine::try_parse_from(line.split_whitespace()) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    writeln!(out, "{}", e.to_string().trim_end())?;
                    continue;
                }
            };
            debug!("Session command: {:?}", command);

            if let ShellCommand::Reset { confirmed } = &mut command {
                write!(out, "{RESET_PROMPT} ")?;
                out.flush()?;
                let answer = lines.next().transpose()?.unwrap_or_default();
                *confirmed = is_yes(&answer);
            }

            match self.execute(command, out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Refresh) => self.refresh(out)?,
                Ok(Flow::Quit) => break,
                Err(e) if e.is_validation() => writeln!(out, "{e}")?,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<Flow> {
        match command {
            ShellCommand::Team { team } => {
                self.switch_team(team.into());
                writeln!(out, "Active team: {}", self.session.active_team().label())?;
                self.print_runners(out)?;
                Ok(Flow::Refresh)
            }
            ShellCommand::Add { jersey, name } => {
                let jersey = parse_jersey(&jersey)?;
                let team = self.session.active_team();
                let player = self.session.add_player(team, jersey, &name.join(" "))?;
                writeln!(out, "Rostered {}", player.id)?;
                self.print_runners(out)?;
                Ok(Flow::Continue)
            }
            ShellCommand::Remove { id } => {
                self.session.remove_player(&id)?;
                writeln!(out, "Removed {id}")?;
                Ok(Flow::Continue)
            }
            ShellCommand::Seed => {
                let count = self.session.seed_roster()?;
                writeln!(
                    out,
                    "Seeded {count} {} players",
                    self.session.active_team().label()
                )?;
                self.print_runners(out)?;
                Ok(Flow::Continue)
            }
            ShellCommand::Roster => {
                writeln!(out, "{}", view::roster(&self.session.roster()?))?;
                Ok(Flow::Continue)
            }
            ShellCommand::Runners => {
                self.print_runners(out)?;
                Ok(Flow::Continue)
            }
            ShellCommand::Runner { jersey } => {
                let jersey = parse_jersey(&jersey)?;
                self.draft.runner = Some(jersey);
                writeln!(out, "Runner: #{jersey}")?;
                Ok(Flow::Continue)
            }
            ShellCommand::Quarter { quarter } => {
                self.draft.quarter = quarter.parse()?;
                writeln!(out, "Quarter: {}", self.draft.quarter)?;
                Ok(Flow::Continue)
            }
            ShellCommand::Yards { yards } => {
                self.draft.yards = yards.trim().to_string();
                writeln!(out, "Yards: {}", self.draft.yards)?;
                Ok(Flow::Continue)
            }
            ShellCommand::Bump { delta } => {
                let yards = self.draft.bump(delta)?;
                writeln!(out, "Yards: {yards}")?;
                Ok(Flow::Continue)
            }
            ShellCommand::Td => {
                self.draft.touchdown = !self.draft.touchdown;
                writeln!(out, "Touchdown: {}", on_off(self.draft.touchdown))?;
                Ok(Flow::Continue)
            }
            ShellCommand::Fumble => {
                self.draft.fumble = !self.draft.fumble;
                writeln!(out, "Fumble: {}", on_off(self.draft.fumble))?;
                Ok(Flow::Continue)
            }
            ShellCommand::Record => {
                let entry = self.draft.entry(self.session.active_team())?;
                self.record(entry, out)?;
                self.draft.clear_play();
                Ok(Flow::Refresh)
            }
            ShellCommand::Rush {
                jersey,
                yards,
                td,
                fumble,
            } => {
                let jersey = parse_jersey(&jersey)?;
                let entry = RushEntry::parse(
                    self.session.active_team(),
                    self.draft.quarter.label(),
                    Some(jersey),
                    &yards,
                    td,
                    fumble,
                )?;
                self.record(entry, out)?;
                Ok(Flow::Refresh)
            }
            ShellCommand::Undo => match self.session.undo_last()? {
                Some(id) => {
                    writeln!(out, "Undid {id}")?;
                    Ok(Flow::Refresh)
                }
                None => {
                    writeln!(out, "Nothing to undo.")?;
                    Ok(Flow::Continue)
                }
            },
            ShellCommand::Recent => {
                writeln!(out, "{}", view::recent(&self.session.recent_plays()?))?;
                Ok(Flow::Continue)
            }
            ShellCommand::Totals => {
                writeln!(out, "{}", view::summaries(&self.session.summaries()?))?;
                Ok(Flow::Continue)
            }
            ShellCommand::Meta { field, value } => {
                let game = self.session.update_meta(meta_patch(field, &value.join(" "))?)?;
                writeln!(out, "{}", view::game(&game))?;
                Ok(Flow::Continue)
            }
            ShellCommand::Export { file } => {
                self.export(file.as_deref(), out)?;
                Ok(Flow::Continue)
            }
            ShellCommand::Reset { confirmed } => self.reset(confirmed, out),
            ShellCommand::Quit => Ok(Flow::Quit),
        }
    }

    fn print_runners<W: Write>(&self, out: &mut W) -> Result<()> {
        let runners = self.session.runners()?;
        writeln!(out, "{}", view::runners(self.session.active_team(), &runners))?;
        Ok(())
    }

    fn switch_team(&mut self, team: Team) {
        self.session.set_active_team(team);
        self.draft.runner = None;
    }

    fn record<W: Write>(&mut self, entry: RushEntry, out: &mut W) -> Result<()> {
        let play = self.session.record_rush(entry)?;
        writeln!(out, "Recorded {}", view::recent_line(&play))?;
        Ok(())
    }

    fn export<W: Write>(&mut self, file: Option<&Path>, out: &mut W) -> Result<()> {
        let csv = self.session.export_csv(&self.file_prefix)?;
        let path = match file {
            Some(path) => {
                std::fs::write(path, &csv.contents)?;
                path.to_path_buf()
            }
            None => export::write_export(&csv, &self.export_dir)?,
        };
        writeln!(out, "Wrote {} plays to {}", csv.rows, path.display())?;
        Ok(())
    }

    fn reset<W: Write>(&mut self, confirmed: bool, out: &mut W) -> Result<Flow> {
        if self.session.reset_all(|| confirmed)? {
            self.draft = RushDraft::default();
            writeln!(out, "All players and plays deleted.")?;
            Ok(Flow::Refresh)
        } else {
            writeln!(out, "Nothing deleted.")?;
            Ok(Flow::Continue)
        }
    }

    fn refresh<W: Write>(&mut self, out: &mut W) -> Result<()> {
        writeln!(out, "{}", view::recent(&self.session.recent_plays()?))?;
        writeln!(out)?;
        writeln!(out, "{}", view::summaries(&self.session.summaries()?))?;
        Ok(())
    }
}

fn meta_patch(field: MetaField, value: &str) -> Result<MetaPatch> {
    let mut patch = MetaPatch::default();
    match field {
        MetaField::Opponent => patch.opponent = Some(value.to_string()),
        MetaField::Date => patch.date = Some(parse_date(value)?),
        MetaField::Score => patch.score = Some(value.to_string()),
        MetaField::Notes => patch.notes = Some(value.to_string()),
    }
    Ok(patch)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::SessionConfig;
    use crate::entry::{BAD_YARDS, MISSING_RUNNER};
    use crate::model::{Play, Player, Quarter};
    use crate::storage::{Collection, MemoryStore};

    fn shell() -> Shell<MemoryStore> {
        let session = Session::new(MemoryStore::new(), SessionConfig::default());
        Shell::new(session, std::env::temp_dir(), "rushing".to_string())
    }

    fn run(shell: &mut Shell<MemoryStore>, script: &str) -> String {
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn plays(shell: &Shell<MemoryStore>) -> Vec<Play> {
        shell.session().store().get_all().unwrap()
    }

    #[test]
    fn test_form_flow_records_and_clears() {
        let mut shell = shell();
        let out = run(
            &mut shell,
            "add 22 Kofi Mensah\nrunner 22\nquarter 3\nbump 5\nbump 5\nbump -1\ntd\nrecord\n",
        );

        let plays = plays(&shell);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].jersey, 22);
        assert_eq!(plays[0].yards, 9);
        assert_eq!(plays[0].quarter, Quarter::Third);
        assert!(plays[0].touchdown);

        assert_eq!(shell.draft().runner, Some(22));
        assert_eq!(shell.draft().quarter, Quarter::Third);
        assert!(shell.draft().yards.is_empty());
        assert!(!shell.draft().touchdown);
        assert!(out.contains("#22 Kofi Mensah"));
    }

    #[test]
    fn test_validation_errors_keep_session_running() {
        let mut shell = shell();
        let out = run(&mut shell, "record\nrunner 7\nyards abc\nrecord\nrush 7 4\n");

        assert!(out.contains(MISSING_RUNNER));
        assert!(out.contains(BAD_YARDS));
        assert_eq!(plays(&shell).len(), 1);
    }

    #[test]
    fn test_bad_jersey_is_reported() {
        let mut shell = shell();
        let out = run(&mut shell, "add x Nobody\n");
        assert!(out.contains("Enter jersey #"));
        assert_eq!(shell.session().store().len(Collection::Players), 0);
    }

    #[test]
    fn test_unknown_command_is_reported() {
        let mut shell = shell();
        let out = run(&mut shell, "punt 40\nrush 3 2\n");
        assert!(out.contains("punt"));
        assert_eq!(plays(&shell).len(), 1);
    }

    #[test]
    fn test_runner_list_follows_active_team() {
        let mut shell = shell();
        let out = run(
            &mut shell,
            "add 22 Kofi\nteam away\nadd 5 Visitor\nrunners\nteam home\nrunners\n",
        );

        let lists: Vec<&str> = out
            .lines()
            .filter_map(|l| l.find("Runners (").map(|at| &l[at..]))
            .collect();
        assert_eq!(
            lists,
            [
                "Runners (Home): #22 Kofi",
                "Runners (Away): none rostered",
                "Runners (Away): #5 Visitor",
                "Runners (Away): #5 Visitor",
                "Runners (Home): #22 Kofi",
                "Runners (Home): #22 Kofi",
            ]
        );
    }

    #[test]
    fn test_seed_lists_runners() {
        let mut shell = shell();
        let out = run(&mut shell, "team away\nseed\n");
        assert!(out.contains("Runners (Away): #1 #2 #3"));
        assert!(out.contains("#24 #32"));
    }

    #[test]
    fn test_team_switch_clears_runner() {
        let mut shell = shell();
        run(&mut shell, "runner 22\nteam away\n");
        assert_eq!(shell.draft().runner, None);
        assert_eq!(shell.session().active_team(), Team::Away);
    }

    #[test]
    fn test_rush_uses_active_team_and_negative_yards() {
        let mut shell = shell();
        run(&mut shell, "team away\nquarter OT\nrush 4 -6 --fumble\n");

        let plays = plays(&shell);
        assert_eq!(plays[0].team, Team::Away);
        assert_eq!(plays[0].yards, -6);
        assert_eq!(plays[0].quarter, Quarter::Overtime);
        assert!(plays[0].fumble);
    }

    #[test]
    fn test_undo_then_nothing_to_undo() {
        let mut shell = shell();
        let out = run(&mut shell, "rush 1 1\nrush 2 2\nundo\nundo\nundo\n");
        assert!(plays(&shell).is_empty());
        assert!(out.contains("Nothing to undo."));
    }

    #[test]
    fn test_reset_declined() {
        let mut shell = shell();
        let out = run(&mut shell, "add 22 Kofi\nrush 22 5\nreset\nn\n");
        assert!(out.contains(RESET_PROMPT));
        assert!(out.contains("Nothing deleted."));
        assert_eq!(plays(&shell).len(), 1);
        let players: Vec<Player> = shell.session().store().get_all().unwrap();
        assert_eq!(players.len(), 1);
    }

    #[test]
    fn test_reset_confirmed() {
        let mut shell = shell();
        run(&mut shell, "add 22 Kofi\nrush 22 5\nreset\ny\nundo\n");
        assert!(plays(&shell).is_empty());
        assert_eq!(shell.session().store().len(Collection::Players), 0);
        assert!(shell.session().state().undo_stack.is_empty());
    }

    #[test]
    fn test_prints_totals_after_record() {
        let mut shell = shell();
        let out = run(&mut shell, "rush 22 5\nrush 22 -2\nrush 22 12\nrush 22 3\n");
        assert!(out.contains("Home Rushing"));
        assert!(out.contains("Away Rushing"));
        assert!(out.contains("4.5"));
        assert!(out.contains("Home • Q1 – #22 12y"));
    }

    #[test]
    fn test_meta_sets_game_details() {
        let mut shell = shell();
        let out = run(
            &mut shell,
            "meta opponent Central High\nmeta date 2024-09-06\nmeta date soon\n",
        );
        assert!(out.contains("Central High"));
        assert!(out.contains("expected YYYY-MM-DD"));
    }

    #[test]
    fn test_export_writes_file() {
        let mut shell = shell();
        let path = std::env::temp_dir().join(format!("rushbook_shell_{}.csv", std::process::id()));
        run(
            &mut shell,
            &format!("rush 22 5\nteam away\nrush 3 8\nexport {}\n", path.display()),
        );

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.contains(",home,"));
        assert!(contents.contains(",away,"));
    }

    #[test]
    fn test_quit_stops_reading() {
        let mut shell = shell();
        run(&mut shell, "quit\nrush 22 5\n");
        assert!(plays(&shell).is_empty());
    }

    #[test]
    fn test_help_lists_commands() {
        let mut shell = shell();
        let out = run(&mut shell, "help\n");
        assert!(out.contains("record"));
        assert!(out.contains("undo"));
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }
}

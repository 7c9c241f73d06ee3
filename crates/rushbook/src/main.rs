//! `rushbook` - CLI for the rushing stats recorder
//!
//! This binary provides the interactive sideline session and one-shot
//! commands over the same local database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use rushbook::cli::{
    Cli, Command, ConfigCommand, ExportCommand, GameCommand, RosterCommand, RushCommand,
    SessionCommand, team_or,
};
use rushbook::model::{parse_date, parse_jersey, MetaPatch};
use rushbook::{export, init_logging, view, Config, RushEntry, Session, Shell, SqliteStore};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    match cli.command {
        Command::Session(cmd) => handle_session(&config, &cmd),
        Command::Roster(cmd) => handle_roster(&config, cmd),
        Command::Rush(cmd) => handle_rush(&config, &cmd),
        Command::Recent(cmd) => {
            let mut session = resume(&config)?;
            session.set_active_team(team_or(cmd.team, config.session.default_team));
            println!("{}", view::recent(&session.recent_plays()?));
            Ok(())
        }
        Command::Totals(cmd) => {
            let mut session = resume(&config)?;
            let summaries = session.summaries()?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                println!("{}", view::summaries(&summaries));
            }
            Ok(())
        }
        Command::Game(cmd) => handle_game(&config, cmd),
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Reset(cmd) => {
            if cmd.yes {
                let mut session = resume(&config)?;
                session.reset_all(|| true)?;
                println!("All players and plays deleted.");
            } else {
                println!("This will delete every player and play.");
                println!("Use --yes to confirm.");
            }
            Ok(())
        }
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    let path = config.database_path();
    SqliteStore::open(&path).with_context(|| format!("opening database {}", path.display()))
}

fn resume(config: &Config) -> Result<Session<SqliteStore>> {
    Ok(Session::resume(open_store(config)?, config.session.clone())?)
}

fn handle_session(config: &Config, cmd: &SessionCommand) -> Result<()> {
    let store = open_store(config)?;
    let mut session = if cmd.resume {
        Session::resume(store, config.session.clone())?
    } else {
        Session::new(store, config.session.clone())
    };
    if let Some(team) = cmd.team {
        session.set_active_team(team.into());
    }

    let mut shell = Shell::new(session, config.export_dir(), config.export.file_prefix.clone());
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell.run(stdin.lock(), &mut stdout)?;
    writeln!(stdout)?;
    Ok(())
}

fn handle_roster(config: &Config, cmd: RosterCommand) -> Result<()> {
    let mut session = resume(config)?;
    let default_team = config.session.default_team;
    match cmd {
        RosterCommand::Add { jersey, name, team } => {
            let team = team_or(team, default_team);
            let player = session.add_player(team, parse_jersey(&jersey)?, &name.join(" "))?;
            println!("Rostered {}", player.id);
        }
        RosterCommand::Remove { id } => {
            session.remove_player(&id)?;
            println!("Removed {id}");
        }
        RosterCommand::List => {
            println!("{}", view::roster(&session.roster()?));
        }
        RosterCommand::Seed { team } => {
            let team = team_or(team, default_team);
            session.set_active_team(team);
            let count = session.seed_roster()?;
            println!("Seeded {count} {} players", team.label());
        }
    }
    Ok(())
}

fn handle_rush(config: &Config, cmd: &RushCommand) -> Result<()> {
    let entry = RushEntry::parse(
        team_or(cmd.team, config.session.default_team),
        &cmd.quarter,
        Some(parse_jersey(&cmd.jersey)?),
        &cmd.yards,
        cmd.td,
        cmd.fumble,
    )?;
    let mut session = resume(config)?;
    let play = session.record_rush(entry)?;
    println!("Recorded {}", view::recent_line(&play));
    Ok(())
}

fn handle_game(config: &Config, cmd: GameCommand) -> Result<()> {
    let mut session = resume(config)?;
    match cmd {
        GameCommand::Show { json } => {
            let game = session.current_game()?;
            let stats = session.store().stats()?;
            if json {
                let status = serde_json::json!({
                    "game": game,
                    "database_path": session.store().path(),
                    "storage": stats,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{}", view::game(&game));
                println!();
                println!("Database:  {}", session.store().path().display());
                println!("Schema:    v{}", stats.schema_version);
                println!(
                    "Records:   {} players, {} games, {} plays",
                    stats.players, stats.games, stats.plays
                );
            }
        }
        GameCommand::Set {
            opponent,
            date,
            score,
            notes,
        } => {
            let patch = MetaPatch {
                opponent,
                date: date.as_deref().map(parse_date).transpose()?,
                score,
                notes,
            };
            if patch.is_empty() {
                println!("Nothing to change. Pass --opponent, --date, --score or --notes.");
                return Ok(());
            }
            let game = session.update_meta(patch)?;
            println!("{}", view::game(&game));
        }
    }
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> Result<()> {
    let mut session = resume(config)?;
    let csv = session.export_csv(&config.export.file_prefix)?;

    if cmd.stdout {
        println!("{}", csv.contents);
        return Ok(());
    }

    let path = match &cmd.output {
        Some(path) => {
            std::fs::write(path, &csv.contents)
                .with_context(|| format!("writing {}", path.display()))?;
            path.clone()
        }
        None => export::write_export(&csv, &config.export_dir())?,
    };
    println!("Wrote {} plays to {}", csv.rows, path.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Session]");
                println!("  Default team:       {}", config.session.default_team);
                println!("  Recent limit:       {}", config.session.recent_limit);
                println!(
                    "  Seed jerseys:       {}",
                    config
                        .session
                        .seed_jerseys
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                println!();
                println!("[Export]");
                println!("  Directory:          {}", config.export_dir().display());
                println!("  File prefix:        {}", config.export.file_prefix);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

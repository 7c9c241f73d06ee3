//! Game session controller.
//!
//! A [`Session`] owns the store and the per-session [`AppState`]: which game
//! is being tracked, which team is selected, and the undo stack of plays
//! recorded since the session started. The undo stack is never persisted.

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::entry::RushEntry;
use crate::error::{Error, Result};
use crate::export::{self, CsvExport};
use crate::model::{Game, MetaPatch, Play, PlayType, Player, Team};
use crate::stats::{self, TeamSummary};
use crate::storage::Store;

/// Mutable state scoped to one running session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// The game being tracked, once one exists.
    pub game_id: Option<String>,
    /// Team selected for roster entry and recent plays.
    pub active_team: Team,
    /// Ids of plays recorded in this session, oldest first.
    pub undo_stack: Vec<String>,
}

/// Source of the current time. Swappable so tests get stable ids.
pub type Clock = fn() -> DateTime<Utc>;

/// Controller for one sideline session.
#[derive(Debug)]
pub struct Session<S: Store> {
    store: S,
    state: AppState,
    settings: SessionConfig,
    clock: Clock,
}

impl<S: Store> Session<S> {
    /// Start a session with no game selected. A game is created on the
    /// first action that needs one.
    #[must_use]
    pub fn new(store: S, settings: SessionConfig) -> Self {
        let state = AppState {
            active_team: settings.default_team,
            ..AppState::default()
        };
        Self {
            store,
            state,
            settings,
            clock: Utc::now,
        }
    }

    /// Start a session on the most recently created game, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the games collection cannot be read.
    pub fn resume(store: S, settings: SessionConfig) -> Result<Self> {
        let mut session = Self::new(store, settings);
        let latest = session
            .store
            .get_all::<Game>()?
            .into_iter()
            .max_by_key(|g| g.created_at);
        if let Some(game) = latest {
            debug!("Resuming game {}", game.id);
            session.state.game_id = Some(game.id);
        }
        Ok(session)
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The selected team.
    #[must_use]
    pub fn active_team(&self) -> Team {
        self.state.active_team
    }

    /// Select a team.
    pub fn set_active_team(&mut self, team: Team) {
        self.state.active_team = team;
    }

    /// Return the current game id, creating and storing a game if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the new game cannot be stored.
    pub fn ensure_game(&mut self) -> Result<String> {
        if let Some(id) = &self.state.game_id {
            return Ok(id.clone());
        }
        let game = Game::new((self.clock)());
        self.store.put(&game)?;
        info!("Started game {}", game.id);
        self.state.game_id = Some(game.id.clone());
        Ok(game.id)
    }

    /// The current game record, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the game record is missing.
    pub fn current_game(&mut self) -> Result<Game> {
        let id = self.ensure_game()?;
        self.store
            .get::<Game>(&id)?
            .ok_or_else(|| Error::internal(format!("game {id} is missing from the store")))
    }

    /// Update opponent, date, score or notes on the current game.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn update_meta(&mut self, patch: MetaPatch) -> Result<Game> {
        let mut game = self.current_game()?;
        game.meta.apply(patch);
        self.store.put(&game)?;
        Ok(game)
    }

    // === Roster ===

    /// Add or replace a player on `team`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn add_player(&mut self, team: Team, jersey: u32, name: &str) -> Result<Player> {
        let player = Player::new(team, jersey, name);
        self.store.put(&player)?;
        debug!("Rostered {}", player.id);
        Ok(player)
    }

    /// Remove a player by roster id. Missing ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn remove_player(&mut self, id: &str) -> Result<()> {
        self.store.delete::<Player>(id)
    }

    /// Roster the configured seed jerseys, unnamed, on the active team.
    ///
    /// Returns how many players were written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn seed_roster(&mut self) -> Result<usize> {
        let team = self.state.active_team;
        for &jersey in &self.settings.seed_jerseys {
            self.store.put(&Player::new(team, jersey, ""))?;
        }
        info!(
            "Seeded {} {} players",
            self.settings.seed_jerseys.len(),
            team
        );
        Ok(self.settings.seed_jerseys.len())
    }

    /// Every rostered player, by jersey then team.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn roster(&self) -> Result<Vec<Player>> {
        let mut players: Vec<Player> = self.store.get_all()?;
        players.sort_by_key(|p| (p.jersey, p.team));
        Ok(players)
    }

    /// Players on the active team, by jersey.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn runners(&self) -> Result<Vec<Player>> {
        let team = self.state.active_team;
        Ok(self
            .roster()?
            .into_iter()
            .filter(|p| p.team == team)
            .collect())
    }

    // === Plays ===

    /// Store a rush and make it the next thing `undo_last` removes.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn record_rush(&mut self, entry: RushEntry) -> Result<Play> {
        let game_id = self.ensure_game()?;
        let now = (self.clock)();
        let play = Play {
            id: Play::new_id(now),
            game_id,
            team: entry.team,
            play_type: PlayType::Run,
            quarter: entry.quarter,
            jersey: entry.jersey,
            yards: entry.yards,
            touchdown: entry.touchdown,
            fumble: entry.fumble,
            ts: now,
        };
        self.store.put(&play)?;
        self.state.undo_stack.push(play.id.clone());
        debug!(
            "Recorded {} #{} {}y in Q{}",
            play.team, play.jersey, play.yards, play.quarter
        );
        Ok(play)
    }

    /// Delete the most recently recorded play of this session.
    ///
    /// Returns the removed play id, or `None` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn undo_last(&mut self) -> Result<Option<String>> {
        let Some(id) = self.state.undo_stack.pop() else {
            return Ok(None);
        };
        self.store.delete::<Play>(&id)?;
        debug!("Undid play {}", id);
        Ok(Some(id))
    }

    fn all_plays(&self) -> Result<Vec<Play>> {
        self.store.get_all()
    }

    /// The active team's latest plays in the current game.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn recent_plays(&mut self) -> Result<Vec<Play>> {
        let game_id = self.ensure_game()?;
        Ok(stats::recent_plays(
            &self.all_plays()?,
            &game_id,
            self.state.active_team,
            self.settings.recent_limit,
        ))
    }

    /// Rushing summary for `team` in the current game.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn team_summary(&mut self, team: Team) -> Result<TeamSummary> {
        let game_id = self.ensure_game()?;
        let plays = self.all_plays()?;
        let roster: Vec<Player> = self.store.get_all()?;
        Ok(stats::team_summary(&plays, &roster, &game_id, team))
    }

    /// Summaries for both teams, home first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn summaries(&mut self) -> Result<Vec<TeamSummary>> {
        Team::ALL
            .iter()
            .map(|&team| self.team_summary(team))
            .collect()
    }

    /// Render the current game's plays, both teams, as CSV.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or rendering fails.
    pub fn export_csv(&mut self, prefix: &str) -> Result<CsvExport> {
        let game = self.current_game()?;
        let today: NaiveDate = (self.clock)().with_timezone(&Local).date_naive();
        let export = export::export_csv(&game, &self.all_plays()?, today, prefix)?;
        info!("Exported {} plays from {}", export.rows, game.id);
        Ok(export)
    }

    /// Delete every player and play after `confirm` agrees.
    ///
    /// Returns whether anything was deleted. Declining changes nothing. The
    /// current game stays selected; the undo stack is emptied.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn reset_all(&mut self, confirm: impl FnOnce() -> bool) -> Result<bool> {
        if !confirm() {
            debug!("Reset declined");
            return Ok(false);
        }
        self.store.clear::<Play>()?;
        self.store.clear::<Player>()?;
        self.state.undo_stack.clear();
        info!("Cleared all players and plays");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    use crate::model::Quarter;
    use crate::storage::{Collection, MemoryStore};

    static TICK: AtomicI64 = AtomicI64::new(0);

    /// Strictly increasing timestamps, one second apart.
    fn ticking_clock() -> DateTime<Utc> {
        let n = TICK.fetch_add(1, Ordering::SeqCst);
        DateTime::from_timestamp(1_725_650_000 + n, 0).unwrap_or_default()
    }

    fn session() -> Session<MemoryStore> {
        crate::logging::init_test_logging();
        Session::new(MemoryStore::new(), SessionConfig::default()).with_clock(ticking_clock)
    }

    fn rush(team: Team, jersey: u32, yards: i32) -> RushEntry {
        RushEntry {
            team,
            quarter: Quarter::First,
            jersey,
            yards,
            touchdown: false,
            fumble: false,
        }
    }

    fn stored_play_ids(session: &Session<MemoryStore>) -> Vec<String> {
        let plays: Vec<Play> = session.store().get_all().unwrap();
        plays.into_iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_game_created_lazily_once() {
        let mut session = session();
        assert!(session.state().game_id.is_none());
        assert_eq!(session.store().len(Collection::Games), 0);

        let first = session.ensure_game().unwrap();
        let second = session.ensure_game().unwrap();

        assert_eq!(first, second);
        assert_eq!(session.store().len(Collection::Games), 1);
    }

    #[test]
    fn test_record_persists_and_tracks_undo() {
        let mut session = session();
        let play = session.record_rush(rush(Team::Away, 22, -3)).unwrap();

        assert_eq!(play.team, Team::Away);
        assert_eq!(play.yards, -3);
        assert_eq!(session.state().undo_stack, vec![play.id.clone()]);
        assert_eq!(stored_play_ids(&session), vec![play.id]);
    }

    #[test]
    fn test_undo_removes_only_the_latest_play() {
        let mut session = session();
        let p1 = session.record_rush(rush(Team::Home, 1, 4)).unwrap();
        let p2 = session.record_rush(rush(Team::Home, 2, 5)).unwrap();
        let p3 = session.record_rush(rush(Team::Away, 3, 6)).unwrap();

        assert_eq!(session.undo_last().unwrap(), Some(p3.id.clone()));
        let ids = stored_play_ids(&session);
        assert!(ids.contains(&p1.id));
        assert!(ids.contains(&p2.id));
        assert!(!ids.contains(&p3.id));

        assert_eq!(session.undo_last().unwrap(), Some(p2.id.clone()));
        assert_eq!(stored_play_ids(&session), vec![p1.id]);
    }

    #[test]
    fn test_undo_on_empty_stack_is_noop() {
        let mut session = session();
        assert_eq!(session.undo_last().unwrap(), None);
    }

    #[test]
    fn test_undo_is_session_scoped() {
        let store = MemoryStore::new();
        let mut first = Session::new(store, SessionConfig::default()).with_clock(ticking_clock);
        first.record_rush(rush(Team::Home, 7, 3)).unwrap();
        let store = first.store;

        let mut second = Session::resume(store, SessionConfig::default()).unwrap();
        assert_eq!(second.undo_last().unwrap(), None);
        assert_eq!(second.store().len(Collection::Plays), 1);
    }

    #[test]
    fn test_resume_picks_latest_game() {
        let store = MemoryStore::new();
        let older = Game::new(DateTime::from_timestamp(1_000, 0).unwrap());
        let newer = Game::new(DateTime::from_timestamp(2_000, 0).unwrap());
        store.put(&newer).unwrap();
        store.put(&older).unwrap();

        let session = Session::resume(store, SessionConfig::default()).unwrap();
        assert_eq!(session.state().game_id, Some(newer.id));
    }

    #[test]
    fn test_upsert_player_keeps_one_entry() {
        let mut session = session();
        session.add_player(Team::Home, 22, "First Name").unwrap();
        session.add_player(Team::Home, 22, "Second Name").unwrap();
        session.add_player(Team::Away, 22, "Visitor").unwrap();

        let home: Vec<Player> = session
            .roster()
            .unwrap()
            .into_iter()
            .filter(|p| p.team == Team::Home && p.jersey == 22)
            .collect();
        assert_eq!(home.len(), 1);
        assert_eq!(home[0].name, "Second Name");
        assert_eq!(session.roster().unwrap().len(), 2);
    }

    #[test]
    fn test_remove_player_missing_is_ok() {
        let mut session = session();
        session.add_player(Team::Home, 5, "").unwrap();
        session.remove_player("home:5").unwrap();
        session.remove_player("home:5").unwrap();
        assert!(session.roster().unwrap().is_empty());
    }

    #[test]
    fn test_seed_roster_for_active_team() {
        let mut session = session();
        session.add_player(Team::Away, 22, "Named").unwrap();
        session.set_active_team(Team::Away);

        let seeded = session.seed_roster().unwrap();
        let runners = session.runners().unwrap();

        assert_eq!(seeded, 17);
        assert_eq!(runners.len(), 17);
        assert!(runners.iter().all(|p| p.name.is_empty()));
        assert!(runners.windows(2).all(|w| w[0].jersey < w[1].jersey));

        session.set_active_team(Team::Home);
        assert!(session.runners().unwrap().is_empty());
    }

    #[test]
    fn test_summary_resolves_names() {
        let mut session = session();
        session.add_player(Team::Home, 22, "Kofi").unwrap();
        session.record_rush(rush(Team::Home, 22, 5)).unwrap();
        session.record_rush(rush(Team::Home, 22, -2)).unwrap();
        session.record_rush(rush(Team::Home, 22, 12)).unwrap();
        session.record_rush(rush(Team::Home, 22, 3)).unwrap();

        let summary = session.team_summary(Team::Home).unwrap();
        assert_eq!(summary.totals.yards, 18);
        assert_eq!(summary.totals.average(), "4.5");
        assert_eq!(summary.players[0].name, "Kofi");

        let away = session.team_summary(Team::Away).unwrap();
        assert_eq!(away.totals.carries, 0);
    }

    #[test]
    fn test_recent_follows_active_team() {
        let mut session = session();
        session.record_rush(rush(Team::Home, 1, 1)).unwrap();
        let away = session.record_rush(rush(Team::Away, 2, 2)).unwrap();

        session.set_active_team(Team::Away);
        let recent = session.recent_plays().unwrap();
        assert_eq!(recent, vec![away]);
    }

    #[test]
    fn test_export_ignores_active_team_and_other_games() {
        let store = MemoryStore::new();
        let old_game = Game::new(DateTime::from_timestamp(1_000, 0).unwrap());
        store.put(&old_game).unwrap();
        store
            .put(&Play {
                id: "p_old".to_string(),
                game_id: old_game.id.clone(),
                team: Team::Home,
                play_type: PlayType::Run,
                quarter: Quarter::First,
                jersey: 9,
                yards: 99,
                touchdown: false,
                fumble: false,
                ts: DateTime::from_timestamp(1_001, 0).unwrap(),
            })
            .unwrap();

        let mut session =
            Session::new(store, SessionConfig::default()).with_clock(ticking_clock);
        session.record_rush(rush(Team::Home, 22, 5)).unwrap();
        session.record_rush(rush(Team::Away, 3, 8)).unwrap();
        session.set_active_team(Team::Away);

        let export = session.export_csv("rushing").unwrap();

        assert_eq!(export.rows, 2);
        assert!(export.contents.contains(",home,"));
        assert!(export.contents.contains(",away,"));
        assert!(!export.contents.contains("p_old"));
        assert!(!export.contents.contains(&old_game.id));
    }

    #[test]
    fn test_update_meta_changes_export() {
        let mut session = session();
        session
            .update_meta(MetaPatch {
                opponent: Some("Central".to_string()),
                date: NaiveDate::from_ymd_opt(2024, 9, 6),
                ..MetaPatch::default()
            })
            .unwrap();

        let export = session.export_csv("rushing").unwrap();
        assert_eq!(export.filename, "rushing_20240906.csv");
        assert_eq!(session.current_game().unwrap().meta.opponent, "Central");
    }

    #[test]
    fn test_reset_declined_changes_nothing() {
        let mut session = session();
        session.add_player(Team::Home, 22, "Kofi").unwrap();
        session.record_rush(rush(Team::Home, 22, 5)).unwrap();

        assert!(!session.reset_all(|| false).unwrap());

        assert_eq!(session.store().len(Collection::Players), 1);
        assert_eq!(session.store().len(Collection::Plays), 1);
        assert_eq!(session.state().undo_stack.len(), 1);
    }

    #[test]
    fn test_reset_confirmed_clears_players_plays_and_undo() {
        let mut session = session();
        session.add_player(Team::Home, 22, "Kofi").unwrap();
        session.record_rush(rush(Team::Home, 22, 5)).unwrap();
        session.record_rush(rush(Team::Away, 4, 1)).unwrap();
        let game_id = session.state().game_id.clone();

        assert!(session.reset_all(|| true).unwrap());

        assert_eq!(session.store().len(Collection::Players), 0);
        assert_eq!(session.store().len(Collection::Plays), 0);
        assert!(session.state().undo_stack.is_empty());
        assert_eq!(session.undo_last().unwrap(), None);
        assert_eq!(session.state().game_id, game_id);
        assert_eq!(session.store().len(Collection::Games), 1);
    }

    #[test]
    fn test_new_session_uses_default_team() {
        let settings = SessionConfig {
            default_team: Team::Away,
            ..SessionConfig::default()
        };
        let session = Session::new(MemoryStore::new(), settings);
        assert_eq!(session.active_team(), Team::Away);
    }
}

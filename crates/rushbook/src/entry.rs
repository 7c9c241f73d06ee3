//! Rush entry form.
//!
//! [`RushDraft`] holds what the user has typed so far; [`RushDraft::entry`]
//! turns it into a validated [`RushEntry`] the session can record.

use crate::error::{Error, Result};
use crate::model::{Quarter, Team};

/// Message shown when recording without a runner.
pub const MISSING_RUNNER: &str = "Pick a runner";

/// Message shown when the yards field is empty or not an integer.
pub const BAD_YARDS: &str = "Enter yards (+/-)";

/// A validated rush, ready to be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RushEntry {
    /// Team that ran the play.
    pub team: Team,
    /// Quarter.
    pub quarter: Quarter,
    /// Runner's jersey number.
    pub jersey: u32,
    /// Yards gained, negative for a loss.
    pub yards: i32,
    /// Run scored.
    pub touchdown: bool,
    /// Runner fumbled.
    pub fumble: bool,
}

impl RushEntry {
    /// Validate loosely typed input into an entry.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no runner is given, the yards do not
    /// parse as an integer, or the quarter label is unknown.
    pub fn parse(
        team: Team,
        quarter: &str,
        jersey: Option<u32>,
        yards: &str,
        touchdown: bool,
        fumble: bool,
    ) -> Result<Self> {
        let jersey = jersey.ok_or_else(|| Error::validation(MISSING_RUNNER))?;
        let yards = parse_yards(yards)?;
        let quarter = quarter.parse()?;
        Ok(Self {
            team,
            quarter,
            jersey,
            yards,
            touchdown,
            fumble,
        })
    }
}

fn parse_yards(input: &str) -> Result<i32> {
    input
        .trim()
        .parse()
        .map_err(|_| Error::validation(BAD_YARDS))
}

/// In-progress form state for the next rush.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RushDraft {
    /// Selected runner.
    pub runner: Option<u32>,
    /// Yards field as typed.
    pub yards: String,
    /// Touchdown checkbox.
    pub touchdown: bool,
    /// Fumble checkbox.
    pub fumble: bool,
    /// Selected quarter.
    pub quarter: Quarter,
}

impl RushDraft {
    /// Add a quick increment to the yards field. An empty field counts as 0.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the field holds something other than
    /// an integer, or the result overflows.
    pub fn bump(&mut self, delta: i32) -> Result<i32> {
        let current = if self.yards.trim().is_empty() {
            0
        } else {
            parse_yards(&self.yards)?
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| Error::validation(BAD_YARDS))?;
        self.yards = next.to_string();
        Ok(next)
    }

    /// Validate the draft for `team`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no runner is picked or the yards field
    /// is not an integer.
    pub fn entry(&self, team: Team) -> Result<RushEntry> {
        RushEntry::parse(
            team,
            self.quarter.label(),
            self.runner,
            &self.yards,
            self.touchdown,
            self.fumble,
        )
    }

    /// Reset the per-play fields after a successful record.
    ///
    /// Runner and quarter carry over to the next play.
    pub fn clear_play(&mut self) {
        self.yards.clear();
        self.touchdown = false;
        self.fumble = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_entry() {
        let entry = RushEntry::parse(Team::Away, "OT", Some(22), " -3 ", false, true).unwrap();
        assert_eq!(entry.team, Team::Away);
        assert_eq!(entry.quarter, Quarter::Overtime);
        assert_eq!(entry.jersey, 22);
        assert_eq!(entry.yards, -3);
        assert!(entry.fumble);
    }

    #[test]
    fn test_parse_without_runner() {
        let err = RushEntry::parse(Team::Home, "1", None, "4", false, false).unwrap_err();
        assert_eq!(err.to_string(), MISSING_RUNNER);
    }

    #[test]
    fn test_parse_bad_yards() {
        for yards in ["", "four", "4.5", "1e2"] {
            let err = RushEntry::parse(Team::Home, "1", Some(7), yards, false, false).unwrap_err();
            assert_eq!(err.to_string(), BAD_YARDS, "yards {yards:?}");
        }
    }

    #[test]
    fn test_runner_checked_before_yards() {
        let err = RushEntry::parse(Team::Home, "1", None, "x", false, false).unwrap_err();
        assert_eq!(err.to_string(), MISSING_RUNNER);
    }

    #[test]
    fn test_bump_from_empty() {
        let mut draft = RushDraft::default();
        assert_eq!(draft.bump(5).unwrap(), 5);
        assert_eq!(draft.bump(-10).unwrap(), -5);
        assert_eq!(draft.yards, "-5");
    }

    #[test]
    fn test_bump_non_numeric_field() {
        let mut draft = RushDraft {
            yards: "abc".to_string(),
            ..RushDraft::default()
        };
        assert!(draft.bump(1).unwrap_err().is_validation());
        assert_eq!(draft.yards, "abc");
    }

    #[test]
    fn test_draft_entry_and_clear() {
        let mut draft = RushDraft {
            runner: Some(32),
            yards: "12".to_string(),
            touchdown: true,
            fumble: false,
            quarter: Quarter::Third,
        };

        let entry = draft.entry(Team::Home).unwrap();
        assert_eq!(entry.yards, 12);
        assert_eq!(entry.quarter, Quarter::Third);
        assert!(entry.touchdown);

        draft.clear_play();
        assert_eq!(draft.runner, Some(32));
        assert_eq!(draft.quarter, Quarter::Third);
        assert!(draft.yards.is_empty());
        assert!(!draft.touchdown);
    }
}

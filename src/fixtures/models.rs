//! Canonical match shapes shared by every provider adapter.
//!
//! Adapters own their provider-specific response schemas and convert them
//! into these types at the boundary; everything downstream works on
//! `NormalizedMatch` only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fixture in canonical form, rebuilt fresh on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMatch {
    /// Provider fixture identifier, stringified.
    pub id: String,
    pub league: League,
    pub kickoff_utc: DateTime<Utc>,
    pub status: MatchStatus,
    pub home: TeamSide,
    pub away: TeamSide,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub code: String,
    pub name: String,
}

/// One side of a fixture. `score` is present on both sides or on neither;
/// use [`split_score`] when building sides so the pairing can't drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSide {
    pub id: Option<String>,
    pub name: String,
    pub crest_url: Option<String>,
    pub score: Option<u32>,
}

/// Match status, normalized across providers. Codes this crate does not
/// recognize pass through as `Other` rather than failing the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Timed,
    InPlay,
    Paused,
    Finished,
    Suspended,
    Postponed,
    Cancelled,
    #[serde(untagged)]
    Other(String),
}

impl MatchStatus {
    /// Whether any score can exist yet. Unrecognized statuses report no
    /// score.
    pub fn has_started(&self) -> bool {
        matches!(
            self,
            Self::InPlay | Self::Paused | Self::Finished | Self::Suspended
        )
    }
}

/// One timeline entry for a fixture, kept in the order the provider
/// reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    pub minute_elapsed: u32,
    pub minute_extra: Option<u32>,
    pub kind: String,
    pub detail: String,
    pub player: String,
    pub team: String,
}

/// A team reference outside the context of a single fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    pub id: Option<String>,
    pub name: String,
    pub crest_url: Option<String>,
}

/// One row of a league table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub position: u32,
    pub team: TeamRef,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goal_difference: i32,
    pub points: u32,
}

/// Pick the score to report as current from half-time and full-time
/// figures.
///
/// Once a match is FINISHED, or either full-time figure is nonzero, the
/// full-time score is current; otherwise the half-time score stands. An
/// in-play 0-0 is therefore indistinguishable from a match with no score
/// recorded yet, and a match that finished 0-0 reports the half-time
/// figures unless its status says FINISHED. Matches that have not started
/// report no score at all.
pub fn current_score(
    status: &MatchStatus,
    half_time: Option<(u32, u32)>,
    full_time: Option<(u32, u32)>,
) -> Option<(u32, u32)> {
    if !status.has_started() {
        return None;
    }
    let (ft_home, ft_away) = full_time.unwrap_or((0, 0));
    let (ht_home, ht_away) = half_time.unwrap_or((0, 0));
    if *status == MatchStatus::Finished || ft_home > 0 || ft_away > 0 {
        Some((ft_home, ft_away))
    } else {
        Some((ht_home, ht_away))
    }
}

/// Split a current score into per-side values: both present or both absent.
pub fn split_score(current: Option<(u32, u32)>) -> (Option<u32>, Option<u32>) {
    match current {
        Some((home, away)) => (Some(home), Some(away)),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_match_reports_full_time_regardless_of_half_time() {
        let score = current_score(&MatchStatus::Finished, Some((0, 0)), Some((2, 1)));
        assert_eq!(score, Some((2, 1)));
    }

    #[test]
    fn finished_goalless_match_reports_full_time_zeros() {
        let score = current_score(&MatchStatus::Finished, Some((0, 0)), Some((0, 0)));
        assert_eq!(score, Some((0, 0)));
    }

    #[test]
    fn in_play_with_zero_full_time_reports_half_time() {
        let score = current_score(&MatchStatus::InPlay, Some((1, 0)), Some((0, 0)));
        assert_eq!(score, Some((1, 0)));
    }

    #[test]
    fn in_play_with_nonzero_full_time_reports_full_time() {
        // Providers fill the full-time figures as the match runs.
        let score = current_score(&MatchStatus::InPlay, Some((1, 0)), Some((2, 0)));
        assert_eq!(score, Some((2, 0)));
    }

    #[test]
    fn unstarted_match_has_no_score() {
        assert_eq!(current_score(&MatchStatus::Scheduled, None, None), None);
        assert_eq!(
            current_score(&MatchStatus::Timed, Some((0, 0)), Some((0, 0))),
            None
        );
        assert_eq!(current_score(&MatchStatus::Postponed, None, Some((1, 0))), None);
    }

    #[test]
    fn unrecognized_status_has_no_score() {
        let status = MatchStatus::Other("AWARDED".to_string());
        assert_eq!(current_score(&status, None, Some((3, 0))), None);
    }

    #[test]
    fn split_score_keeps_sides_paired() {
        assert_eq!(split_score(Some((2, 1))), (Some(2), Some(1)));
        assert_eq!(split_score(None), (None, None));
    }

    #[test]
    fn status_serializes_as_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&MatchStatus::InPlay).unwrap(),
            "\"IN_PLAY\""
        );
        let parsed: MatchStatus = serde_json::from_str("\"FINISHED\"").unwrap();
        assert_eq!(parsed, MatchStatus::Finished);
        let passthrough: MatchStatus = serde_json::from_str("\"AWARDED\"").unwrap();
        assert_eq!(passthrough, MatchStatus::Other("AWARDED".to_string()));
    }
}

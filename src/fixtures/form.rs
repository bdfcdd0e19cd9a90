//! Win/loss/draw sequences and head-to-head tallies over normalized
//! fixtures.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::fixtures::models::{NormalizedMatch, TeamSide};

/// One match outcome relative to a specific team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormResult {
    Win,
    Loss,
    Draw,
}

/// Aggregate head-to-head counts, from team A's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct H2hTally {
    pub wins_a: u32,
    pub wins_b: u32,
    pub draws: u32,
}

/// One outcome per input match, in input order (providers return newest
/// first). The team must be identifiable on one side of every match.
pub fn recent_form(
    matches: &[NormalizedMatch],
    team_id: &str,
) -> Result<Vec<FormResult>, AppError> {
    matches.iter().map(|m| outcome_for(m, team_id)).collect()
}

/// Fold a match set into win/loss/draw counts between two teams. Symmetric:
/// swapping the arguments swaps `wins_a`/`wins_b` and leaves `draws` alone.
pub fn head_to_head_tally(
    matches: &[NormalizedMatch],
    team_a: &str,
    team_b: &str,
) -> Result<H2hTally, AppError> {
    let mut tally = H2hTally {
        wins_a: 0,
        wins_b: 0,
        draws: 0,
    };
    for m in matches {
        // Both teams must be identifiable before the meeting is scored.
        if !(side_matches(&m.home, team_b) || side_matches(&m.away, team_b)) {
            return Err(AppError::InvalidTeamReference {
                team: team_b.to_string(),
                match_id: m.id.clone(),
            });
        }
        match outcome_for(m, team_a)? {
            FormResult::Win => tally.wins_a += 1,
            FormResult::Loss => tally.wins_b += 1,
            FormResult::Draw => tally.draws += 1,
        }
    }
    Ok(tally)
}

/// Outcome of one match from `team_id`'s point of view. A match with no
/// recorded score counts as a goalless draw.
fn outcome_for(m: &NormalizedMatch, team_id: &str) -> Result<FormResult, AppError> {
    let (own, other) = if side_matches(&m.home, team_id) {
        (&m.home, &m.away)
    } else if side_matches(&m.away, team_id) {
        (&m.away, &m.home)
    } else {
        return Err(AppError::InvalidTeamReference {
            team: team_id.to_string(),
            match_id: m.id.clone(),
        });
    };

    let own_goals = own.score.unwrap_or(0);
    let other_goals = other.score.unwrap_or(0);
    Ok(match own_goals.cmp(&other_goals) {
        Ordering::Greater => FormResult::Win,
        Ordering::Less => FormResult::Loss,
        Ordering::Equal => FormResult::Draw,
    })
}

fn side_matches(side: &TeamSide, team_id: &str) -> bool {
    side.id.as_deref() == Some(team_id)
}

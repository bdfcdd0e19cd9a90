//! football-data.org v4 adapter.
//!
//! Auth is a single `X-Auth-Token` header. Scores arrive as half-time and
//! full-time pairs; the current score is derived with
//! [`current_score`](crate::fixtures::models::current_score).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::fixtures::models::{
    current_score, split_score, League, MatchEvent, MatchStatus, NormalizedMatch, StandingRow,
    TeamRef, TeamSide,
};
use crate::provider::FixtureProvider;

const DEFAULT_BASE_URL: &str = "https://api.football-data.org/v4";

pub struct FootballDataProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FootballDataProvider {
    pub fn new(config: &ProviderConfig, api_key: String) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    #[instrument(skip(self, query), fields(path = %path))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .header("X-Auth-Token", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::not_found(url));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!("{url} returned {status}: {body}")));
        }

        resp.json::<T>()
            .await
            .map_err(|e| AppError::malformed(format!("{url}: {e}")))
    }
}

#[async_trait]
impl FixtureProvider for FootballDataProvider {
    async fn fixtures_window(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        competitions: &[String],
    ) -> Result<Vec<NormalizedMatch>, AppError> {
        let mut query = vec![
            ("dateFrom", from.to_string()),
            ("dateTo", to.to_string()),
        ];
        if !competitions.is_empty() {
            query.push(("competitions", competitions.join(",")));
        }

        let response: MatchesResponse = self.get_json("/matches", &query).await?;
        Ok(convert_batch(&response.matches))
    }

    async fn fixture(&self, id: &str) -> Result<Option<NormalizedMatch>, AppError> {
        let result: Result<FdMatch, AppError> =
            self.get_json(&format!("/matches/{id}"), &[]).await;
        match result {
            Ok(fd) => match convert_match(&fd) {
                Some(m) => Ok(Some(m)),
                None => Err(AppError::malformed(format!("fixture {id}"))),
            },
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn events(&self, id: &str) -> Result<Vec<MatchEvent>, AppError> {
        let fd: FdMatch = self.get_json(&format!("/matches/{id}"), &[]).await?;
        Ok(convert_events(&fd))
    }

    async fn recent_fixtures(
        &self,
        team_id: &str,
        last: u32,
    ) -> Result<Vec<NormalizedMatch>, AppError> {
        let query = vec![
            ("status", "FINISHED".to_string()),
            ("limit", last.to_string()),
        ];
        let response: MatchesResponse = self
            .get_json(&format!("/teams/{team_id}/matches"), &query)
            .await?;

        let mut matches = convert_batch(&response.matches);
        matches.sort_by(|a, b| b.kickoff_utc.cmp(&a.kickoff_utc));
        Ok(matches)
    }

    async fn head_to_head(
        &self,
        fixture_id: &str,
        limit: u32,
    ) -> Result<Vec<NormalizedMatch>, AppError> {
        let query = vec![("limit", limit.to_string())];
        let response: MatchesResponse = self
            .get_json(&format!("/matches/{fixture_id}/head2head"), &query)
            .await?;

        let mut matches = convert_batch(&response.matches);
        matches.sort_by(|a, b| b.kickoff_utc.cmp(&a.kickoff_utc));
        Ok(matches)
    }

    async fn standings(
        &self,
        competition: &str,
        season: Option<i32>,
    ) -> Result<Vec<StandingRow>, AppError> {
        let mut query = Vec::new();
        if let Some(season) = season {
            query.push(("season", season.to_string()));
        }
        let response: FdStandingsResponse = self
            .get_json(&format!("/competitions/{competition}/standings"), &query)
            .await?;

        // The response carries TOTAL/HOME/AWAY tables; the overall table is
        // the one callers mean.
        let table = response
            .standings
            .iter()
            .find(|t| t.kind.as_deref() == Some("TOTAL"))
            .or_else(|| response.standings.first());

        Ok(table
            .map(|t| t.table.iter().map(convert_standing_row).collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "football-data"
    }
}

// --- football-data.org response types ---

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<FdMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdMatch {
    id: i64,
    utc_date: Option<String>,
    status: Option<String>,
    #[serde(default)]
    competition: FdCompetition,
    #[serde(default)]
    home_team: FdTeam,
    #[serde(default)]
    away_team: FdTeam,
    #[serde(default)]
    score: FdScore,
    #[serde(default)]
    goals: Vec<FdGoal>,
    #[serde(default)]
    bookings: Vec<FdBooking>,
    #[serde(default)]
    substitutions: Vec<FdSubstitution>,
}

#[derive(Debug, Default, Deserialize)]
struct FdCompetition {
    code: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FdTeam {
    id: Option<i64>,
    name: Option<String>,
    crest: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdScore {
    half_time: Option<FdScorePair>,
    full_time: Option<FdScorePair>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct FdScorePair {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdGoal {
    minute: Option<u32>,
    injury_time: Option<u32>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    team: FdTeam,
    scorer: Option<FdPerson>,
}

#[derive(Debug, Deserialize)]
struct FdBooking {
    minute: Option<u32>,
    card: Option<String>,
    #[serde(default)]
    team: FdTeam,
    player: Option<FdPerson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdSubstitution {
    minute: Option<u32>,
    #[serde(default)]
    team: FdTeam,
    player_in: Option<FdPerson>,
    player_out: Option<FdPerson>,
}

#[derive(Debug, Deserialize)]
struct FdPerson {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FdStandingsResponse {
    #[serde(default)]
    standings: Vec<FdStandingTable>,
}

#[derive(Debug, Deserialize)]
struct FdStandingTable {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    table: Vec<FdTableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FdTableRow {
    #[serde(default)]
    position: u32,
    #[serde(default)]
    team: FdTeam,
    #[serde(default)]
    played_games: u32,
    #[serde(default)]
    won: u32,
    #[serde(default)]
    draw: u32,
    #[serde(default)]
    lost: u32,
    #[serde(default)]
    goal_difference: i32,
    #[serde(default)]
    points: u32,
}

// --- Conversion ---

fn convert_batch(raw: &[FdMatch]) -> Vec<NormalizedMatch> {
    raw.iter().filter_map(convert_match).collect()
}

fn convert_match(fd: &FdMatch) -> Option<NormalizedMatch> {
    let kickoff_raw = fd.utc_date.as_deref().unwrap_or("");
    let kickoff_utc = match DateTime::parse_from_rfc3339(kickoff_raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            warn!(
                fixture = fd.id,
                raw = kickoff_raw,
                error = %e,
                "Skipping fixture with unparseable kickoff"
            );
            return None;
        }
    };

    let status = parse_status(fd.status.as_deref().unwrap_or(""));
    let half_time = fd.score.half_time.and_then(score_pair);
    let full_time = fd.score.full_time.and_then(score_pair);
    let (home_score, away_score) = split_score(current_score(&status, half_time, full_time));

    Some(NormalizedMatch {
        id: fd.id.to_string(),
        league: League {
            code: fd.competition.code.clone().unwrap_or_default(),
            name: fd.competition.name.clone().unwrap_or_default(),
        },
        kickoff_utc,
        status,
        home: team_side(&fd.home_team, home_score),
        away: team_side(&fd.away_team, away_score),
    })
}

fn parse_status(code: &str) -> MatchStatus {
    match code {
        "SCHEDULED" => MatchStatus::Scheduled,
        "TIMED" => MatchStatus::Timed,
        "IN_PLAY" => MatchStatus::InPlay,
        "PAUSED" => MatchStatus::Paused,
        "FINISHED" => MatchStatus::Finished,
        "SUSPENDED" => MatchStatus::Suspended,
        "POSTPONED" => MatchStatus::Postponed,
        "CANCELLED" => MatchStatus::Cancelled,
        other => MatchStatus::Other(other.to_string()),
    }
}

fn score_pair(pair: FdScorePair) -> Option<(u32, u32)> {
    Some((pair.home?, pair.away?))
}

fn team_side(team: &FdTeam, score: Option<u32>) -> TeamSide {
    TeamSide {
        id: team.id.map(|id| id.to_string()),
        name: team.name.clone().unwrap_or_default(),
        crest_url: team.crest.clone(),
        score,
    }
}

fn person_name(person: &Option<FdPerson>) -> String {
    person
        .as_ref()
        .and_then(|p| p.name.clone())
        .unwrap_or_default()
}

/// The match detail carries goals, bookings, and substitutions as separate
/// groups; the timeline keeps that grouping and is not re-sorted.
fn convert_events(fd: &FdMatch) -> Vec<MatchEvent> {
    let mut events = Vec::new();

    for goal in &fd.goals {
        events.push(MatchEvent {
            minute_elapsed: goal.minute.unwrap_or(0),
            minute_extra: goal.injury_time,
            kind: "GOAL".to_string(),
            detail: goal.kind.clone().unwrap_or_default(),
            player: person_name(&goal.scorer),
            team: goal.team.name.clone().unwrap_or_default(),
        });
    }
    for booking in &fd.bookings {
        events.push(MatchEvent {
            minute_elapsed: booking.minute.unwrap_or(0),
            minute_extra: None,
            kind: "CARD".to_string(),
            detail: booking.card.clone().unwrap_or_default(),
            player: person_name(&booking.player),
            team: booking.team.name.clone().unwrap_or_default(),
        });
    }
    for sub in &fd.substitutions {
        events.push(MatchEvent {
            minute_elapsed: sub.minute.unwrap_or(0),
            minute_extra: None,
            kind: "SUBSTITUTION".to_string(),
            detail: format!("replaces {}", person_name(&sub.player_out)),
            player: person_name(&sub.player_in),
            team: sub.team.name.clone().unwrap_or_default(),
        });
    }

    events
}

fn convert_standing_row(row: &FdTableRow) -> StandingRow {
    StandingRow {
        position: row.position,
        team: TeamRef {
            id: row.team.id.map(|id| id.to_string()),
            name: row.team.name.clone().unwrap_or_default(),
            crest_url: row.team.crest.clone(),
        },
        played: row.played_games,
        won: row.won,
        drawn: row.draw,
        lost: row.lost,
        goal_difference: row.goal_difference,
        points: row.points,
    }
}

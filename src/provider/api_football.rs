//! API-FOOTBALL v3 adapter.
//!
//! Auth is an `x-apisports-key` header. The API wraps every payload in a
//! `{ response: [...], errors: ... }` envelope and reports quota problems as
//! HTTP 200 with a populated `errors` field, so the envelope is checked on
//! every call.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::fixtures::models::{
    League, MatchEvent, MatchStatus, NormalizedMatch, StandingRow, TeamRef, TeamSide,
};
use crate::provider::FixtureProvider;

const DEFAULT_BASE_URL: &str = "https://v3.football.api-sports.io";

pub struct ApiFootballProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiFootballProvider {
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
    async fn get_response<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .header("x-apisports-key", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!("{url} returned {status}: {body}")));
        }

        let envelope: Envelope<T> = resp
            .json()
            .await
            .map_err(|e| AppError::malformed(format!("{url}: {e}")))?;

        if let Some(message) = envelope_errors(&envelope.errors) {
            return Err(AppError::upstream(format!("{url}: {message}")));
        }

        Ok(envelope.response)
    }
}

#[async_trait]
impl FixtureProvider for ApiFootballProvider {
    async fn fixtures_window(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        competitions: &[String],
    ) -> Result<Vec<NormalizedMatch>, AppError> {
        // The fixtures endpoint takes one calendar date per request.
        let mut records = Vec::new();
        let mut day = from;
        while day <= to {
            let query = vec![
                ("date", day.to_string()),
                ("timezone", "UTC".to_string()),
            ];
            let page: Vec<AfFixtureRecord> = self.get_response("/fixtures", &query).await?;
            records.extend(page);
            day = match day.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }

        let mut matches: Vec<NormalizedMatch> = records
            .iter()
            .filter(|r| {
                competitions.is_empty()
                    || r.league
                        .id
                        .map(|id| competitions.iter().any(|c| c == &id.to_string()))
                        .unwrap_or(false)
            })
            .filter_map(convert_fixture)
            .collect();
        matches.sort_by_key(|m| m.kickoff_utc);
        Ok(matches)
    }

    async fn fixture(&self, id: &str) -> Result<Option<NormalizedMatch>, AppError> {
        let query = vec![("id", id.to_string())];
        let records: Vec<AfFixtureRecord> = self.get_response("/fixtures", &query).await?;
        match records.first() {
            Some(record) => match convert_fixture(record) {
                Some(m) => Ok(Some(m)),
                None => Err(AppError::malformed(format!("fixture {id}"))),
            },
            None => Ok(None),
        }
    }

    async fn events(&self, id: &str) -> Result<Vec<MatchEvent>, AppError> {
        let query = vec![("fixture", id.to_string())];
        let events: Vec<AfEvent> = self.get_response("/fixtures/events", &query).await?;
        Ok(events.iter().map(convert_event).collect())
    }

    async fn recent_fixtures(
        &self,
        team_id: &str,
        last: u32,
    ) -> Result<Vec<NormalizedMatch>, AppError> {
        let query = vec![
            ("team", team_id.to_string()),
            ("last", last.to_string()),
            ("status", "FT".to_string()),
        ];
        let records: Vec<AfFixtureRecord> = self.get_response("/fixtures", &query).await?;

        let mut matches: Vec<NormalizedMatch> =
            records.iter().filter_map(convert_fixture).collect();
        matches.sort_by(|a, b| b.kickoff_utc.cmp(&a.kickoff_utc));
        Ok(matches)
    }

    async fn head_to_head(
        &self,
        fixture_id: &str,
        limit: u32,
    ) -> Result<Vec<NormalizedMatch>, AppError> {
        let fixture = self
            .fixture(fixture_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("fixture {fixture_id}")))?;

        let (Some(home_id), Some(away_id)) = (fixture.home.id, fixture.away.id) else {
            return Err(AppError::malformed(format!(
                "fixture {fixture_id} has no team ids"
            )));
        };

        let query = vec![
            ("h2h", format!("{home_id}-{away_id}")),
            ("last", limit.to_string()),
            ("status", "FT".to_string()),
        ];
        let records: Vec<AfFixtureRecord> =
            self.get_response("/fixtures/headtohead", &query).await?;

        let mut matches: Vec<NormalizedMatch> =
            records.iter().filter_map(convert_fixture).collect();
        matches.sort_by(|a, b| b.kickoff_utc.cmp(&a.kickoff_utc));
        Ok(matches)
    }

    async fn standings(
        &self,
        competition: &str,
        season: Option<i32>,
    ) -> Result<Vec<StandingRow>, AppError> {
        let season = season.unwrap_or_else(default_season);
        let query = vec![
            ("league", competition.to_string()),
            ("season", season.to_string()),
        ];
        let records: Vec<AfStandingsRecord> = self.get_response("/standings", &query).await?;

        Ok(records
            .first()
            .and_then(|r| r.league.standings.first())
            .map(|rows| rows.iter().map(convert_standing_row).collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "api-football"
    }
}

/// European seasons are labeled by their starting year: July onward belongs
/// to the season that starts that year.
fn default_season() -> i32 {
    let now = Utc::now();
    if now.month() >= 7 {
        now.year()
    } else {
        now.year() - 1
    }
}

// --- API-FOOTBALL response types ---

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Envelope<T> {
    #[serde(default)]
    errors: serde_json::Value,
    #[serde(default)]
    response: Vec<T>,
}

/// The errors field is an empty array when all is well, and an object (or a
/// non-empty array) of messages when the request was rejected.
fn envelope_errors(errors: &serde_json::Value) -> Option<String> {
    match errors {
        serde_json::Value::Object(map) if !map.is_empty() => Some(
            map.values()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        serde_json::Value::Array(items) if !items.is_empty() => Some(
            items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct AfFixtureRecord {
    fixture: AfFixture,
    #[serde(default)]
    league: AfLeague,
    #[serde(default)]
    teams: AfTeams,
    #[serde(default)]
    goals: AfGoals,
}

#[derive(Debug, Deserialize)]
struct AfFixture {
    id: i64,
    date: Option<String>,
    #[serde(default)]
    status: AfStatus,
}

#[derive(Debug, Default, Deserialize)]
struct AfStatus {
    short: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AfLeague {
    id: Option<i64>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AfTeams {
    #[serde(default)]
    home: AfTeam,
    #[serde(default)]
    away: AfTeam,
}

#[derive(Debug, Default, Deserialize)]
struct AfTeam {
    id: Option<i64>,
    name: Option<String>,
    logo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AfGoals {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AfEvent {
    #[serde(default)]
    time: AfEventTime,
    #[serde(rename = "type")]
    kind: Option<String>,
    detail: Option<String>,
    #[serde(default)]
    player: AfPerson,
    #[serde(default)]
    team: AfTeam,
}

#[derive(Debug, Default, Deserialize)]
struct AfEventTime {
    elapsed: Option<i64>,
    extra: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct AfPerson {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AfStandingsRecord {
    #[serde(default)]
    league: AfStandingsLeague,
}

#[derive(Debug, Default, Deserialize)]
struct AfStandingsLeague {
    #[serde(default)]
    standings: Vec<Vec<AfStandingRow>>,
}

#[derive(Debug, Deserialize)]
struct AfStandingRow {
    #[serde(default)]
    rank: u32,
    #[serde(default)]
    team: AfTeam,
    #[serde(default)]
    all: AfStandingStats,
    #[serde(rename = "goalsDiff", default)]
    goals_diff: i32,
    #[serde(default)]
    points: u32,
}

#[derive(Debug, Default, Deserialize)]
struct AfStandingStats {
    #[serde(default)]
    played: u32,
    #[serde(default)]
    win: u32,
    #[serde(default)]
    draw: u32,
    #[serde(default)]
    lose: u32,
}

// --- Conversion ---

fn convert_fixture(record: &AfFixtureRecord) -> Option<NormalizedMatch> {
    let raw_date = record.fixture.date.as_deref().unwrap_or("");
    let kickoff_utc = match DateTime::parse_from_rfc3339(raw_date) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            warn!(
                fixture = record.fixture.id,
                raw = raw_date,
                error = %e,
                "Skipping fixture with unparseable kickoff"
            );
            return None;
        }
    };

    let status = parse_status(record.fixture.status.short.as_deref().unwrap_or(""));

    // This provider reports the running score directly in `goals`.
    let current = match (record.goals.home, record.goals.away) {
        (Some(home), Some(away)) if status.has_started() => Some((home, away)),
        _ => None,
    };
    let (home_score, away_score) = crate::fixtures::models::split_score(current);

    Some(NormalizedMatch {
        id: record.fixture.id.to_string(),
        league: League {
            code: record
                .league
                .id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            name: record.league.name.clone().unwrap_or_default(),
        },
        kickoff_utc,
        status,
        home: team_side(&record.teams.home, home_score),
        away: team_side(&record.teams.away, away_score),
    })
}

fn parse_status(short: &str) -> MatchStatus {
    match short {
        "NS" | "TBD" => MatchStatus::Scheduled,
        "1H" | "2H" | "ET" | "P" | "BT" | "LIVE" => MatchStatus::InPlay,
        "HT" => MatchStatus::Paused,
        "FT" | "AET" | "PEN" => MatchStatus::Finished,
        "SUSP" | "INT" | "ABD" => MatchStatus::Suspended,
        "PST" => MatchStatus::Postponed,
        "CANC" => MatchStatus::Cancelled,
        other => MatchStatus::Other(other.to_string()),
    }
}

fn team_side(team: &AfTeam, score: Option<u32>) -> TeamSide {
    TeamSide {
        id: team.id.map(|id| id.to_string()),
        name: team.name.clone().unwrap_or_default(),
        crest_url: team.logo.clone(),
        score,
    }
}

fn convert_event(event: &AfEvent) -> MatchEvent {
    MatchEvent {
        minute_elapsed: clamp_minute(event.time.elapsed),
        minute_extra: event.time.extra.map(|e| clamp_minute(Some(e))),
        kind: event.kind.clone().unwrap_or_default(),
        detail: event.detail.clone().unwrap_or_default(),
        player: event.player.name.clone().unwrap_or_default(),
        team: event.team.name.clone().unwrap_or_default(),
    }
}

fn clamp_minute(minute: Option<i64>) -> u32 {
    minute
        .and_then(|m| u32::try_from(m).ok())
        .unwrap_or(0)
}

fn convert_standing_row(row: &AfStandingRow) -> StandingRow {
    StandingRow {
        position: row.rank,
        team: TeamRef {
            id: row.team.id.map(|id| id.to_string()),
            name: row.team.name.clone().unwrap_or_default(),
            crest_url: row.team.logo.clone(),
        },
        played: row.all.played,
        won: row.all.win,
        drawn: row.all.draw,
        lost: row.all.lose,
        goal_difference: row.goals_diff,
        points: row.points,
    }
}

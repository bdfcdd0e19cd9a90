//! REST API layer: axum router plus shared application state.
//!
//! Degradation policy: listings never 5xx on upstream failure, they come
//! back empty with a warn log; absent single resources are a `null` body;
//! narrative endpoints fall back to empty text.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::fixtures::filter::select_for_day;
use crate::fixtures::form::{recent_form, FormResult};
use crate::fixtures::models::{MatchEvent, NormalizedMatch, StandingRow};
use crate::narrative::NarrativeService;
use crate::prefs::store::{PreferenceRecord, PrefsStore};
use crate::provider::FixtureProvider;

/// Shared state accessible by all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn FixtureProvider>,
    pub narrative: Option<Arc<NarrativeService>>,
    pub prefs: Arc<PrefsStore>,
    pub config: Arc<AppConfig>,
    pub started_at: DateTime<Utc>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/matches/today", get(matches_today))
        .route("/api/matches/{id}", get(match_by_id))
        .route("/api/matches/{id}/events", get(match_events))
        .route("/api/teams/{id}/form", get(team_form))
        .route("/api/standings", get(standings))
        .route("/api/ai/preview", get(ai_preview))
        .route("/api/ai/summary", get(ai_summary))
        .route(
            "/prefs/{user_id}",
            get(get_prefs).post(save_pref).delete(delete_prefs),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {addr}"))?;
    info!(addr = %addr, "API server listening");

    axum::serve(listener, router(state))
        .await
        .context("API server error")?;
    Ok(())
}

// -- Route Handlers --

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "provider": state.provider.name(),
        "narrativeEnabled": state.narrative.is_some(),
        "uptimeSeconds": (Utc::now() - state.started_at).num_seconds(),
    }))
}

#[derive(Debug, Deserialize)]
struct TodayQuery {
    /// Defaults to today in the requested zone.
    date: Option<NaiveDate>,
    /// UTC offset like "+02:00"; defaults to UTC.
    tz: Option<String>,
}

async fn matches_today(
    State(state): State<AppState>,
    Query(q): Query<TodayQuery>,
) -> Json<Vec<NormalizedMatch>> {
    let zone = parse_zone(q.tz.as_deref());
    let day = q
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&zone).date_naive());

    // Over-fetch a window either side of the day, then filter back down to
    // the exact local date.
    let window = u64::from(state.config.provider.window_days);
    let from = day.checked_sub_days(Days::new(window)).unwrap_or(day);
    let to = day.checked_add_days(Days::new(window)).unwrap_or(day);

    match state
        .provider
        .fixtures_window(from, to, &state.config.provider.competitions)
        .await
    {
        Ok(matches) => {
            let selected = select_for_day(matches, day, &zone);
            info!(day = %day, count = selected.len(), "Fixtures listed");
            Json(selected)
        }
        Err(e) => {
            warn!(error = %e, day = %day, "Fixture listing unavailable — returning empty");
            Json(Vec::new())
        }
    }
}

async fn match_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Option<NormalizedMatch>> {
    match state.provider.fixture(&id).await {
        Ok(found) => Json(found),
        Err(e) => {
            warn!(error = %e, fixture = %id, "Fixture lookup failed");
            Json(None)
        }
    }
}

async fn match_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<MatchEvent>> {
    match state.provider.events(&id).await {
        Ok(events) => Json(events),
        Err(e) => {
            warn!(error = %e, fixture = %id, "Event timeline unavailable — returning empty");
            Json(Vec::new())
        }
    }
}

#[derive(Debug, Deserialize)]
struct FormQuery {
    last: Option<u32>,
}

async fn team_form(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Query(q): Query<FormQuery>,
) -> Json<Vec<FormResult>> {
    let last = q.last.unwrap_or(state.config.narrative.form_matches);
    let matches = match state.provider.recent_fixtures(&team_id, last).await {
        Ok(matches) => matches,
        Err(e) => {
            warn!(error = %e, team = %team_id, "Recent fixtures unavailable — returning empty");
            return Json(Vec::new());
        }
    };
    match recent_form(&matches, &team_id) {
        Ok(form) => Json(form),
        Err(e) => {
            warn!(error = %e, team = %team_id, "Form computation failed — returning empty");
            Json(Vec::new())
        }
    }
}

#[derive(Debug, Deserialize)]
struct StandingsQuery {
    competition: Option<String>,
    season: Option<i32>,
}

async fn standings(
    State(state): State<AppState>,
    Query(q): Query<StandingsQuery>,
) -> Response {
    let Some(competition) = q.competition else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "competition is required"})),
        )
            .into_response();
    };
    match state.provider.standings(&competition, q.season).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => {
            warn!(error = %e, competition = %competition, "Standings unavailable — returning empty");
            Json(Vec::<StandingRow>::new()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct NarrativeQuery {
    fixture: String,
}

async fn ai_preview(
    State(state): State<AppState>,
    Query(q): Query<NarrativeQuery>,
) -> String {
    let Some(ref narrative) = state.narrative else {
        warn!("Preview requested but narrative generation is disabled");
        return String::new();
    };
    match narrative.preview(&q.fixture).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, fixture = %q.fixture, "Preview generation failed — returning empty");
            String::new()
        }
    }
}

async fn ai_summary(
    State(state): State<AppState>,
    Query(q): Query<NarrativeQuery>,
) -> String {
    let Some(ref narrative) = state.narrative else {
        warn!("Recap requested but narrative generation is disabled");
        return String::new();
    };
    match narrative.recap(&q.fixture).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, fixture = %q.fixture, "Recap generation failed — returning empty");
            String::new()
        }
    }
}

async fn get_prefs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<PreferenceRecord>> {
    match state.prefs.list_for_user(&user_id).await {
        Ok(prefs) => Json(prefs),
        Err(e) => {
            warn!(error = %e, user = %user_id, "Preference listing failed — returning empty");
            Json(Vec::new())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavePrefQuery {
    pref_type: String,
    value_name: String,
}

async fn save_pref(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(q): Query<SavePrefQuery>,
) -> Response {
    match state.prefs.save(&user_id, &q.pref_type, &q.value_name).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            warn!(error = %e, user = %user_id, "Preference save failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

async fn delete_prefs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.prefs.delete_for_user(&user_id).await {
        Ok(deleted) => Json(serde_json::json!({"deleted": deleted})).into_response(),
        Err(e) => {
            warn!(error = %e, user = %user_id, "Preference delete failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Parse a "+02:00"-style offset; anything else falls back to UTC.
fn parse_zone(tz: Option<&str>) -> FixedOffset {
    let utc = FixedOffset::east_opt(0).expect("zero offset is valid");
    match tz {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(tz = raw, "Unparseable timezone offset — using UTC");
            utc
        }),
        None => utc,
    }
}

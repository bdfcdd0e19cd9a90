//! Upstream sports-data providers behind one uniform contract.

pub mod api_football;
pub mod football_data;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::warn;

use crate::config::{ProviderConfig, ProviderKind, Secrets};
use crate::error::AppError;
use crate::fixtures::models::{MatchEvent, NormalizedMatch, StandingRow};
use crate::provider::api_football::ApiFootballProvider;
use crate::provider::football_data::FootballDataProvider;

/// One upstream sports-data API. Adapters own their provider-specific
/// response schemas and convert them into the canonical types at the
/// boundary. Provider configuration is an explicit value handed to the
/// adapter at construction, never process-global state.
#[async_trait]
pub trait FixtureProvider: Send + Sync {
    /// Fixtures with kickoff between `from` and `to` (UTC calendar dates,
    /// inclusive), limited to the given competitions when non-empty.
    /// Individual malformed records are skipped, not fatal to the batch.
    async fn fixtures_window(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        competitions: &[String],
    ) -> Result<Vec<NormalizedMatch>, AppError>;

    /// A single fixture by id, `None` when the provider has nothing for it.
    async fn fixture(&self, id: &str) -> Result<Option<NormalizedMatch>, AppError>;

    /// Event timeline for a fixture, in the order the provider reports it.
    async fn events(&self, id: &str) -> Result<Vec<MatchEvent>, AppError>;

    /// The team's most recent finished fixtures, newest first.
    async fn recent_fixtures(
        &self,
        team_id: &str,
        last: u32,
    ) -> Result<Vec<NormalizedMatch>, AppError>;

    /// Historical meetings between the two sides of the given fixture,
    /// newest first.
    async fn head_to_head(
        &self,
        fixture_id: &str,
        limit: u32,
    ) -> Result<Vec<NormalizedMatch>, AppError>;

    /// Ranked league table rows. When `season` is absent the provider's
    /// current season is used.
    async fn standings(
        &self,
        competition: &str,
        season: Option<i32>,
    ) -> Result<Vec<StandingRow>, AppError>;

    /// Human-readable name of this provider.
    fn name(&self) -> &str;
}

/// Build the configured provider adapter.
pub fn build_provider(
    config: &ProviderConfig,
    secrets: &Secrets,
) -> Result<Arc<dyn FixtureProvider>, AppError> {
    match config.kind {
        ProviderKind::FootballData => {
            let api_key = secrets.football_data_api_key.clone().unwrap_or_else(|| {
                warn!("FOOTBALL_DATA_API_KEY not set — upstream requests will be rejected");
                String::new()
            });
            Ok(Arc::new(FootballDataProvider::new(config, api_key)?))
        }
        ProviderKind::ApiFootball => {
            let api_key = secrets.api_football_key.clone().unwrap_or_else(|| {
                warn!("API_FOOTBALL_KEY not set — upstream requests will be rejected");
                String::new()
            });
            Ok(Arc::new(ApiFootballProvider::new(config, api_key)?))
        }
    }
}

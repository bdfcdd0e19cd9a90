//! LLM-backed preview and recap generation.
//!
//! The service composes a fact sheet from normalized fixture data and hands
//! it to the narrative client. Form, head-to-head, and event inputs are
//! fetched concurrently and degrade independently: a missing input drops
//! its section from the fact sheet instead of failing the request.

pub mod client;
pub mod prompts;

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::config::NarrativeConfig;
use crate::error::AppError;
use crate::fixtures::form::{head_to_head_tally, recent_form, FormResult, H2hTally};
use crate::fixtures::models::{NormalizedMatch, TeamSide};
use crate::narrative::client::NarrativeClient;
use crate::provider::FixtureProvider;

pub struct NarrativeService {
    client: NarrativeClient,
    provider: Arc<dyn FixtureProvider>,
    config: NarrativeConfig,
}

impl NarrativeService {
    pub fn new(
        client: NarrativeClient,
        provider: Arc<dyn FixtureProvider>,
        config: NarrativeConfig,
    ) -> Self {
        Self {
            client,
            provider,
            config,
        }
    }

    /// Pre-match preview: fixture facts plus both teams' recent form and
    /// the head-to-head tally.
    #[instrument(skip(self))]
    pub async fn preview(&self, fixture_id: &str) -> Result<String, AppError> {
        let fixture = self
            .provider
            .fixture(fixture_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("fixture {fixture_id}")))?;

        let (home_form, away_form, h2h) = tokio::join!(
            self.form_for(&fixture.home),
            self.form_for(&fixture.away),
            self.h2h_for(fixture_id, &fixture),
        );

        let prompt = prompts::build_preview_prompt(
            &fixture,
            home_form.as_deref(),
            away_form.as_deref(),
            h2h,
        );
        self.client
            .complete(&prompts::system_prompt(), &prompt)
            .await
    }

    /// Post-match recap: final score plus the event timeline.
    #[instrument(skip(self))]
    pub async fn recap(&self, fixture_id: &str) -> Result<String, AppError> {
        let fixture = self
            .provider
            .fixture(fixture_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("fixture {fixture_id}")))?;

        let events = match self.provider.events(fixture_id).await {
            Ok(events) => events,
            Err(e) => {
                warn!(
                    error = %e,
                    fixture = fixture_id,
                    "Event timeline unavailable — recapping from the score only"
                );
                Vec::new()
            }
        };

        let prompt = prompts::build_recap_prompt(&fixture, &events);
        self.client
            .complete(&prompts::system_prompt(), &prompt)
            .await
    }

    async fn form_for(&self, side: &TeamSide) -> Option<Vec<FormResult>> {
        let team_id = side.id.as_deref()?;
        let matches = match self
            .provider
            .recent_fixtures(team_id, self.config.form_matches)
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, team = %side.name, "Recent form unavailable");
                return None;
            }
        };
        match recent_form(&matches, team_id) {
            Ok(form) => Some(form),
            Err(e) => {
                warn!(error = %e, team = %side.name, "Form computation failed");
                None
            }
        }
    }

    async fn h2h_for(&self, fixture_id: &str, fixture: &NormalizedMatch) -> Option<H2hTally> {
        let home_id = fixture.home.id.as_deref()?;
        let away_id = fixture.away.id.as_deref()?;

        let meetings = match self
            .provider
            .head_to_head(fixture_id, self.config.head_to_head_limit)
            .await
        {
            Ok(meetings) => meetings,
            Err(e) => {
                warn!(error = %e, fixture = fixture_id, "Head-to-head history unavailable");
                return None;
            }
        };
        match head_to_head_tally(&meetings, home_id, away_id) {
            Ok(tally) => Some(tally),
            Err(e) => {
                warn!(error = %e, fixture = fixture_id, "Head-to-head tally failed");
                None
            }
        }
    }
}

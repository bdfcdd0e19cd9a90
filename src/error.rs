use thiserror::Error;

/// Error taxonomy for the aggregator.
///
/// Handlers degrade rather than fail: an unavailable upstream turns a listing
/// into an empty collection, absent data becomes a `null` body, and a single
/// bad record never sinks the batch it arrived in.
#[derive(Debug, Error)]
pub enum AppError {
    /// The provider call failed, timed out, or returned a non-success status.
    #[error("upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A provider record could not be parsed into the canonical shape.
    #[error("malformed provider record: {0}")]
    MalformedRecord(String),

    /// The given team is on neither side of the match. Fails that one
    /// computation, not the surrounding batch.
    #[error("team {team} is on neither side of match {match_id}")]
    InvalidTeamReference { team: String, match_id: String },

    /// The requested fixture or user simply has no data.
    #[error("no data for {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("narrative generation failed: {0}")]
    Narrative(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamUnavailable(err.to_string())
    }
}

impl AppError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True when the error means "nothing there" rather than "something broke".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_carry_context() {
        let err = AppError::InvalidTeamReference {
            team: "57".to_string(),
            match_id: "497014".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "team 57 is on neither side of match 497014"
        );

        let err = AppError::upstream("https://example.invalid returned 503");
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn not_found_is_classified() {
        assert!(AppError::not_found("fixture 1").is_not_found());
        assert!(!AppError::upstream("boom").is_not_found());
        assert!(!AppError::malformed("bad json").is_not_found());
    }
}

//! Date-window filtering of normalized fixtures.

use chrono::{NaiveDate, TimeZone};

use crate::fixtures::models::NormalizedMatch;

/// Keep only matches whose kickoff falls on `day` in `zone`, ascending by
/// kickoff time.
///
/// Providers are queried with a window either side of the target day first;
/// this narrows the over-fetched batch down to the exact local calendar day,
/// tolerating clock slop at day boundaries.
pub fn select_for_day<Tz: TimeZone>(
    matches: Vec<NormalizedMatch>,
    day: NaiveDate,
    zone: &Tz,
) -> Vec<NormalizedMatch> {
    let mut selected: Vec<NormalizedMatch> = matches
        .into_iter()
        .filter(|m| m.kickoff_utc.with_timezone(zone).date_naive() == day)
        .collect();
    selected.sort_by_key(|m| m.kickoff_utc);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::models::{League, MatchStatus, TeamSide};
    use chrono::{DateTime, FixedOffset, Utc};

    fn fixture(id: &str, kickoff: &str) -> NormalizedMatch {
        NormalizedMatch {
            id: id.to_string(),
            league: League {
                code: "PL".to_string(),
                name: "Premier League".to_string(),
            },
            kickoff_utc: DateTime::parse_from_rfc3339(kickoff)
                .unwrap()
                .with_timezone(&Utc),
            status: MatchStatus::Scheduled,
            home: side("Home FC"),
            away: side("Away FC"),
        }
    }

    fn side(name: &str) -> TeamSide {
        TeamSide {
            id: None,
            name: name.to_string(),
            crest_url: None,
            score: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn selects_only_matches_on_the_local_day() {
        // In UTC-5 these kick off at 18:30 and 20:00 on June 1st, and 17:00
        // on June 2nd. Only the last one belongs to June 2nd locally.
        let matches = vec![
            fixture("a", "2024-06-01T23:30:00Z"),
            fixture("b", "2024-06-02T01:00:00Z"),
            fixture("c", "2024-06-02T22:00:00Z"),
        ];
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();

        let selected = select_for_day(matches, day("2024-06-02"), &minus_five);
        let ids: Vec<&str> = selected.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn utc_boundary_fixtures_land_on_the_earlier_local_day() {
        let matches = vec![
            fixture("a", "2024-06-01T23:30:00Z"),
            fixture("b", "2024-06-02T01:00:00Z"),
        ];
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();

        let selected = select_for_day(matches, day("2024-06-01"), &minus_five);
        let ids: Vec<&str> = selected.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn output_is_sorted_ascending_by_kickoff() {
        let matches = vec![
            fixture("late", "2024-06-02T20:00:00Z"),
            fixture("early", "2024-06-02T12:00:00Z"),
            fixture("mid", "2024-06-02T15:00:00Z"),
        ];

        let selected = select_for_day(matches, day("2024-06-02"), &Utc);
        let ids: Vec<&str> = selected.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);
    }

    #[test]
    fn output_is_a_subset_of_input() {
        let matches = vec![
            fixture("a", "2024-06-01T12:00:00Z"),
            fixture("b", "2024-06-02T12:00:00Z"),
            fixture("c", "2024-06-03T12:00:00Z"),
        ];

        let selected = select_for_day(matches, day("2024-06-02"), &Utc);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "b");
    }

    #[test]
    fn empty_input_selects_nothing() {
        let selected = select_for_day(Vec::new(), day("2024-06-02"), &Utc);
        assert!(selected.is_empty());
    }
}

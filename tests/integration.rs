//! Integration tests for cross-module functionality.

use chrono::{DateTime, FixedOffset, Utc};
use matchday_backend::error::AppError;
use matchday_backend::fixtures::filter::select_for_day;
use matchday_backend::fixtures::form::{head_to_head_tally, recent_form, FormResult};
use matchday_backend::fixtures::models::{
    current_score, split_score, League, MatchStatus, NormalizedMatch, TeamSide,
};

fn side(id: &str, name: &str, score: Option<u32>) -> TeamSide {
    TeamSide {
        id: Some(id.to_string()),
        name: name.to_string(),
        crest_url: None,
        score,
    }
}

fn fixture(id: &str, kickoff: &str, home: TeamSide, away: TeamSide) -> NormalizedMatch {
    NormalizedMatch {
        id: id.to_string(),
        league: League {
            code: "PL".to_string(),
            name: "Premier League".to_string(),
        },
        kickoff_utc: DateTime::parse_from_rfc3339(kickoff)
            .unwrap()
            .with_timezone(&Utc),
        status: MatchStatus::Finished,
        home,
        away,
    }
}

// ──────────────────────────────────────────
// Current-score selection tests
// ──────────────────────────────────────────

#[test]
fn finished_match_reports_full_time_over_half_time() {
    let score = current_score(&MatchStatus::Finished, Some((0, 0)), Some((2, 1)));
    assert_eq!(score, Some((2, 1)));
}

#[test]
fn nonzero_full_time_wins_regardless_of_status() {
    for status in [MatchStatus::InPlay, MatchStatus::Paused, MatchStatus::Finished] {
        let score = current_score(&status, Some((1, 1)), Some((3, 1)));
        assert_eq!(score, Some((3, 1)), "status {status:?}");
    }
}

#[test]
fn scores_are_both_present_or_both_absent() {
    for current in [None, Some((0, 0)), Some((4, 2))] {
        let (home, away) = split_score(current);
        assert_eq!(home.is_some(), away.is_some());
    }
}

// ──────────────────────────────────────────
// Date-window filter tests
// ──────────────────────────────────────────

#[test]
fn utc_minus_five_keeps_only_the_late_fixture() {
    // Local kickoffs in UTC-5: 18:30 and 20:00 on June 1st, 17:00 on
    // June 2nd. Filtering for June 2nd keeps only the third fixture.
    let matches = vec![
        fixture("a", "2024-06-01T23:30:00Z", side("1", "A", None), side("2", "B", None)),
        fixture("b", "2024-06-02T01:00:00Z", side("3", "C", None), side("4", "D", None)),
        fixture("c", "2024-06-02T22:00:00Z", side("5", "E", None), side("6", "F", None)),
    ];
    let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();

    let selected = select_for_day(matches, "2024-06-02".parse().unwrap(), &minus_five);
    let ids: Vec<&str> = selected.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["c"]);
}

#[test]
fn filter_output_is_sorted_subset_on_the_day() {
    let matches = vec![
        fixture("late", "2024-06-02T20:00:00Z", side("1", "A", None), side("2", "B", None)),
        fixture("other-day", "2024-06-03T10:00:00Z", side("3", "C", None), side("4", "D", None)),
        fixture("early", "2024-06-02T11:00:00Z", side("5", "E", None), side("6", "F", None)),
    ];

    let selected = select_for_day(matches, "2024-06-02".parse().unwrap(), &Utc);
    let ids: Vec<&str> = selected.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "late"]);
    for m in &selected {
        assert_eq!(m.kickoff_utc.date_naive().to_string(), "2024-06-02");
    }
}

// ──────────────────────────────────────────
// Form and head-to-head tests
// ──────────────────────────────────────────

#[test]
fn five_match_form_keeps_input_order() {
    // Team 10 won 3, lost 1, drew 1.
    let matches = vec![
        fixture("1", "2024-05-25T14:00:00Z", side("10", "Us", Some(2)), side("20", "A", Some(1))),
        fixture("2", "2024-05-18T14:00:00Z", side("30", "B", Some(0)), side("10", "Us", Some(1))),
        fixture("3", "2024-05-11T14:00:00Z", side("10", "Us", Some(0)), side("40", "C", Some(3))),
        fixture("4", "2024-05-04T14:00:00Z", side("50", "D", Some(2)), side("10", "Us", Some(2))),
        fixture("5", "2024-04-27T14:00:00Z", side("10", "Us", Some(4)), side("60", "E", Some(0))),
    ];

    let form = recent_form(&matches, "10").unwrap();
    assert_eq!(form.len(), 5);
    assert_eq!(
        form,
        vec![
            FormResult::Win,
            FormResult::Win,
            FormResult::Loss,
            FormResult::Draw,
            FormResult::Win,
        ]
    );
}

#[test]
fn form_every_entry_is_win_loss_or_draw() {
    let matches = vec![
        fixture("1", "2024-05-25T14:00:00Z", side("10", "Us", Some(1)), side("20", "A", Some(1))),
        fixture("2", "2024-05-18T14:00:00Z", side("10", "Us", Some(0)), side("30", "B", Some(2))),
    ];
    let form = recent_form(&matches, "10").unwrap();
    assert_eq!(form.len(), matches.len());
    for entry in form {
        assert!(matches!(
            entry,
            FormResult::Win | FormResult::Loss | FormResult::Draw
        ));
    }
}

#[test]
fn unknown_team_fails_that_computation_only() {
    let matches = vec![fixture(
        "1",
        "2024-05-25T14:00:00Z",
        side("20", "A", Some(1)),
        side("30", "B", Some(0)),
    )];
    let err = recent_form(&matches, "99").unwrap_err();
    assert!(matches!(err, AppError::InvalidTeamReference { .. }));
}

#[test]
fn head_to_head_tally_is_symmetric() {
    let matches = vec![
        fixture("1", "2024-05-25T14:00:00Z", side("10", "A", Some(2)), side("20", "B", Some(0))),
        fixture("2", "2023-12-02T14:00:00Z", side("20", "B", Some(1)), side("10", "A", Some(1))),
        fixture("3", "2023-05-14T14:00:00Z", side("20", "B", Some(3)), side("10", "A", Some(2))),
        fixture("4", "2022-11-06T14:00:00Z", side("10", "A", Some(1)), side("20", "B", Some(0))),
    ];

    let from_a = head_to_head_tally(&matches, "10", "20").unwrap();
    let from_b = head_to_head_tally(&matches, "20", "10").unwrap();

    assert_eq!(from_a.wins_a, 2);
    assert_eq!(from_a.wins_b, 1);
    assert_eq!(from_a.draws, 1);

    assert_eq!(from_a.wins_a, from_b.wins_b);
    assert_eq!(from_a.wins_b, from_b.wins_a);
    assert_eq!(from_a.draws, from_b.draws);
}

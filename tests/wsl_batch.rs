//! WSL roster and points runs against a local stand-in for the fantasy site.

mod common;

use surf_league::pipeline::{run_wsl_points, run_wsl_roster_batch, ParticipantOutcome};
use surf_league::LeagueType;

use common::{fake_client, seeded_store, wsl_participant};

#[tokio::test]
async fn complete_roster_is_persisted() {
    let client = fake_client(None).await;
    let store = seeded_store(&[wsl_participant("u1", "wsl-1")]);

    let summary = run_wsl_roster_batch(&client, &store, "bells", None).await.unwrap();

    assert_eq!(summary.total_teams, 1);
    assert_eq!(summary.successful_fetches, 1);
    assert_eq!(summary.persisted, 1);
    assert_eq!(
        summary.results[0].outcome,
        ParticipantOutcome::Persisted { unresolved: vec![] }
    );
    assert_eq!(summary.rosters.len(), 1);

    let lineup = store.get_wsl_roster("u1", "bells").unwrap().unwrap();
    assert_eq!(lineup.a1, "a-griffin");
    assert_eq!(lineup.a2, "a-jjf");
    assert_eq!(
        [&lineup.b1, &lineup.b2, &lineup.b3, &lineup.b4],
        ["a-italo", "a-jack", "a-ethan", "a-yago"]
    );
    assert_eq!(lineup.c1, "a-connor");
    assert_eq!(lineup.c2, "a-liam");
    assert_eq!(lineup.power_surfer, "a-jjf");

    let standings = store.contest_standings("bells", LeagueType::Wsl).unwrap();
    assert_eq!(standings[0].points, 88.5);
}

#[tokio::test]
async fn unresolved_tier_b_rejects_only_that_participant() {
    let client = fake_client(None).await;
    let store = seeded_store(&[
        wsl_participant("u1", "wsl-unknown-b"),
        wsl_participant("u2", "wsl-2"),
    ]);

    let summary = run_wsl_roster_batch(&client, &store, "bells", None).await.unwrap();

    match &summary.results[0].outcome {
        ParticipantOutcome::ValidationFailed { error, unresolved } => {
            assert!(error.contains("B(3/4)"), "{error}");
            assert_eq!(unresolved, &["Nobody Known".to_string()]);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(store.get_wsl_roster("u1", "bells").unwrap().is_none());
    assert!(store.get_wsl_roster("u2", "bells").unwrap().is_some());
    assert_eq!(summary.persisted, 1);
    assert_eq!(summary.rejected, 1);
}

#[tokio::test]
async fn one_failed_fetch_among_five() {
    let client = fake_client(None).await;
    let store = seeded_store(&[
        wsl_participant("u1", "wsl-1"),
        wsl_participant("u2", "wsl-2"),
        wsl_participant("u3", "wsl-down"),
        wsl_participant("u4", "wsl-4"),
        wsl_participant("u5", "wsl-5"),
    ]);

    let summary = run_wsl_roster_batch(&client, &store, "bells", None).await.unwrap();

    assert_eq!(summary.total_teams, 5);
    assert_eq!(summary.successful_fetches, 4);
    assert_eq!(summary.failed_fetches, 1);
    assert_eq!(summary.persisted, 4);
    assert_eq!(summary.results[2].user_id, "u3");
    assert!(matches!(
        summary.results[2].outcome,
        ParticipantOutcome::FetchFailed {
            http_status: Some(500),
            ..
        }
    ));
    for user in ["u1", "u2", "u4", "u5"] {
        assert!(store.get_wsl_roster(user, "bells").unwrap().is_some(), "{user}");
    }
    assert!(store.get_wsl_roster("u3", "bells").unwrap().is_none());
}

#[tokio::test]
async fn stop_number_comes_from_contest_when_not_requested() {
    let client = fake_client(None).await;
    let store = seeded_store(&[wsl_participant("u1", "wsl-stop3")]);

    let from_contest = run_wsl_roster_batch(&client, &store, "bells", None).await.unwrap();
    assert_eq!(from_contest.persisted, 1);

    let explicit = run_wsl_roster_batch(&client, &store, "bells", Some(4)).await.unwrap();
    assert_eq!(explicit.failed_fetches, 1);
}

#[tokio::test]
async fn rerun_overwrites_instead_of_duplicating() {
    let client = fake_client(None).await;
    let store = seeded_store(&[wsl_participant("u1", "wsl-1")]);

    run_wsl_roster_batch(&client, &store, "bells", None).await.unwrap();
    let second = run_wsl_roster_batch(&client, &store, "bells", None).await.unwrap();

    assert_eq!(second.persisted, 1);
    assert_eq!(store.contest_standings("bells", LeagueType::Wsl).unwrap().len(), 1);
}

#[tokio::test]
async fn empty_participant_list_is_an_empty_summary() {
    let client = fake_client(None).await;
    let store = seeded_store(&[]);

    let summary = run_wsl_roster_batch(&client, &store, "bells", None).await.unwrap();

    assert_eq!(summary.total_teams, 0);
    assert!(summary.results.is_empty());
}

#[tokio::test]
async fn points_are_stored_for_resolved_athletes() {
    let client = fake_client(None).await;
    let store = seeded_store(&[]);

    let summary = run_wsl_points(&client, &store, "bells", 3).await.unwrap();

    assert!(summary.success);
    assert_eq!(summary.surfers, 3);
    assert_eq!(summary.unresolved, ["Mystery Surfer"]);
    assert_eq!(
        store.get_surfer_points("a-italo", "bells", LeagueType::Wsl).unwrap(),
        Some(12.5)
    );
    assert_eq!(
        store.get_surfer_points("a-jack", "bells", LeagueType::Wsl).unwrap(),
        Some(7.0)
    );
}

#[tokio::test]
async fn client_fetches_and_extracts_a_roster() {
    let client = fake_client(None).await;

    let roster = client.get_wsl_roster("wsl-1", 3).await.unwrap();

    assert_eq!(roster.a.len(), 2);
    assert_eq!(roster.b.len(), 4);
    assert_eq!(roster.c.len(), 2);
    assert_eq!(roster.team_points, Some(88.5));
    assert!(roster.a[1].is_power_surfer);
}

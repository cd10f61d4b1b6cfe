//! Live query replay: snapshot plus deltas equals a fresh list.

use brewline_tests::prelude::*;
use pretty_assertions::assert_eq;

/// Apply queued deltas to a view and compare with a fresh query.
fn assert_converged(session: &Session<'_>, view: &mut LiveView, live: &mut Subscription, filter: Option<Filter>) {
    view.catch_up(live);
    let fresh = session.list("Recipe", filter).unwrap();
    assert_eq!(view.records(), fresh);
}

#[test]
fn test_replay_matches_fresh_query_across_seeds() {
    for seed in [7, 42, 1337, 2024] {
        // GIVEN two authors, some history, and a filtered subscription
        let db = coffee_db();
        let session = db.open_session(API_KEY).unwrap();
        let authors = vec![user(&session, "Ana").id, user(&session, "Bo").id];
        let mut generator = MutationGenerator::new(seed, authors.clone());
        generator.run(&session, 20);

        let filter = Some(Filter::or([
            Filter::eq("drinkType", "Cortado"),
            Filter::begins_with("drinkType", "C"),
            Filter::eq("userId", authors[0].clone()),
        ]));
        let mut live = session.subscribe("Recipe", filter.clone()).unwrap();
        let mut view = LiveView::from_subscription(&live);

        // WHEN more mutations land, checking after every batch
        for _ in 0..10 {
            generator.run(&session, 15);

            // THEN the reconstructed view equals the query result
            assert_converged(&session, &mut view, &mut live, filter.clone());
        }
        assert!(view.seq() <= db.last_seq());
    }
}

#[test]
fn test_unfiltered_replay_tracks_every_recipe() {
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let ana = user(&session, "Ana");
    recipe(&session, &ana.id, "Before");

    let mut live = session.subscribe("Recipe", None).unwrap();
    let mut view = LiveView::from_subscription(&live);
    assert_eq!(view.len(), 1);

    let mut generator = MutationGenerator::new(99, vec![ana.id.clone()]);
    generator.run(&session, 60);

    assert_converged(&session, &mut view, &mut live, None);
    assert_eq!(view.len(), generator.recipes().len() + 1);
}

#[test]
fn test_deltas_arrive_in_commit_order() {
    // GIVEN
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let mut live = session.subscribe("Recipe", None).unwrap();
    let mut generator = MutationGenerator::new(5, Vec::new());

    // WHEN
    generator.run(&session, 40);

    // THEN sequence numbers strictly increase past the snapshot
    let seqs: Vec<u64> = live.drain().iter().map(|c| c.seq.raw()).collect();
    assert!(!seqs.is_empty());
    assert!(seqs[0] > live.snapshot_seq().raw());
    assert!(seqs.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_empty_update_sends_no_delta() {
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let todo = session.create("Todo", fields! { "content" => "grind" }).unwrap();
    let mut live = session.subscribe("Todo", None).unwrap();

    let same = session.update("Todo", &todo.id, Fields::new()).unwrap();

    assert_eq!(same, todo);
    assert!(live.try_next().is_none());
    assert_eq!(db.last_seq().raw(), 1);
}

#[test]
fn test_cancelled_subscription_sees_nothing_more() {
    // GIVEN a subscription with a queued delta
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let mut live = session.subscribe("Todo", None).unwrap();
    session.create("Todo", fields! { "content" => "grind" }).unwrap();

    // WHEN cancelled and more commits land
    live.cancel();
    session.create("Todo", fields! { "content" => "tamp" }).unwrap();

    // THEN
    assert!(live.try_next().is_none());
    assert_eq!(db.live_stats().active, 0);
}

#[tokio::test]
async fn test_subscriber_task_receives_changes() {
    // GIVEN a subscriber running on its own task
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let mut live = session.subscribe("Todo", None).unwrap();
    let reader = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(change) = live.next().await {
            seen.push(change.delta.id().clone());
            if seen.len() == 3 {
                break;
            }
        }
        seen
    });

    // WHEN three todos are created
    let mut created = Vec::new();
    for content in ["grind", "tamp", "pull"] {
        created.push(session.create("Todo", fields! { "content" => content }).unwrap().id);
    }

    // THEN the task sees them in order
    assert_eq!(reader.await.unwrap(), created);
}

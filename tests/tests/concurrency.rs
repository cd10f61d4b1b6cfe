//! Concurrent writers and readers.

use std::thread;

use brewline_tests::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_concurrent_writers_keep_one_commit_order() {
    // GIVEN a subscription and four writer threads
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let ana = user(&session, "Ana");
    let mut live = session.subscribe("Recipe", None).unwrap();
    let mut view = LiveView::from_subscription(&live);

    // WHEN each thread runs its own seeded generator
    thread::scope(|scope| {
        for seed in 0..4u64 {
            let db = &db;
            let author = ana.id.clone();
            scope.spawn(move || {
                let session = db.open_session(API_KEY).unwrap();
                MutationGenerator::new(seed, vec![author]).run(&session, 50);
            });
        }
    });

    // THEN deltas are strictly ordered and replay to the final state
    let changes = live.drain();
    assert!(changes.windows(2).all(|pair| pair[0].seq < pair[1].seq));
    for change in &changes {
        view.apply(change);
    }
    assert_eq!(view.records(), session.list("Recipe", None).unwrap());
}

#[test]
fn test_readers_run_alongside_writers() {
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let ana = user(&session, "Ana");

    thread::scope(|scope| {
        scope.spawn(|| {
            for n in 0..100 {
                recipe(&session, &ana.id, &format!("Recipe {}", n));
            }
        });
        scope.spawn(|| {
            let mut seen = 0;
            while seen < 100 {
                let count = session.has_many("User", &ana.id, "myRecipes").unwrap().len();
                assert!(count >= seen, "derived view went backwards");
                seen = count;
            }
        });
    });

    assert_eq!(session.list("Recipe", None).unwrap().len(), 100);
}

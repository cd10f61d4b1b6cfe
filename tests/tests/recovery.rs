//! Journal recovery and snapshot persistence.

use std::fs::OpenOptions;
use std::io::Write;

use brewline_journal::{replay, FileJournal};
use brewline_store::Store;
use brewline_tests::prelude::*;
use pretty_assertions::assert_eq;
use tracing_subscriber::EnvFilter;

/// Route recovery logs to the test output (`RUST_LOG=brewline_journal=info`).
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_reopen_replays_file_journal() {
    init_tracing();

    // GIVEN a journaled database with some history
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brewline.jsonl");
    let config = DatabaseConfig::new().with_journal(JournalMode::File(path.clone()));
    let (before, seq) = {
        let db = coffee_db_with(config.clone());
        let session = db.open_session(API_KEY).unwrap();
        let ana = user(&session, "Ana");
        let mut generator = MutationGenerator::new(11, vec![ana.id.clone()]);
        generator.run(&session, 50);
        (session.list("Recipe", None).unwrap(), db.last_seq())
    };

    // WHEN the database is reopened from the same file
    let db = coffee_db_with(config);
    let session = db.open_session(API_KEY).unwrap();

    // THEN the recipes and the commit sequence are restored
    assert_eq!(session.list("Recipe", None).unwrap(), before);
    assert_eq!(db.last_seq(), seq);
    assert_eq!(FileJournal::load(&path).unwrap().len() as u64, seq.raw());
}

#[test]
fn test_journal_replays_into_empty_store() {
    // GIVEN a memory-journaled database
    let db = coffee_db_with(DatabaseConfig::new().with_journal(JournalMode::Memory));
    let session = db.open_session(API_KEY).unwrap();
    let ana = user(&session, "Ana");
    let r1 = recipe(&session, &ana.id, "Pour Over");
    session.delete("User", &ana.id).unwrap();

    // WHEN its journal is replayed into an empty store
    let registry = brewline_session::coffee_registry().unwrap();
    let store = Store::new(registry.entity_names(), registry.foreign_keys());
    let stats = replay(db.journal_commits().unwrap(), &registry, &store).unwrap();

    // THEN the orphaned recipe is all that remains
    assert_eq!(stats.records_created, 2);
    assert_eq!(stats.records_deleted, 1);
    assert_eq!(store.scan("Recipe").unwrap(), vec![r1]);
    assert!(store.scan("User").unwrap().is_empty());
}

#[test]
fn test_snapshot_survives_json() {
    // GIVEN a database with a located store and an event
    let source = coffee_db();
    let session = source.open_session(API_KEY).unwrap();
    let shop = session
        .create(
            "Store",
            fields! {
                "name" => "Blue Door",
                "location" => Value::Object(fields! { "lat" => 45.52, "long" => -122.68 }),
                "paymentVerified" => true,
            },
        )
        .unwrap();
    session
        .create(
            "Event",
            fields! { "storeId" => shop.id.clone(), "title" => "Cupping", "startTime" => "2024-06-01T17:00:00Z" },
        )
        .unwrap();

    // WHEN exported to JSON and imported into another database
    let json = serde_json::to_string_pretty(&source.export_snapshot()).unwrap();
    let target = coffee_db();
    target.import_snapshot(serde_json::from_str(&json).unwrap()).unwrap();

    // THEN the copies are identical
    assert_eq!(target.export_snapshot(), source.export_snapshot());
}

#[test]
fn test_reopens_after_torn_journal_write() {
    init_tracing();

    // GIVEN a journal whose last write was cut short by a crash
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brewline.jsonl");
    let config = DatabaseConfig::new().with_journal(JournalMode::File(path.clone()));
    {
        let db = coffee_db_with(config.clone());
        let session = db.open_session(API_KEY).unwrap();
        session.create("Todo", fields! { "content" => "descale" }).unwrap();
    }
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(br#"{"seq":2,"ki"#).unwrap();
    drop(file);

    // WHEN reopened, written to, and reopened again
    {
        let db = coffee_db_with(config.clone());
        let session = db.open_session(API_KEY).unwrap();
        assert_eq!(db.last_seq().raw(), 1);
        session.create("Todo", fields! { "content" => "grind" }).unwrap();
        session.create("Todo", fields! { "content" => "bloom" }).unwrap();
    }
    let db = coffee_db_with(config);
    let session = db.open_session(API_KEY).unwrap();

    // THEN every committed todo survives and the fragment is gone
    let mut contents: Vec<String> = session
        .list("Todo", None)
        .unwrap()
        .iter()
        .filter_map(|t| t.get("content").and_then(Value::as_str).map(str::to_string))
        .collect();
    contents.sort();
    assert_eq!(contents, vec!["bloom", "descale", "grind"]);
    assert_eq!(db.last_seq().raw(), 3);
    assert_eq!(FileJournal::load(&path).unwrap().len(), 3);
}

#[test]
fn test_file_journaled_database_refuses_import() {
    // GIVEN a snapshot holding one todo
    let source = coffee_db();
    let todo = source
        .open_session(API_KEY)
        .unwrap()
        .create("Todo", fields! { "content" => "descale" })
        .unwrap();
    let snapshot = source.export_snapshot();

    // WHEN it is imported into a file-journaled database
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig::new().with_journal(JournalMode::File(dir.path().join("brewline.jsonl")));
    let db = coffee_db_with(config.clone());
    let result = db.import_snapshot(snapshot);

    // THEN the import is refused, so later edits cannot outrun the journal
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Consistency);
    let session = db.open_session(API_KEY).unwrap();
    assert!(session.get("Todo", &todo.id).unwrap().is_none());
    let update = session.update("Todo", &todo.id, fields! { "content" => "grind" });
    assert_eq!(update.unwrap_err().kind(), ErrorKind::NotFound);
    session.create("Todo", fields! { "content" => "bloom" }).unwrap();
    drop(session);
    drop(db);

    // AND the database still reopens from its journal
    let reopened = coffee_db_with(config);
    let todos = reopened.open_session(API_KEY).unwrap().list("Todo", None).unwrap();
    assert_eq!(todos.len(), 1);
}

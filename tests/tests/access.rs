//! API key sessions.

use brewline_tests::prelude::*;
use chrono::{Duration, Utc};

#[test]
fn test_wrong_key_is_unauthorized() {
    let db = coffee_db();

    let result = db.open_session("da2-guess");

    assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
}

#[test]
fn test_key_grants_every_entity() {
    // GIVEN a valid session
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();

    // WHEN every entity type is written and read back
    let ana = user(&session, "Ana");
    let shop = session.create("Store", fields! { "name" => "Blue Door" }).unwrap();
    let payloads = [
        ("Todo", fields! { "content" => "descale" }),
        ("Bean", fields! { "name" => "Huila" }),
        ("Recipe", fields! { "userId" => ana.id.clone() }),
        ("Event", fields! { "storeId" => shop.id.clone() }),
        ("Settings", fields! { "userId" => ana.id.clone() }),
        ("Notification", fields! { "userId" => ana.id.clone() }),
        ("Achievement", fields! { "userId" => ana.id.clone() }),
        ("Transaction", fields! { "userId" => ana.id.clone(), "storeId" => shop.id.clone() }),
    ];

    // THEN nothing is refused
    for (entity, fields) in payloads {
        let record = session.create(entity, fields).unwrap();
        assert!(session.get(entity, &record.id).unwrap().is_some());
        session.delete(entity, &record.id).unwrap();
    }
}

#[test]
fn test_key_expires_after_thirty_days() {
    // GIVEN a key issued just over thirty days ago
    let issued = Utc::now() - Duration::days(30) - Duration::minutes(1);
    let db = coffee_db_with(DatabaseConfig::new().with_api_key_issued_at(issued));

    // WHEN / THEN
    let result = db.open_session(API_KEY);
    assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
}

#[test]
fn test_database_without_key_is_open() {
    let db = Database::coffee(DatabaseConfig::default()).unwrap();
    assert!(db.open_session("").is_ok());
}

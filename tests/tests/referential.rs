//! Foreign keys, derived views and the absence of cascades.

use brewline_tests::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_dangling_foreign_key_is_rejected() {
    // GIVEN an empty database
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();

    // WHEN an event points at a store that does not exist
    let result = session.create("Event", fields! { "storeId" => "store-404", "title" => "Cupping" });

    // THEN
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Referential);
    assert!(session.list("Event", None).unwrap().is_empty());
}

#[test]
fn test_store_events_follow_foreign_key() {
    // GIVEN a store with two events
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let store = session.create("Store", fields! { "name" => "Blue Door" }).unwrap();
    let other = session.create("Store", fields! { "name" => "Red Kettle" }).unwrap();
    let cupping = session
        .create("Event", fields! { "storeId" => store.id.clone(), "title" => "Cupping" })
        .unwrap();
    let latte_art = session
        .create("Event", fields! { "storeId" => store.id.clone(), "title" => "Latte Art" })
        .unwrap();

    // WHEN one event moves to the other store
    session
        .update("Event", &latte_art.id, fields! { "storeId" => other.id.clone() })
        .unwrap();

    // THEN both derived views follow
    assert_eq!(session.has_many("Store", &store.id, "events").unwrap(), vec![cupping]);
    let moved = session.has_many("Store", &other.id, "events").unwrap();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].id, latte_art.id);
}

#[test]
fn test_delete_parent_keeps_children() {
    // GIVEN a user with settings, a notification and an achievement
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let ana = user(&session, "Ana");
    for (entity, field, text) in [
        ("Notification", "message", "New follower"),
        ("Achievement", "description", "First brew"),
    ] {
        session
            .create(entity, fields! { "userId" => ana.id.clone(), field => text })
            .unwrap();
    }
    session
        .create("Settings", fields! { "userId" => ana.id.clone(), "pushNotify" => true })
        .unwrap();

    // WHEN the user is deleted
    session.delete("User", &ana.id).unwrap();

    // THEN every child remains and still points at the deleted id
    for entity in ["Notification", "Achievement", "Settings"] {
        let children = session
            .list(entity, Some(Filter::eq("userId", ana.id.clone())))
            .unwrap();
        assert_eq!(children.len(), 1, "{} was cascaded", entity);
        assert_eq!(session.belongs_to(&children[0], "user").unwrap(), None);
    }
}

#[test]
fn test_required_fields_cannot_be_cleared() {
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let store = session.create("Store", fields! { "name" => "Blue Door" }).unwrap();

    let cleared = session.update("Store", &store.id, fields! { "name" => Value::Null });
    let blank = session.update("Store", &store.id, fields! { "name" => "" });

    assert_eq!(cleared.unwrap_err().kind(), ErrorKind::Validation);
    assert_eq!(blank.unwrap_err().kind(), ErrorKind::Validation);
    assert_eq!(session.get("Store", &store.id).unwrap(), Some(store));
}

#[test]
fn test_two_settings_for_one_user_is_inconsistent() {
    // GIVEN two settings records for one user (nothing enforces uniqueness)
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let ana = user(&session, "Ana");
    for _ in 0..2 {
        session
            .create("Settings", fields! { "userId" => ana.id.clone() })
            .unwrap();
    }

    // WHEN the has-one view is read
    let result = session.has_one("User", &ana.id, "settings");

    // THEN it refuses to pick one
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Consistency);
}

#[test]
fn test_caller_chosen_id_makes_retry_safe() {
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let id = RecordId::new("todo-descale");

    session
        .create_with_id("Todo", id.clone(), fields! { "content" => "descale" })
        .unwrap();
    let retry = session.create_with_id("Todo", id, fields! { "content" => "descale" });

    assert_eq!(retry.unwrap_err().kind(), ErrorKind::Validation);
    assert_eq!(session.list("Todo", None).unwrap().len(), 1);
}

#[test]
fn test_last_write_wins() {
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let todo = session.create("Todo", fields! { "content" => "grind" }).unwrap();

    session.update("Todo", &todo.id, fields! { "content" => "tamp" }).unwrap();
    let last = session.update("Todo", &todo.id, fields! { "content" => "pull" }).unwrap();

    assert_eq!(last.version, 3);
    assert_eq!(
        session.get("Todo", &todo.id).unwrap().unwrap().get("content"),
        Some(&Value::from("pull"))
    );
}

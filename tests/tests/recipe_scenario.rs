//! The recipe lifecycle walkthrough: author, recipe, list, delete author.

use brewline_tests::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_recipe_survives_author_delete() {
    // GIVEN a session and an open Recipe subscription
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let mut live = session.subscribe("Recipe", None).unwrap();
    assert!(live.snapshot().is_empty());

    // WHEN Ana writes a recipe
    let u1 = session
        .create("User", fields! { "firstname" => "Ana", "email" => "a@x.com" })
        .unwrap();
    let r1 = session
        .create("Recipe", fields! { "userId" => u1.id.clone(), "title" => "Pour Over" })
        .unwrap();

    // THEN it is listed under her id
    let by_ana = Some(Filter::eq("userId", u1.id.clone()));
    assert_eq!(session.list("Recipe", by_ana.clone()).unwrap(), vec![r1.clone()]);
    assert_eq!(session.has_many("User", &u1.id, "myRecipes").unwrap(), vec![r1.clone()]);

    // WHEN Ana is deleted
    session.delete("User", &u1.id).unwrap();

    // THEN the recipe stays, keeps its stale author id, and has no author
    assert_eq!(session.list("Recipe", by_ana).unwrap(), vec![r1.clone()]);
    assert_eq!(session.belongs_to(&r1, "author").unwrap(), None);
    assert!(session.get("User", &u1.id).unwrap().is_none());

    // AND the subscriber saw exactly one Added and no Removed
    let changes = live.drain();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].delta, Delta::Added { record: r1 });
}

#[test]
fn test_unknown_drink_type_creates_nothing() {
    // GIVEN
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let ana = user(&session, "Ana");
    let mut live = session.subscribe("Recipe", None).unwrap();

    // WHEN
    let result = session.create(
        "Recipe",
        fields! { "userId" => ana.id.clone(), "drinkType" => "Frappuccino" },
    );

    // THEN
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
    assert!(session.list("Recipe", None).unwrap().is_empty());
    assert!(live.try_next().is_none());
}

#[test]
fn test_recipe_fields_round_trip() {
    // GIVEN a fully populated recipe
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let ana = user(&session, "Ana");
    let bean = session
        .create(
            "Bean",
            fields! { "name" => "Huila", "origin" => vec!["Colombia"], "process" => vec!["Washed"] },
        )
        .unwrap();

    // WHEN
    let recipe = session
        .create(
            "Recipe",
            fields! {
                "userId" => ana.id.clone(),
                "title" => "Morning V60",
                "drinkType" => "Black Coffee",
                "brewMethod" => "Pour Over",
                "coffee" => vec![bean.id.clone()],
                "drinkAdditions" => Vec::<String>::new(),
                "waterTemp" => "94C",
                "brewRatio" => vec!["15", "250"],
                "extractionTime" => "3:00",
            },
        )
        .unwrap();

    // THEN stored values, the creation stamp and the bean reference hold
    let stored = session.get("Recipe", &recipe.id).unwrap().unwrap();
    assert_eq!(stored.get("brewMethod"), Some(&Value::String("Pour Over".into())));
    assert_eq!(stored.get("createdOn"), Some(&Value::DateTime(stored.created_at)));
    assert_eq!(session.resolve_ids(&stored, "coffee", "Bean").unwrap(), vec![bean]);
}

#[test]
fn test_recipes_list_in_creation_order() {
    let db = coffee_db();
    let session = db.open_session(API_KEY).unwrap();
    let ana = user(&session, "Ana");

    let titles = ["Cortado", "Flat White", "Mocha"];
    for (n, title) in titles.iter().enumerate() {
        session
            .create_with_id(
                "Recipe",
                RecordId::new(format!("r{}", n)),
                fields! { "userId" => ana.id.clone(), "title" => *title },
            )
            .unwrap();
    }

    let listed: Vec<Value> = session
        .list("Recipe", None)
        .unwrap()
        .into_iter()
        .filter_map(|r| r.get("title").cloned())
        .collect();
    assert_eq!(listed, titles.iter().map(|t| Value::from(*t)).collect::<Vec<_>>());
}

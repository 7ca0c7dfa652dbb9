mod common;

use fintrack_sdk::models::{NewCategory, DEFAULT_CATEGORIES};
use fintrack_sdk::FinTrackError;

use common::{fixture, other_user_id, seed_category, user_id};

#[test]
fn test_list_is_scoped_and_ordered_by_name() {
    let fx = fixture();
    seed_category(&fx.store, user_id(), "Transport");
    seed_category(&fx.store, user_id(), "food");
    seed_category(&fx.store, other_user_id(), "Alien");

    let names: Vec<String> = fx
        .ft
        .categories()
        .list(user_id())
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["food", "Transport"]);
}

#[test]
fn test_ensure_defaults_seeds_once() {
    let fx = fixture();
    let first = fx.ft.categories().ensure_defaults(user_id()).unwrap();
    assert_eq!(first.len(), DEFAULT_CATEGORIES.len());
    assert!(first.iter().all(|c| c.user_id == user_id()));
    assert!(first.iter().any(|c| c.name == "Food" && c.color.as_deref() == Some("#EF4444")));

    let second = fx.ft.categories().ensure_defaults(user_id()).unwrap();
    assert_eq!(second.len(), DEFAULT_CATEGORIES.len());
    assert_eq!(fx.store.rows("categories").unwrap().len(), DEFAULT_CATEGORIES.len());
}

#[test]
fn test_ensure_defaults_leaves_existing_categories_alone() {
    let fx = fixture();
    seed_category(&fx.store, user_id(), "Rent");
    let cats = fx.ft.categories().ensure_defaults(user_id()).unwrap();
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0].name, "Rent");
}

#[test]
fn test_create_and_get() {
    let fx = fixture();
    let created = fx
        .ft
        .categories()
        .create(&NewCategory::new(user_id(), "  Pets ").with_style("#111111", "🐶"))
        .unwrap();
    assert_eq!(created.name, "Pets");

    let fetched = fx.ft.categories().get(created.id, user_id()).unwrap();
    assert_eq!(fetched, created);
    assert!(matches!(
        fx.ft.categories().get(created.id, other_user_id()),
        Err(FinTrackError::NotFound(_))
    ));
}

#[test]
fn test_create_rejects_blank_name() {
    let fx = fixture();
    let err = fx
        .ft
        .categories()
        .create(&NewCategory::new(user_id(), "   "))
        .unwrap_err();
    assert!(matches!(err, FinTrackError::Validation(_)));
    assert!(fx.store.rows("categories").unwrap().is_empty());
}

#[test]
fn test_default_categories_are_complete() {
    let names: Vec<&str> = DEFAULT_CATEGORIES.iter().map(|d| d.name).collect();
    assert_eq!(
        names,
        vec!["Food", "Transport", "Housing", "Leisure", "Health", "Shopping", "Education", "Other"]
    );
    for d in &DEFAULT_CATEGORIES {
        assert!(d.color.starts_with('#') && d.color.len() == 7, "{}", d.color);
        assert!(!d.icon.is_empty());
    }
}

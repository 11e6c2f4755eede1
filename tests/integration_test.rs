//! Integration tests for bulkform
//!
//! These tests run the bulk form workflow end to end against a temporary
//! sled document store.

use bulkform::{
    actions::{ActionFilter, DELETE_ACTION_ID, DocumentBackend, SET_FIELD_ACTION_ID},
    codec::{self, RowIdentifier},
    commands::{self, import::parse_hits},
    config::BulkConfig,
    db::Database,
    form::ConfigData,
    query::{Listing, RowSource},
    selection::SelectionSet,
    workflow::{Submission, WorkflowController, WorkflowState},
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

/// Store holding `count` articles with ids `0..count`
fn setup_store(count: usize) -> (Arc<Database>, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("index")).unwrap();
    let rows: Vec<RowSource> = (0..count)
        .map(|i| RowSource::new("articles", i.to_string(), json!({ "title": format!("Article {i}") })))
        .collect();
    db.insert_many(&rows).unwrap();
    (Arc::new(db), dir)
}

fn quick_config() -> BulkConfig {
    let mut config = BulkConfig::default();
    config.set("page_size", "10").unwrap();
    config.set("consistency.max_attempts", "1").unwrap();
    config.set("consistency.interval_ms", "0").unwrap();
    config
}

fn backend(db: &Arc<Database>) -> Arc<dyn DocumentBackend> {
    Arc::clone(db) as Arc<dyn DocumentBackend>
}

fn apply(action_id: &str) -> Submission {
    Submission::Apply {
        action_id: action_id.to_string(),
    }
}

#[test]
fn test_tokens_survive_listing_round_trip() {
    let (db, _dir) = setup_store(3);
    let listing = Listing::fetch(&db.query(None), 0, 10).unwrap();

    for entry in &listing.rows {
        let decoded = codec::decode(&entry.token).unwrap();
        assert_eq!(decoded, entry.row.identifier());
    }
}

#[test]
fn test_delete_checked_rows() {
    let (db, _dir) = setup_store(5);
    let config = quick_config();
    let registry = commands::build_registry(&backend(&db), &config).unwrap();
    let query = db.query(Some("articles"));

    let listing = Listing::fetch(&query, 0, config.page_size).unwrap();
    let mut selection = SelectionSet::for_listing(&listing);
    selection.check(listing.rows[1].token.clone());
    selection.check(listing.rows[3].token.clone());

    let controller = WorkflowController::new(&registry, &query);
    let state = controller
        .advance(&WorkflowState::new(selection), apply(DELETE_ACTION_ID))
        .unwrap();

    let outcome = state.outcome().unwrap();
    assert!(outcome.succeeded);
    assert_eq!(outcome.target_count, 2);
    assert_eq!(
        outcome.status_message.as_deref(),
        Some("Action Delete was applied to 2 items.")
    );
    assert_eq!(db.count(), 3);
    assert!(!db.contains(&listing.rows[1].row.identifier()).unwrap());
    assert!(db.contains(&listing.rows[0].row.identifier()).unwrap());
}

#[test]
fn test_delete_across_all_pages() {
    let (db, _dir) = setup_store(25);
    let config = quick_config();
    let registry = commands::build_registry(&backend(&db), &config).unwrap();
    let query = db.query(Some("articles"));

    // only the first page is on screen
    let listing = Listing::fetch(&query, 0, config.page_size).unwrap();
    assert_eq!(listing.rows.len(), 10);
    assert_eq!(listing.page_count(), 3);

    let mut selection = SelectionSet::for_listing(&listing);
    selection.check_page(&listing);
    selection.set_all_pages(true);

    let controller = WorkflowController::new(&registry, &query);
    let state = controller
        .advance(&WorkflowState::new(selection), apply(DELETE_ACTION_ID))
        .unwrap();

    assert_eq!(state.outcome().unwrap().target_count, 25);
    assert_eq!(db.count(), 0);
}

#[test]
fn test_all_pages_respects_index() {
    let (db, _dir) = setup_store(4);
    db.insert(&RowSource::new("pages", "home", json!({ "title": "Home" })))
        .unwrap();
    let config = quick_config();
    let registry = commands::build_registry(&backend(&db), &config).unwrap();
    let query = db.query(Some("articles"));

    let listing = Listing::fetch(&query, 0, config.page_size).unwrap();
    let mut selection = SelectionSet::for_listing(&listing);
    selection.set_all_pages(true);

    let controller = WorkflowController::new(&registry, &query);
    controller
        .advance(&WorkflowState::new(selection), apply(DELETE_ACTION_ID))
        .unwrap();

    assert_eq!(db.count(), 1);
    assert!(db.contains(&RowIdentifier::new("pages", "home")).unwrap());
}

#[test]
fn test_set_field_with_correction() {
    let (db, _dir) = setup_store(3);
    let config = quick_config();
    let registry = commands::build_registry(&backend(&db), &config).unwrap();
    let query = db.query(None);

    let listing = Listing::fetch(&query, 0, config.page_size).unwrap();
    let mut selection = SelectionSet::for_listing(&listing);
    selection.check(listing.rows[0].token.clone());
    let target = listing.rows[0].row.identifier();

    let controller = WorkflowController::new(&registry, &query);
    let state = controller
        .advance(&WorkflowState::new(selection), apply(SET_FIELD_ACTION_ID))
        .unwrap();
    assert!(matches!(state, WorkflowState::ConfiguringAction { .. }));

    let rejected = controller
        .advance(
            &state,
            Submission::Configure {
                input: ConfigData::new().with("field", "meta..status").with("value", "done"),
            },
        )
        .unwrap();
    assert!(rejected.validation_errors().is_some());

    let done = controller
        .advance(
            &rejected,
            Submission::Configure {
                input: ConfigData::new().with("field", "meta.status").with("value", "done"),
            },
        )
        .unwrap();

    assert!(done.outcome().unwrap().succeeded);
    let stored = db.get(&target).unwrap().unwrap();
    assert_eq!(stored.source["meta"]["status"], "done");
    assert_eq!(stored.source["title"], "Article 0");
}

#[test]
fn test_excluded_action_not_offered() {
    let (db, _dir) = setup_store(1);
    let config = quick_config();
    let registry = commands::build_registry(&backend(&db), &config).unwrap();
    let query = db.query(None);

    let controller = WorkflowController::new(&registry, &query)
        .with_filter(ActionFilter::exclude([DELETE_ACTION_ID]));
    let ids: Vec<&str> = controller
        .available_actions()
        .iter()
        .map(|a| a.id.as_str())
        .collect();
    assert_eq!(ids, vec![SET_FIELD_ACTION_ID]);

    let listing = Listing::fetch(&query, 0, 10).unwrap();
    let mut selection = SelectionSet::for_listing(&listing);
    selection.check_page(&listing);
    assert!(controller
        .advance(&WorkflowState::new(selection), apply(DELETE_ACTION_ID))
        .is_err());
    assert_eq!(db.count(), 1);
}

#[test]
fn test_import_then_list() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("index")).unwrap();

    let hits = r#"{"hits": {"hits": [
        {"_index": "articles", "_id": "a", "_source": {"title": "First"}},
        {"_index": "articles", "_id": "b", "_source": {"title": "Second"}}
    ]}}"#;
    let rows = parse_hits(hits, None).unwrap();
    assert_eq!(db.insert_many(&rows).unwrap(), 2);

    let listing = commands::list(&db, &quick_config(), 0, Some("articles"), true).unwrap();
    assert_eq!(listing.total_count, 2);
    assert_eq!(listing.rows[0].row.source["title"], "First");
    assert_eq!(db.list_indices().unwrap(), vec!["articles"]);
}

#[test]
fn test_workflow_state_persists_between_requests() {
    let (db, _dir) = setup_store(2);
    let config = quick_config();
    let registry = commands::build_registry(&backend(&db), &config).unwrap();
    let query = db.query(None);

    let listing = Listing::fetch(&query, 0, 10).unwrap();
    let mut selection = SelectionSet::for_listing(&listing);
    selection.check_page(&listing);

    let controller = WorkflowController::new(&registry, &query);
    let state = controller
        .advance(&WorkflowState::new(selection), apply(SET_FIELD_ACTION_ID))
        .unwrap();

    // the form would be rendered here and the state stored with it
    let stored = serde_json::to_string(&state).unwrap();
    let restored: WorkflowState = serde_json::from_str(&stored).unwrap();

    let done = controller
        .advance(
            &restored,
            Submission::Configure {
                input: ConfigData::new().with("field", "status").with("value", "hidden"),
            },
        )
        .unwrap();
    assert_eq!(done.outcome().unwrap().target_count, 2);
    for entry in &listing.rows {
        let stored = db.get(&entry.row.identifier()).unwrap().unwrap();
        assert_eq!(stored.source["status"], "hidden");
    }
}

//! Integration tests for `taskforest`: the engine driving the `SQLite`
//! store end to end.

use chrono::NaiveDate;
use taskforest::{
    DocumentStore, PartitionKey, Placement, ProjectStore, SqliteStore, TaskTreeEngine, TimeField,
    TransferMode, VERSION,
};

fn date_key(day: u32) -> PartitionKey {
    PartitionKey::Date(NaiveDate::from_ymd_opt(2026, 8, day).unwrap())
}

fn temp_store() -> (tempfile::TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::with_path(dir.path().join("tasks.sqlite3")).unwrap();
    (dir, store)
}

#[test]
fn test_version_exists() {
    assert!(!VERSION.is_empty());
}

#[test]
fn test_edit_save_reload_cycle() {
    let (_dir, store) = temp_store();
    let key = date_key(7);

    let mut engine = TaskTreeEngine::load(&store, key.clone()).unwrap();
    assert!(engine.nodes().is_empty());

    let root = engine.add_root();
    engine.rename(&root, "Prepare release").unwrap();
    let child = engine.add_child(&root).unwrap();
    engine.rename(&child, "Write changelog").unwrap();
    engine.set_metric(&child, TimeField::Estimated, Some(30)).unwrap();
    engine.set_metric(&child, TimeField::Taken, Some(45)).unwrap();
    engine.save(&store).unwrap();

    let reloaded = TaskTreeEngine::load(&store, key).unwrap();
    assert_eq!(reloaded.nodes().len(), 2);
    let metrics = reloaded.metrics().unwrap();
    assert_eq!(metrics[&root].estimated, 30);
    assert_eq!(metrics[&root].taken, 45);
    assert!(!metrics[&root].is_leaf);

    let summary = reloaded.summary().unwrap();
    assert_eq!(summary.node_count, 2);
    assert_eq!(summary.total_estimated, 30);
}

#[test]
fn test_reorder_persists() {
    let (_dir, store) = temp_store();
    let key = date_key(7);

    let mut engine = TaskTreeEngine::new(key.clone());
    let first = engine.add_root();
    let second = engine.add_root();
    engine.reparent(&second, &first, Placement::Before).unwrap();
    engine.save(&store).unwrap();

    let reloaded = TaskTreeEngine::load(&store, key).unwrap();
    let forest = reloaded.forest();
    assert_eq!(forest[0].id(), second);
    assert_eq!(forest[1].id(), first);
}

#[test]
fn test_move_subtree_across_dates() {
    let (_dir, store) = temp_store();
    let source_key = date_key(7);

    let mut engine = TaskTreeEngine::new(source_key.clone());
    let keep = engine.add_root();
    let moved = engine.add_root();
    let moved_child = engine.add_child(&moved).unwrap();
    engine.rename(&moved, "Slipped task").unwrap();
    engine.rename(&moved_child, "Still slipped").unwrap();
    engine.save(&store).unwrap();

    let destination = source_key.next_day().unwrap();
    engine
        .copy_or_move_subtree(&store, &moved, &destination, TransferMode::Move, false)
        .unwrap();
    engine.save(&store).unwrap();

    // Source keeps only the untouched root.
    let source = TaskTreeEngine::load(&store, source_key).unwrap();
    assert_eq!(source.nodes().len(), 1);
    assert_eq!(source.nodes()[0].id, keep);

    // Destination got fresh ids but the same shape and titles.
    let dest = TaskTreeEngine::load(&store, destination).unwrap();
    assert_eq!(dest.nodes().len(), 2);
    assert!(dest.node(&moved).is_none());
    let root = dest.nodes().iter().find(|n| n.is_root()).unwrap();
    assert_eq!(root.title, "Slipped task");
    assert_eq!(root.position, 0);
    let child = dest
        .nodes()
        .iter()
        .find(|n| n.parent_id.as_ref() == Some(&root.id))
        .unwrap();
    assert_eq!(child.title, "Still slipped");
}

#[test]
fn test_copy_project_subtree_to_date_with_reset() {
    let (_dir, store) = temp_store();
    let project = store.create_project("Website Redesign", "").unwrap();
    let project_key = PartitionKey::Project(project.id.clone());

    let mut engine = TaskTreeEngine::new(project_key);
    let root = engine.add_root();
    let child = engine.add_child(&root).unwrap();
    engine.rename(&root, "Ship landing page").unwrap();
    engine.rename(&child, "Fix hero image").unwrap();
    engine.set_completed(&[child.clone()]);
    engine.save(&store).unwrap();

    let today = date_key(7);
    engine
        .copy_or_move_subtree(&store, &root, &today, TransferMode::Copy, true)
        .unwrap();

    // The project still has its completed child.
    assert!(engine.node(&child).unwrap().is_completed);

    // The day's copy starts fresh.
    let day = TaskTreeEngine::load(&store, today).unwrap();
    assert_eq!(day.nodes().len(), 2);
    assert!(day.nodes().iter().all(|n| !n.is_completed));
    assert!(day.nodes().iter().any(|n| n.title == "Fix hero image"));
}

#[test]
fn test_delete_project_drops_its_document() {
    let (_dir, store) = temp_store();
    let project = store.create_project("Scratch", "").unwrap();
    let key = PartitionKey::Project(project.id.clone());

    let mut engine = TaskTreeEngine::new(key.clone());
    engine.add_root();
    engine.save(&store).unwrap();
    assert!(store.fetch_document(&key).unwrap().is_some());

    assert!(store.delete_project(&project.id).unwrap());
    assert!(store.fetch_document(&key).unwrap().is_none());
}

#[test]
fn test_wire_format_round_trips_through_store() {
    let (_dir, store) = temp_store();
    let key = date_key(7);

    let mut engine = TaskTreeEngine::new(key.clone());
    let root = engine.add_root();
    engine.rename(&root, "Exact fields").unwrap();
    engine.set_metric(&root, TimeField::Estimated, Some(15)).unwrap();
    engine.set_collapsed(&root, true).unwrap();
    engine.save(&store).unwrap();

    let fetched = store.fetch_document(&key).unwrap().unwrap();
    let json = serde_json::to_value(&fetched[0]).unwrap();
    let object = json.as_object().unwrap();
    let mut names: Vec<&str> = object.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "id",
            "is_collapsed",
            "is_completed",
            "parent_id",
            "position",
            "time_estimated_minutes",
            "time_taken_minutes",
            "title",
        ]
    );
    assert_eq!(object["title"], "Exact fields");
    assert_eq!(object["is_collapsed"], true);
    assert_eq!(object["time_taken_minutes"], serde_json::Value::Null);
}

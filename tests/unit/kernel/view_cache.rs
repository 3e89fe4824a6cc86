use super::*;
use crate::kernel::services::adapters::MemoryPersist;
use crate::models::DiffSide;

fn workspace() -> Scope {
    Scope::new("/work", None)
}

#[test]
fn test_setters_report_change_and_persist() {
    let mem = Arc::new(MemoryPersist::new());
    let mut view = ViewSession::load(&workspace(), 10, mem.clone());

    assert!(view.set_scroll_top("a.rs", 120.0));
    assert!(!view.set_scroll_top("a.rs", 120.0));
    assert!(view.set_scroll_left("a.rs", 4.0));
    assert_eq!(view.scroll_top("a.rs"), Some(120.0));
    assert_eq!(view.scroll_left("a.rs"), Some(4.0));
    assert_eq!(view.scroll_top("b.rs"), None);

    let reloaded = ViewSession::load(&workspace(), 10, mem.clone());
    assert_eq!(reloaded.scroll_top("a.rs"), Some(120.0));
    assert_eq!(mem.keys(), vec!["/work/file-view".to_string()]);
}

#[test]
fn test_selected_lines_are_normalized_and_clearable() {
    let mem = Arc::new(MemoryPersist::new());
    let mut view = ViewSession::load(&workspace(), 10, mem);

    let upward = SelectedLineRange::new(9, 3).with_sides(Some(DiffSide::Additions), Some(DiffSide::Deletions));
    assert!(view.set_selected_lines("a.rs", Some(upward)));
    let stored = view.selected_lines("a.rs").unwrap();
    assert_eq!((stored.start, stored.end), (3, 9));
    assert_eq!(stored.side, Some(DiffSide::Deletions));
    assert_eq!(stored.end_side, Some(DiffSide::Additions));

    // same range dragged the other way is not a change
    let same = SelectedLineRange::new(3, 9).with_sides(Some(DiffSide::Deletions), Some(DiffSide::Additions));
    assert!(!view.set_selected_lines("a.rs", Some(same)));

    assert!(view.set_selected_lines("a.rs", None));
    assert!(view.selected_lines("a.rs").is_none());
    assert!(!view.set_selected_lines("a.rs", None));
}

#[test]
fn test_prune_drops_oldest_but_keeps_current_path() {
    let mem = Arc::new(MemoryPersist::new());
    let mut view = ViewSession::load(&workspace(), 2, mem);
    view.set_scroll_top("a", 1.0);
    view.set_scroll_top("b", 1.0);
    view.set_scroll_top("c", 1.0);
    assert_eq!(view.paths().collect::<Vec<_>>(), vec!["b", "c"]);

    // updating an existing path keeps its slot
    view.set_scroll_top("b", 2.0);
    assert_eq!(view.paths().collect::<Vec<_>>(), vec!["b", "c"]);
}

#[test]
fn test_prune_once_after_load() {
    let mem = Arc::new(MemoryPersist::new());
    mem.set(
        "/work/file.v1",
        r#"{"file":{"a":{"scrollTop":1},"b":{"scrollTop":2},"c":{"scrollTop":3}}}"#,
    )
    .unwrap();

    let view = ViewSession::load(&workspace(), 2, mem.clone());
    assert_eq!(view.len(), 2);
    assert_eq!(view.scroll_top("a"), None);
    assert_eq!(view.scroll_top("c"), Some(3.0));
    // pruned result goes to the canonical key
    assert!(mem.get("/work/file-view").unwrap().is_some());
}

#[test]
fn test_session_scope_uses_session_keys() {
    let mem = Arc::new(MemoryPersist::new());
    mem.set("/work/file/ses_1.v1", r#"{"file":{"x":{"scrollLeft":7}}}"#)
        .unwrap();
    let scope = Scope::new("/work", Some("ses_1".to_string()));
    let mut view = ViewSession::load(&scope, 10, mem.clone());
    assert_eq!(view.scroll_left("x"), Some(7.0));

    view.set_scroll_left("x", 8.0);
    assert!(mem.get("/work/ses_1/file-view").unwrap().is_some());
}

#[test]
fn test_cache_bounds_sessions() {
    let mem = Arc::new(MemoryPersist::new());
    let mut cache = FileViewCache::new(2, 10, mem);
    cache.load(&Scope::new("/a", None)).set_scroll_top("f", 1.0);
    cache.load(&Scope::new("/b", None));
    cache.load(&Scope::new("/c", None));
    assert_eq!(cache.len(), 2);

    // evicted session reloads from persistence
    assert_eq!(cache.load(&Scope::new("/a", None)).scroll_top("f"), Some(1.0));
}

#[test]
fn test_noop_on_untracked_path_keeps_existing_entries() {
    let mem = Arc::new(MemoryPersist::new());
    let mut view = ViewSession::load(&workspace(), 2, mem.clone());
    assert!(view.set_scroll_top("a.rs", 1.0));
    assert!(view.set_scroll_top("b.rs", 2.0));

    assert!(!view.set_selected_lines("c.rs", None));
    assert!(view.state("c.rs").is_none());
    assert_eq!(view.paths().collect::<Vec<_>>(), vec!["a.rs", "b.rs"]);

    let reloaded = ViewSession::load(&workspace(), 2, mem);
    assert_eq!(reloaded.scroll_top("a.rs"), Some(1.0));
}

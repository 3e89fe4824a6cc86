use super::*;
use crate::models::NodeKind;

fn ctx() -> FileContext {
    FileContext::new("/work", 40, 1024)
}

fn node(path: &str, kind: NodeKind) -> FileNode {
    FileNode {
        name: file_name(path).to_string(),
        path: path.to_string(),
        kind,
        ignored: false,
    }
}

fn read_effect(path: &str) -> Effect {
    Effect::ReadFile {
        directory: "/work".to_string(),
        path: path.to_string(),
    }
}

fn list_effect(path: &str) -> Effect {
    Effect::ListDir {
        directory: "/work".to_string(),
        path: path.to_string(),
    }
}

#[test]
fn test_load_normalizes_and_coalesces() {
    let mut files = ctx();
    assert_eq!(files.load("file:///work/src/a.rs", false), Some(read_effect("src/a.rs")));
    assert_eq!(files.load("src/a.rs", false), None);
    assert_eq!(files.load("./src/a.rs", true), None);
    assert!(files.file("src/a.rs").unwrap().loading);
    assert_eq!(files.file("src/a.rs").unwrap().name, "a.rs");
}

#[test]
fn test_load_skips_loaded_unless_forced() {
    let mut files = ctx();
    files.load("a.rs", false);
    files.apply_read("/work", "a.rs", Ok("fn main() {}".to_string()));

    assert_eq!(files.load("a.rs", false), None);
    assert_eq!(files.load("a.rs", true), Some(read_effect("a.rs")));
}

#[test]
fn test_read_result_for_old_scope_is_discarded() {
    let mut files = ctx();
    files.load("a.rs", false);
    assert!(files.set_directory("/other"));

    let (changed, effects) = files.apply_read("/work", "a.rs", Ok("stale".to_string()));
    assert!(!changed);
    assert!(effects.is_empty());
    assert!(files.file("a.rs").is_none());
    assert!(files.lru().is_empty());
}

#[test]
fn test_read_error_keeps_previous_content_and_toasts() {
    let mut files = ctx();
    files.load("a.rs", false);
    files.apply_read("/work", "a.rs", Ok("old".to_string()));
    files.load("a.rs", true);

    let (_, effects) = files.apply_read("/work", "a.rs", Err("boom".to_string()));
    assert!(matches!(&effects[..], [Effect::Toast { message, .. }] if message == "boom"));
    let state = files.file("a.rs").unwrap();
    assert_eq!(state.content.as_deref(), Some("old"));
    assert_eq!(state.error.as_deref(), Some("boom"));
    assert!(!state.loading);
    assert!(!files.is_inflight("a.rs"));
}

#[test]
fn test_content_budget_evicts_oldest_but_not_just_loaded() {
    let mut files = FileContext::new("/work", 40, 150);
    files.load("a.rs", false);
    files.apply_read("/work", "a.rs", Ok("x".repeat(100)));
    files.load("b.rs", false);
    files.apply_read("/work", "b.rs", Ok("y".repeat(100)));

    let a = files.file("a.rs").unwrap();
    assert!(a.content.is_none());
    assert!(!a.loaded);
    assert!(files.file("b.rs").unwrap().content.is_some());
    assert_eq!(files.lru().total_bytes(), 100);

    // evicted content reloads on demand
    assert_eq!(files.load("a.rs", false), Some(read_effect("a.rs")));
}

#[test]
fn test_listing_populates_tree_and_reports_errors() {
    let mut files = ctx();
    assert_eq!(files.list_dir("/work", false), Some(list_effect("")));
    assert_eq!(files.list_dir("", false), None);

    files.apply_listing(
        "/work",
        "",
        Ok(vec![node("/work/src", NodeKind::Directory), node("README.md", NodeKind::File)]),
    );
    let names: Vec<_> = files.children("").iter().map(|n| n.path.clone()).collect();
    assert_eq!(names, vec!["src", "README.md"]);

    files.list_dir("src/", false);
    let (_, effects) = files.apply_listing("/work", "src", Err("denied".to_string()));
    assert_eq!(effects.len(), 1);
    assert_eq!(files.dir_state("src").unwrap().error.as_deref(), Some("denied"));
}

#[test]
fn test_toggle_requests_listing_once() {
    let mut files = ctx();
    let (changed, effect) = files.toggle_dir("src");
    assert!(changed);
    assert_eq!(effect, Some(list_effect("src")));
    files.apply_listing("/work", "src", Ok(Vec::new()));

    assert_eq!(files.toggle_dir("src"), (true, None));
    assert_eq!(files.toggle_dir("src"), (true, None));
    assert!(files.dir_state("src").unwrap().expanded);
}

fn loaded_workspace() -> FileContext {
    let mut files = ctx();
    files.list_dir("", false);
    files.apply_listing(
        "/work",
        "",
        Ok(vec![node("src", NodeKind::Directory), node("README.md", NodeKind::File)]),
    );
    files.list_dir("src", false);
    files.apply_listing("/work", "src", Ok(vec![node("src/a.rs", NodeKind::File)]));
    files.load("src/a.rs", false);
    files.apply_read("/work", "src/a.rs", Ok("a".to_string()));
    files
}

#[test]
fn test_watcher_change_reloads_known_file() {
    let mut files = loaded_workspace();
    let effects = files.invalidate_from_watcher(&WatchEvent {
        file: "/work/src/a.rs".to_string(),
        event: WatchKind::Change,
    });
    assert_eq!(effects, vec![read_effect("src/a.rs")]);
}

#[test]
fn test_watcher_add_refreshes_loaded_parent() {
    let mut files = loaded_workspace();
    let effects = files.invalidate_from_watcher(&WatchEvent {
        file: "/work/src/b.rs".to_string(),
        event: WatchKind::Add,
    });
    assert_eq!(effects, vec![list_effect("src")]);
}

#[test]
fn test_watcher_unlink_of_known_file_reloads_and_refreshes() {
    let mut files = loaded_workspace();
    let effects = files.invalidate_from_watcher(&WatchEvent {
        file: "src/a.rs".to_string(),
        event: WatchKind::Unlink,
    });
    assert_eq!(effects, vec![read_effect("src/a.rs"), list_effect("src")]);
}

#[test]
fn test_watcher_change_on_loaded_dir_relists_it() {
    let mut files = loaded_workspace();
    let effects = files.invalidate_from_watcher(&WatchEvent {
        file: "/work/src".to_string(),
        event: WatchKind::Change,
    });
    assert_eq!(effects, vec![list_effect("src")]);
}

#[test]
fn test_watcher_ignores_git_and_unloaded_dirs() {
    let mut files = loaded_workspace();
    assert!(files
        .invalidate_from_watcher(&WatchEvent {
            file: "/work/.git/index".to_string(),
            event: WatchKind::Change,
        })
        .is_empty());
    assert!(files
        .invalidate_from_watcher(&WatchEvent {
            file: "/work/docs/guide.md".to_string(),
            event: WatchKind::Add,
        })
        .is_empty());
}

#[test]
fn test_touch_skips_empty_content() {
    let mut files = ctx();
    files.load("empty.txt", false);
    files.apply_read("/work", "empty.txt", Ok(String::new()));
    assert!(files.file("empty.txt").unwrap().loaded);

    assert!(!files.touch("empty.txt"));
    assert!(!files.lru().contains("empty.txt"));
    assert_eq!(files.lru().len(), 0);
}

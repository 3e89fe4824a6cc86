use super::*;

#[test]
fn normalizes_file_inputs_against_workspace_root() {
    let path = PathHelpers::new("/repo");
    assert_eq!(path.normalize("file:///repo/src/app.ts?x=1#h"), "src/app.ts");
    assert_eq!(path.normalize("/repo/src/app.ts"), "src/app.ts");
    assert_eq!(path.normalize("./src/app.ts"), "src/app.ts");
    assert_eq!(path.normalize("/repo"), "");
    assert_eq!(path.normalize_dir("src/components///"), "src/components");
    assert_eq!(path.tab("src/app.ts"), "file://src/app.ts");
    assert_eq!(path.path_from_tab("file://src/app.ts").as_deref(), Some("src/app.ts"));
    assert_eq!(path.path_from_tab("other://src/app.ts"), None);
}

#[test]
fn root_prefix_match_respects_component_boundary() {
    let path = PathHelpers::new("/repo");
    assert_eq!(path.normalize("/repository/a.ts"), "repository/a.ts");
}

#[test]
fn strips_query_and_hash_in_either_order() {
    assert_eq!(strip_query_and_hash("a/b.ts#L12?x=1"), "a/b.ts");
    assert_eq!(strip_query_and_hash("a/b.ts?x=1#L12"), "a/b.ts");
    assert_eq!(strip_query_and_hash("a/b.ts"), "a/b.ts");
}

#[test]
fn unquotes_git_escaped_octal_paths() {
    assert_eq!(unquote_git_path("\"a/\\303\\251.txt\""), "a/\u{e9}.txt");
    assert_eq!(unquote_git_path("\"plain\\nname\""), "plain\nname");
    assert_eq!(unquote_git_path("\"quote\\\"d\""), "quote\"d");
    assert_eq!(unquote_git_path("a/b/c.ts"), "a/b/c.ts");
}

#[test]
fn parent_and_file_name() {
    assert_eq!(parent_dir("src/app.ts"), "src");
    assert_eq!(parent_dir("app.ts"), "");
    assert_eq!(file_name("src/app.ts"), "app.ts");
    assert_eq!(file_name("src/"), "src");
}

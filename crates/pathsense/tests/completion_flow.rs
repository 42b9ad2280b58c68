//! Integration tests for the path completion flow.
//!
//! These tests exercise the full request pipeline — configuration parsing,
//! quote gating, fragment extraction, directory resolution, listing and
//! candidate building — against real temporary directories.
//!
//! Run with: `cargo test -p pathsense --test completion_flow`

use std::path::Path;

use pathsense::candidates::{to_completion_item, Candidate};
use pathsense::config::{parse_config, Config};
use pathsense::lister::FsDirectoryLister;
use pathsense::provider::{provide_completions, RequestContext};
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

/// Build a workspace layout:
///
/// ```text
/// <root>/
///   src/
///     main.js
///     util.js
///     a.test.js
///     components/
///   assets/
///   node_modules/
///     lodash/
/// ```
fn make_workspace() -> TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(root.join("src/components")).unwrap();
    std::fs::create_dir_all(root.join("assets")).unwrap();
    std::fs::create_dir_all(root.join("node_modules/lodash")).unwrap();
    std::fs::write(root.join("src/main.js"), "").unwrap();
    std::fs::write(root.join("src/util.js"), "").unwrap();
    std::fs::write(root.join("src/a.test.js"), "").unwrap();
    tmp
}

fn request(line: &str, current_file: &Path, root: &Path) -> RequestContext {
    RequestContext {
        line_text: line.to_string(),
        cursor_offset: line.chars().count(),
        current_file_path: current_file.to_path_buf(),
        workspace_root: Some(root.to_path_buf()),
    }
}

async fn complete(line: &str, current_file: &Path, root: &Path, config: &Config) -> Vec<Candidate> {
    provide_completions(&request(line, current_file, root), config, &FsDirectoryLister)
        .await
        .unwrap()
}

fn names(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.display_name.as_str()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn relative_fragment_lists_sibling_directory() {
    let ws = make_workspace();
    let main = ws.path().join("src/main.js");

    let candidates = complete("import './", &main, ws.path(), &Config::default()).await;

    let labels = names(&candidates);
    assert_eq!(labels[0], "..");
    assert!(labels.contains(&"components/"));
    assert!(labels.contains(&"util.js"));
    // directories precede files after the leading ".."
    let dir_pos = labels.iter().position(|n| *n == "components/").unwrap();
    let file_pos = labels.iter().position(|n| *n == "util.js").unwrap();
    assert!(dir_pos < file_pos);
}

#[tokio::test]
async fn workspace_rooted_fragment_lists_root_subdirectory() {
    let ws = make_workspace();
    let main = ws.path().join("src/main.js");

    let candidates = complete("url(\"/assets/", &main, ws.path(), &Config::default()).await;
    assert_eq!(names(&candidates), vec![".."]);

    let candidates = complete("url(\"/", &main, ws.path(), &Config::default()).await;
    let labels = names(&candidates);
    assert!(labels.contains(&"assets/"));
    assert!(labels.contains(&"src/"));
}

#[tokio::test]
async fn package_import_lists_package_directory() {
    let ws = make_workspace();
    let main = ws.path().join("src/main.js");

    std::fs::write(ws.path().join("node_modules/lodash/fp.js"), "").unwrap();

    let candidates = complete("import _ from 'lodash", &main, ws.path(), &Config::default()).await;
    // listing of <root>/node_modules/lodash
    assert!(names(&candidates).contains(&"fp.js"));

    let candidates = complete("import _ from 'lodash/", &main, ws.path(), &Config::default()).await;
    assert!(names(&candidates).contains(&"fp.js"));
}

#[tokio::test]
async fn path_mapping_resolves_through_workspace_placeholder() {
    let ws = make_workspace();
    let main = ws.path().join("src/main.js");
    let config = parse_config(&json!({
        "pathsense": {
            "pathMappings": { "@/": "${workspace}/src" }
        }
    }))
    .unwrap();

    let candidates = complete("import '@/", &main, ws.path(), &config).await;
    let labels = names(&candidates);
    assert!(labels.contains(&"components/"));
    assert!(labels.contains(&"main.js"));
}

#[tokio::test]
async fn full_configuration_pipeline() {
    let ws = make_workspace();
    let main = ws.path().join("src/main.js");
    let config = parse_config(&json!({
        "pathsense": {
            "extensionOnImport": false,
            "enableFolderTrailingSlash": true,
            "excludedItems": {
                "**/*.test.js": { "when": "**/src/**" }
            },
            "transformations": [
                { "type": "replace", "parameters": ["^util$", "utilities"] }
            ]
        }
    }))
    .unwrap();

    let candidates = complete("import './", &main, ws.path(), &config).await;
    let labels = names(&candidates);

    // excluded while editing a file under src/
    assert!(!labels.contains(&"a.test.js"));

    // transformed insert text, extension already stripped
    let util = candidates
        .iter()
        .find(|c| c.display_name == "util.js")
        .unwrap();
    assert_eq!(util.insert_text, "utilities");

    // directory candidates request a follow-up trigger
    let dir = candidates
        .iter()
        .find(|c| c.display_name == "components/")
        .unwrap();
    assert!(dir.trigger_follow_up);
    let item = to_completion_item(dir, 1);
    assert_eq!(
        item.command.map(|c| c.command),
        Some(String::from("editor.action.triggerSuggest"))
    );
}

#[tokio::test]
async fn gate_blocks_unquoted_line_and_missing_directory() {
    let ws = make_workspace();
    let main = ws.path().join("src/main.js");

    // not inside a string literal
    let candidates = complete("import ./", &main, ws.path(), &Config::default()).await;
    assert!(candidates.is_empty());

    // quoted, but the target directory does not exist
    let candidates = complete("import './nope/", &main, ws.path(), &Config::default()).await;
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn repeated_requests_are_independent() {
    let ws = make_workspace();
    let main = ws.path().join("src/main.js");
    let config = Config::default();

    let first = complete("import './", &main, ws.path(), &config).await;
    let second = complete("import './", &main, ws.path(), &config).await;
    assert_eq!(first, second);
}

//
// directory_resolver.rs
//
// Resolution of a typed path fragment to the directory that should be listed
//
// Combines the path-mapping result, home-directory shortcut, drive-absolute
// paths, workspace-root-relative paths and package-directory lookup into one
// absolute directory path. Rules are mutually exclusive and evaluated in a
// fixed order; a matched path mapping pre-empts the drive, tilde and package
// rules.
//

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::config::Config;
use crate::path_mapping::apply_mapping;

/// Directory holding installed packages, looked up by walking ancestors.
const PACKAGE_DIR_NAME: &str = "node_modules";

fn drive_letter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z]:").unwrap())
}

/// Resolve the directory referenced by `fragment`.
///
/// Rule order, first match wins:
/// 1. a matched path mapping: join its resolved base with the stripped
///    remainder (pre-empts rules 2-4, even for keys like `~` that would
///    otherwise hit the home rule);
/// 2. drive-letter-absolute fragments (`C:...`) resolve as-is;
/// 3. `~`-prefixed fragments join onto the configured home directory;
/// 4. package import specifiers (the line mentions `require` or `import`
///    and the fragment starts with an ASCII letter) join onto the nearest
///    ancestor package directory of the current file;
/// 5. everything else joins onto the workspace root (fragment starts with
///    `/` and a root is known) or the current file's parent directory.
///
/// Returns `None` only when the package rule finds no package directory and
/// no workspace root is known to fall back to; the caller treats that as an
/// empty completion result.
pub fn resolve_directory(
    fragment: &str,
    line_text: &str,
    current_file: &Path,
    workspace_root: Option<&Path>,
    config: &Config,
) -> Option<PathBuf> {
    let workspace_str = workspace_root.and_then(|p| p.to_str());
    let mapping = apply_mapping(fragment, config, workspace_str);

    if let Some(base) = &mapping.resolved_base_directory {
        return Some(join_normalized(Path::new(base), &mapping.remaining_path));
    }

    // relative to the disk
    if drive_letter_pattern().is_match(fragment) {
        return Some(join_normalized(Path::new(fragment), ""));
    }

    // user folder
    if let Some(rest) = fragment.strip_prefix('~') {
        return Some(join_normalized(
            Path::new(&config.home_directory),
            rest,
        ));
    }

    // package import
    if is_package_import(fragment, line_text) {
        let start_dir = current_file.parent().unwrap_or(Path::new("/"));
        let package_root = find_package_root(start_dir, workspace_root)?;
        return Some(join_normalized(&package_root, fragment));
    }

    let base = match workspace_root {
        Some(root) if fragment.starts_with('/') => root.to_path_buf(),
        _ => current_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/")),
    };

    Some(join_normalized(&base, fragment))
}

/// A fragment counts as a package import when the current line mentions
/// `require` or `import` and the fragment starts with an ASCII letter.
fn is_package_import(fragment: &str, line_text: &str) -> bool {
    if !line_text.contains("require") && !line_text.contains("import") {
        return false;
    }
    fragment
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
}

/// Walk upward from `start_dir` looking for a package directory, stopping
/// when the parent equals the directory itself. Falls back to
/// `<workspace_root>/node_modules` when no ancestor has one.
fn find_package_root(start_dir: &Path, workspace_root: Option<&Path>) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        let candidate = dir.join(PACKAGE_DIR_NAME);
        if candidate.exists() {
            log::trace!("find_package_root: found {:?}", candidate);
            return Some(candidate);
        }
        match dir.parent() {
            Some(parent) if parent != dir => dir = parent,
            _ => break,
        }
    }
    workspace_root.map(|root| root.join(PACKAGE_DIR_NAME))
}

/// Join `fragment` onto `base` lexically: `.` components are dropped, `..`
/// pops, and a leading separator on the fragment is ignored so the join
/// never escapes the chosen base onto a different root.
fn join_normalized(base: &Path, fragment: &str) -> PathBuf {
    let mut out = PathBuf::new();
    for component in base.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    for component in Path::new(fragment).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

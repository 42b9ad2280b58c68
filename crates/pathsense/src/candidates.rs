//
// candidates.rs
//
// Turning a raw directory listing into ordered completion candidates
//
// Applies the configured exclusion rules, computes display and insert text,
// runs the insert-text transformations, sorts directories before files and
// prepends the literal ".." candidate.
//

use std::path::Path;

use tower_lsp::lsp_types::{Command, CompletionItem, CompletionItemKind};

use crate::config::Config;
use crate::lister::RawEntry;

/// Two-way sort classification determining candidate ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBucket {
    Directory,
    File,
}

/// An abstract completion candidate, independent of the host protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub display_name: String,
    pub insert_text: String,
    pub is_directory: bool,
    pub sort_bucket: SortBucket,
    /// Re-open completion right after inserting this candidate (directories
    /// only, gated by `enableFolderTrailingSlash`)
    pub trigger_follow_up: bool,
}

/// Build the ordered candidate list for a raw directory listing.
///
/// Within each bucket the original listing order is preserved. The leading
/// `..` candidate is always present and first, untouched by exclusion rules
/// and transformations.
pub fn build_candidates(entries: &[RawEntry], config: &Config, current_file: &Path) -> Vec<Candidate> {
    let mut directories = Vec::new();
    let mut files = Vec::new();

    for entry in entries {
        if is_excluded(entry, config, current_file) {
            continue;
        }

        let base_name = entry.base_name();
        let display_name = if entry.is_directory {
            format!("{}/", base_name)
        } else {
            base_name.clone()
        };
        let insert_text = transform_insert_text(compute_insert_text(entry, config), &base_name, config);

        let candidate = Candidate {
            display_name,
            insert_text,
            is_directory: entry.is_directory,
            sort_bucket: if entry.is_directory {
                SortBucket::Directory
            } else {
                SortBucket::File
            },
            trigger_follow_up: entry.is_directory && config.enable_folder_trailing_slash,
        };

        if entry.is_directory {
            directories.push(candidate);
        } else {
            files.push(candidate);
        }
    }

    let mut result = Vec::with_capacity(directories.len() + files.len() + 1);
    result.push(up_one_directory_candidate());
    result.extend(directories);
    result.extend(files);
    result
}

/// The unconditional "go up one directory" affordance.
fn up_one_directory_candidate() -> Candidate {
    Candidate {
        display_name: String::from(".."),
        insert_text: String::from(".."),
        is_directory: false,
        sort_bucket: SortBucket::File,
        trigger_follow_up: false,
    }
}

/// An entry is excluded when any configured rule matches both the current
/// file (`when` glob) and the entry's absolute path (item glob). Rules are
/// independent; one match suffices.
fn is_excluded(entry: &RawEntry, config: &Config, current_file: &Path) -> bool {
    config.excluded_items.iter().any(|rule| {
        rule.when.matches_path(current_file) && rule.item.matches_path(&entry.absolute_path)
    })
}

/// Insert text before transformation: the base name, with the extension
/// stripped for files unless `extensionOnImport` is set.
fn compute_insert_text(entry: &RawEntry, config: &Config) -> String {
    if config.with_extension_on_insert || entry.is_directory {
        return entry.base_name();
    }
    entry
        .absolute_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| entry.base_name())
}

/// Run the configured transformations over the insert text, in order. A
/// transformation fires only when it has no file-name condition or the
/// entry's base name matches it; each firing performs a single regex
/// substitution.
fn transform_insert_text(insert_text: String, base_name: &str, config: &Config) -> String {
    let mut text = insert_text;
    for transform in &config.transformations {
        if let Some(condition) = &transform.when_file_name {
            if !condition.is_match(base_name) {
                continue;
            }
        }
        text = transform
            .pattern
            .replace(&text, transform.replacement.as_str())
            .into_owned();
    }
    text
}

/// Map a candidate to an LSP completion item.
///
/// Labels carry the trailing `/` for directories; sort_text encodes the
/// bucket order (`..` first, then directories, then files). Directory items
/// re-trigger completion through the standard editor command when requested.
pub fn to_completion_item(candidate: &Candidate, index: usize) -> CompletionItem {
    let sort_text = if candidate.display_name == ".." && index == 0 {
        String::from("0")
    } else {
        match candidate.sort_bucket {
            SortBucket::Directory => format!("1{}", candidate.display_name),
            SortBucket::File => format!("2{}", candidate.display_name),
        }
    };

    let command = if candidate.trigger_follow_up {
        Some(Command {
            title: String::from("Trigger Suggest"),
            command: String::from("editor.action.triggerSuggest"),
            arguments: None,
        })
    } else {
        None
    };

    CompletionItem {
        label: candidate.display_name.clone(),
        kind: Some(if candidate.is_directory {
            CompletionItemKind::FOLDER
        } else {
            CompletionItemKind::FILE
        }),
        insert_text: Some(candidate.insert_text.clone()),
        sort_text: Some(sort_text),
        command,
        ..Default::default()
    }
}

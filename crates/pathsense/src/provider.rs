//
// provider.rs
//
// Per-request orchestration of the path completion engine
//
// A request is stateless: it reads one Config snapshot and one
// RequestContext, performs a single directory listing through the injected
// DirectoryLister, and produces the candidate list. Overlapping requests do
// not interact.
//

use std::path::PathBuf;

use anyhow::Context as _;

use crate::candidates::{build_candidates, Candidate};
use crate::config::Config;
use crate::directory_resolver::resolve_directory;
use crate::line_scan::{extract_user_fragment, is_inside_quoted_region};
use crate::lister::DirectoryLister;

/// Everything a single completion trigger needs, captured at request entry.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The full text of the line under the cursor
    pub line_text: String,
    /// Cursor position as a character offset into `line_text`
    pub cursor_offset: usize,
    /// Absolute path of the file being edited
    pub current_file_path: PathBuf,
    /// Workspace root, when one is known
    pub workspace_root: Option<PathBuf>,
}

/// Produce the ordered completion candidates for one trigger.
///
/// Returns an empty list (not an error) when the quote-state gate says no or
/// the resolved target is not an existing directory. A listing failure on
/// the directory itself propagates as an error for this request only.
pub async fn provide_completions(
    ctx: &RequestContext,
    config: &Config,
    lister: &dyn DirectoryLister,
) -> anyhow::Result<Vec<Candidate>> {
    if !should_provide(ctx, config) {
        log::trace!("provide_completions: cursor not inside a string, skipping");
        return Ok(Vec::new());
    }

    let fragment = extract_user_fragment(&ctx.line_text, ctx.cursor_offset);
    let Some(directory) = resolve_directory(
        &fragment,
        &ctx.line_text,
        &ctx.current_file_path,
        ctx.workspace_root.as_deref(),
        config,
    ) else {
        log::trace!("provide_completions: no directory for fragment '{}'", fragment);
        return Ok(Vec::new());
    };

    match tokio::fs::metadata(&directory).await {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            log::trace!("provide_completions: {:?} is not a directory", directory);
            return Ok(Vec::new());
        }
    }

    let entries = lister
        .list(&directory)
        .await
        .with_context(|| format!("failed to list {}", directory.display()))?;

    log::trace!(
        "provide_completions: fragment '{}' -> {:?}, {} entries",
        fragment,
        directory,
        entries.len()
    );

    Ok(build_candidates(&entries, config, &ctx.current_file_path))
}

/// The quote-state gate: completion proceeds when the cursor sits inside an
/// open string literal, or unconditionally when configured to trigger
/// outside strings.
fn should_provide(ctx: &RequestContext, config: &Config) -> bool {
    if config.trigger_outside_strings {
        return true;
    }
    is_inside_quoted_region(&ctx.line_text, ctx.cursor_offset)
}

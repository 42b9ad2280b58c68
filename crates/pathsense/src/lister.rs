//
// lister.rs
//
// Directory listing capability
//
// The resolution engine only depends on the DirectoryLister trait; the
// filesystem-backed implementation lives here so tests can substitute a
// fixed listing.
//

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// A single directory entry as returned by the lister.
///
/// Construction is fallible at the lister level: an entry whose file type
/// cannot be determined (broken symlink, permission denied) is dropped from
/// the listing rather than failing the whole request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub absolute_path: PathBuf,
    pub is_directory: bool,
}

impl RawEntry {
    /// The entry's base name. Lossy conversion is acceptable here because
    /// the name is only displayed and inserted as text.
    pub fn base_name(&self) -> String {
        self.absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Capability to list a directory.
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    /// List the entries of `path`. Fails when the directory itself cannot be
    /// read; per-entry failures are silently dropped.
    async fn list(&self, path: &Path) -> io::Result<Vec<RawEntry>>;
}

/// Filesystem-backed lister. Directory reads run on the blocking pool so
/// the async completion request is not stalled by slow disks.
pub struct FsDirectoryLister;

#[async_trait]
impl DirectoryLister for FsDirectoryLister {
    async fn list(&self, path: &Path) -> io::Result<Vec<RawEntry>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || list_blocking(&path))
            .await
            .map_err(|e| io::Error::other(e))?
    }
}

fn list_blocking(path: &Path) -> io::Result<Vec<RawEntry>> {
    let mut entries = Vec::new();
    for entry_result in std::fs::read_dir(path)? {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::trace!("Failed to read directory entry in {:?}: {}", path, e);
                continue;
            }
        };
        let is_directory = match entry.file_type() {
            Ok(file_type) => file_type.is_dir(),
            Err(e) => {
                // broken symlink or permission failure on the entry itself
                log::trace!("Failed to stat {:?}: {}", entry.path(), e);
                continue;
            }
        };
        entries.push(RawEntry {
            absolute_path: entry.path(),
            is_directory,
        });
    }
    Ok(entries)
}

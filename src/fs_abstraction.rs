//! Filesystem abstraction layer for testability
//!
//! The hosts-file manager only touches the disk through the [`FileSystem`]
//! trait, so tests can check call order and failure handling with a
//! `mockall` mock instead of the real filesystem.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

#[cfg(test)]
use mockall::automock;

/// Trait abstracting the filesystem operations the hosts-file manager needs.
///
/// # Example (testing)
/// ```ignore
/// use adless::fs_abstraction::MockFileSystem;
///
/// let mut mock_fs = MockFileSystem::new();
/// mock_fs.expect_read()
///     .returning(|_| Ok(b"127.0.0.1 localhost\n".to_vec()));
/// ```
#[cfg_attr(test, automock)]
pub trait FileSystem: Send + Sync {
    /// Read file contents as raw bytes. Hosts files are not guaranteed to be UTF-8.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the contents of `path` so readers see either the old or the
    /// new file, never a partial write.
    fn replace(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Copy a file from one location to another, overwriting the target.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation using std::fs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    /// Writes to a temp file in the same directory, syncs it, copies the
    /// target's permissions and renames it over the target. Symlinks are
    /// resolved first, so the link stays and the file it points to changes.
    fn replace(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let target = resolve_target(path)?;
        let path = target.as_path();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let permissions = std::fs::metadata(path).ok().map(|m| m.permissions());

        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(contents)?;
        temp_file.as_file().sync_all()?;
        if let Some(permissions) = permissions {
            temp_file.as_file().set_permissions(permissions)?;
        }

        match temp_file.persist(path) {
            Ok(_) => Ok(()),
            Err(e) if is_unrenamable_target(&e.error) => {
                // Bind-mounted files (e.g. /etc/hosts in containers) can't be renamed over
                warn!(
                    "Cannot atomically replace {:?} ({}), writing in place",
                    path, e.error
                );
                std::fs::write(path, contents)
            }
            Err(e) => Err(e.error),
        }
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Follow symlinks to the real file. A path that does not exist yet is
/// written as given.
fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    match std::fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e),
    }
}

/// EBUSY (mount point) or EXDEV (different filesystem)
#[cfg(unix)]
fn is_unrenamable_target(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(16) | Some(18))
}

#[cfg(not(unix))]
fn is_unrenamable_target(_err: &io::Error) -> bool {
    false
}

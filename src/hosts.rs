//! Hosts file state management.
//!
//! The managed block is located by its start and end marker lines; all other
//! content of the file is preserved byte for byte, whatever its encoding. Every mutation reads the
//! file once, computes the new content in memory and replaces the file
//! atomically. The high-level transitions (`enable`, `disable`, `update`)
//! always take a backup before touching the file.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::HostsError;
use crate::fs_abstraction::{FileSystem, RealFileSystem};
use crate::processor::{END_MARKER, START_MARKER};

/// Environment variable overriding the hosts file location
pub const HOSTS_PATH_ENV: &str = "ADLESS_HOSTS_PATH";

const BACKUP_SUFFIX: &str = ".backup";

#[cfg(windows)]
pub fn default_hosts_path() -> PathBuf {
    PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts")
}

#[cfg(not(windows))]
pub fn default_hosts_path() -> PathBuf {
    PathBuf::from("/etc/hosts")
}

/// Hosts file location, honoring `ADLESS_HOSTS_PATH`
pub fn hosts_path() -> PathBuf {
    env::var_os(HOSTS_PATH_ENV)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_hosts_path)
}

/// Whether the managed block is currently present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Enabled,
    Disabled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Enabled => f.write_str("enabled"),
            Status::Disabled => f.write_str("disabled"),
        }
    }
}

/// Outcome of `enable`/`disable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    /// Already in the requested state; the file was not touched
    Unchanged,
}

/// The system hosts file and its `.backup` sibling.
pub struct HostsFile<F: FileSystem = RealFileSystem> {
    path: PathBuf,
    backup_path: PathBuf,
    fs: F,
}

impl HostsFile<RealFileSystem> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(path, RealFileSystem)
    }

    /// The hosts file of this machine (see [`hosts_path`])
    pub fn system() -> Self {
        Self::new(hosts_path())
    }
}

impl<F: FileSystem> HostsFile<F> {
    pub fn with_fs(path: impl Into<PathBuf>, fs: F) -> Self {
        let path = path.into();
        let mut backup = path.clone().into_os_string();
        backup.push(BACKUP_SUFFIX);
        Self {
            path,
            backup_path: PathBuf::from(backup),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    fn read(&self) -> Result<Vec<u8>, HostsError> {
        self.fs.read(&self.path).map_err(|source| HostsError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn store(&self, content: &[u8]) -> Result<(), HostsError> {
        self.fs
            .replace(&self.path, content)
            .map_err(|source| HostsError::Write {
                path: self.path.clone(),
                source,
            })
    }

    fn strip(&self, content: &[u8]) -> Result<Vec<u8>, HostsError> {
        strip_blocks(content).ok_or_else(|| HostsError::UnterminatedBlock(self.path.clone()))
    }

    /// Current status, derived from the file content
    pub fn status(&self) -> Result<Status, HostsError> {
        let content = self.read()?;
        Ok(if contains_block(&content) {
            Status::Enabled
        } else {
            Status::Disabled
        })
    }

    /// Copy the hosts file to its `.backup` sibling, overwriting any previous backup
    pub fn backup(&self) -> Result<(), HostsError> {
        self.fs
            .copy(&self.path, &self.backup_path)
            .map_err(|source| HostsError::Backup {
                path: self.path.clone(),
                backup: self.backup_path.clone(),
                source,
            })?;
        debug!("Backed up {:?} to {:?}", self.path, self.backup_path);
        Ok(())
    }

    /// Copy the backup over the hosts file
    pub fn restore(&self) -> Result<(), HostsError> {
        if !self.fs.exists(&self.backup_path) {
            return Err(HostsError::NoBackup(self.backup_path.clone()));
        }
        self.fs
            .copy(&self.backup_path, &self.path)
            .map_err(|source| HostsError::Restore {
                path: self.path.clone(),
                backup: self.backup_path.clone(),
                source,
            })?;
        info!("Restored {:?} from {:?}", self.path, self.backup_path);
        Ok(())
    }

    /// Delete every managed block, leaving other content untouched.
    /// Does nothing when no block is present.
    pub fn remove_domains_blocking(&self) -> Result<(), HostsError> {
        let content = self.read()?;
        if !contains_block(&content) {
            return Ok(());
        }
        let stripped = self.strip(&content)?;
        self.store(&stripped)
    }

    /// Append a rendered block. Does not check for an existing block;
    /// use [`HostsFile::update`] to replace one.
    pub fn write(&self, block: &str) -> Result<(), HostsError> {
        let content = self.read()?;
        self.store(&append_block(&content, block))
    }

    /// `Disabled -> Enabled`: back up, then append the block
    pub fn enable(&self, block: &str) -> Result<Transition, HostsError> {
        let content = self.read()?;
        if contains_block(&content) {
            return Ok(Transition::Unchanged);
        }
        self.backup()?;
        self.store(&append_block(&content, block))?;
        Ok(Transition::Changed)
    }

    /// `Enabled -> Disabled`: back up, then remove the block
    pub fn disable(&self) -> Result<Transition, HostsError> {
        let content = self.read()?;
        if !contains_block(&content) {
            return Ok(Transition::Unchanged);
        }
        let stripped = self.strip(&content)?;
        self.backup()?;
        self.store(&stripped)?;
        Ok(Transition::Changed)
    }

    /// Back up, then replace any existing block with `block` in a single
    /// write. Leaves exactly one block in the file.
    pub fn update(&self, block: &str) -> Result<(), HostsError> {
        let content = self.read()?;
        let stripped = self.strip(&content)?;
        self.backup()?;
        self.store(&append_block(&stripped, block))
    }
}

fn contains_block(content: &[u8]) -> bool {
    content
        .split(|&b| b == b'\n')
        .any(|line| trim_line(line) == START_MARKER.as_bytes())
}

/// Strip ASCII whitespace, including a trailing `\r`, from both ends
fn trim_line(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &line[start..end]
}

/// Remove every start..end marker block, inclusive, together with the line
/// terminators. `None` if a block is never closed.
fn strip_blocks(content: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(content.len());
    let mut in_block = false;

    for line in content.split_inclusive(|&b| b == b'\n') {
        let trimmed = trim_line(line);
        if in_block {
            if trimmed == END_MARKER.as_bytes() {
                in_block = false;
            }
            continue;
        }
        if trimmed == START_MARKER.as_bytes() {
            in_block = true;
            continue;
        }
        out.extend_from_slice(line);
    }

    if in_block {
        None
    } else {
        Some(out)
    }
}

fn append_block(content: &[u8], block: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + block.len() + 2);
    out.extend_from_slice(content);
    if !content.is_empty() && !content.ends_with(b"\n") {
        out.push(b'\n');
    }
    out.extend_from_slice(block.as_bytes());
    if !block.ends_with('\n') {
        out.push(b'\n');
    }
    out
}

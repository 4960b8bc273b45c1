//! Error types for adless.
//!
//! Library modules return these typed errors; command implementations wrap
//! them with `anyhow` context before they reach `main`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve a single list source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} is too large: {size} bytes (max: {max} bytes)")]
    TooLarge { url: String, size: u64, max: u64 },
}

/// Failure of the fetch/parse/merge/render pipeline as a whole.
///
/// Individual source failures are not represented here: they are logged and
/// reported through [`crate::processor::ProcessReport`].
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("no blocklists provided")]
    NoBlocklists,

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failure while reading or mutating the hosts file or its backup.
#[derive(Error, Debug)]
pub enum HostsError {
    #[error("failed to read hosts file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write hosts file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to back up {path:?} to {backup:?}: {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to restore {path:?} from {backup:?}: {source}")]
    Restore {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no backup found at {0:?}")]
    NoBackup(PathBuf),

    #[error("managed block in {0:?} has a start marker but no end marker")]
    UnterminatedBlock(PathBuf),
}

/// Failure while loading, validating or saving the configuration file.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ConfigError(pub String);

/// Process exit codes reported by the binary.
pub mod exit_code {
    pub const FAILURE: u8 = 1;
    pub const CONFIG: u8 = 2;
    pub const HOSTS_FILE: u8 = 3;
}

/// Map an error chain to the exit code the binary should report.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    // Context layers are only reachable through downcast, sources only through chain
    if err.downcast_ref::<ConfigError>().is_some() {
        return exit_code::CONFIG;
    }
    if err.downcast_ref::<HostsError>().is_some() {
        return exit_code::HOSTS_FILE;
    }
    for cause in err.chain() {
        if cause.is::<ConfigError>() {
            return exit_code::CONFIG;
        }
        if cause.is::<HostsError>() {
            return exit_code::HOSTS_FILE;
        }
    }
    exit_code::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_code_for_config_error() {
        let err = anyhow::Error::new(ConfigError("no blocklists provided".into()))
            .context("Failed to load config");
        assert_eq!(exit_code_for(&err), exit_code::CONFIG);
    }

    #[test]
    fn test_exit_code_for_hosts_error() {
        let result: Result<(), HostsError> =
            Err(HostsError::NoBackup(PathBuf::from("/etc/hosts.backup")));
        let err = result.context("Failed to restore").unwrap_err();
        assert_eq!(exit_code_for(&err), exit_code::HOSTS_FILE);
    }

    #[test]
    fn test_exit_code_for_other_error() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&err), exit_code::FAILURE);
    }

    #[test]
    fn test_fetch_error_names_url() {
        let err = FetchError::Status {
            url: "https://lists.example.com/hosts".into(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "https://lists.example.com/hosts returned HTTP 404"
        );
    }
}

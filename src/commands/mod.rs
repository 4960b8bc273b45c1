//! CLI command implementations.

pub mod config;
pub mod disable;
pub mod enable;
pub mod restore;
pub mod status;
pub mod update;

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use crate::config::Config;
use crate::hosts::{hosts_path, HostsFile};
use crate::processor::{ListKind, Processor, RenderedBlock};
use crate::utils::{format_bytes, format_count};

/// Locations shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Config file given with `--config`, if any
    pub config_path: Option<PathBuf>,
    pub hosts_path: PathBuf,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            hosts_path: hosts_path(),
        }
    }

    /// Config file location in effect for this invocation
    pub fn config_location(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(Config::location)
    }

    /// An explicit `--config` file must exist; the default location falls
    /// back to built-in defaults.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config_path {
            Some(path) => Config::load(path),
            None => Config::load_or_default(Config::location()),
        }
    }

    pub fn hosts(&self) -> HostsFile {
        HostsFile::new(&self.hosts_path)
    }
}

/// Run the processor for `config` and print a per-source summary.
///
/// Fails when every blocklist failed, so a network outage never replaces
/// a working block with an empty one.
pub(crate) async fn build_block(config: &Config) -> Result<RenderedBlock> {
    let processor = Processor::from_config(config).context("Failed to set up list processing")?;
    let (block, report) = processor
        .process()
        .await
        .context("Failed to process lists")?;

    if report.all_blocklists_failed() {
        anyhow::bail!("No blocklist could be fetched; the hosts file was left unchanged");
    }

    let failed = report.failures().count();
    let fetched_blocklists = report
        .sources
        .iter()
        .filter(|s| s.kind == ListKind::Blocklist && s.result.is_ok())
        .count();
    println!(
        "{} domains from {} blocklist(s), {} downloaded{}",
        format_count(block.len()),
        fetched_blocklists,
        format_bytes(processor.fetcher().total_downloaded() as u64),
        if failed > 0 {
            format!(", {} source(s) failed", failed)
        } else {
            String::new()
        }
    );

    Ok(block)
}

//! Blocklist processing: concurrent fetch, parse, merge, whitelist
//! subtraction and rendering of the managed hosts-file block.

use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{FetchError, ProcessError};
use crate::fetcher::{Fetcher, ListFetcher};
use crate::parser::{parse_content, DomainSet};
use crate::utils::format_count;

/// First line of the managed block.
pub const START_MARKER: &str = "# <<<<<< adless managed block: start >>>>>>";

/// Last line of the managed block.
pub const END_MARKER: &str = "# <<<<<< adless managed block: end >>>>>>";

/// Comment written right after the start marker.
pub const DESCRIPTION_COMMENT: &str =
    "# Domains below are blocked by adless. Do not edit this block by hand; run 'adless update' instead.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Blocklist,
    Whitelist,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKind::Blocklist => f.write_str("blocklist"),
            ListKind::Whitelist => f.write_str("whitelist"),
        }
    }
}

/// What happened to one configured source during a run.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub url: String,
    pub kind: ListKind,
    /// Number of domains extracted, or the failure message
    pub result: Result<usize, String>,
}

/// Per-source results of a processing run.
#[derive(Debug, Clone, Default)]
pub struct ProcessReport {
    pub sources: Vec<SourceOutcome>,
    /// Unique domains left after whitelist subtraction
    pub total_domains: usize,
}

impl ProcessReport {
    pub fn failures(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.sources.iter().filter(|s| s.result.is_err())
    }

    /// True when not a single blocklist could be processed
    pub fn all_blocklists_failed(&self) -> bool {
        self.sources
            .iter()
            .filter(|s| s.kind == ListKind::Blocklist)
            .all(|s| s.result.is_err())
    }
}

/// The managed block, ready to be written into the hosts file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedBlock {
    domains: DomainSet,
}

impl RenderedBlock {
    pub fn new(domains: DomainSet) -> Self {
        Self { domains }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains_key(domain)
    }

    /// Render the block: markers, description and one sorted line per
    /// domain. The result has no trailing newline.
    pub fn render(&self) -> String {
        let mut entries: Vec<_> = self.domains.values().collect();
        entries.sort_unstable_by(|a, b| a.domain().cmp(b.domain()));

        let mut out = String::with_capacity(
            START_MARKER.len() + DESCRIPTION_COMMENT.len() + END_MARKER.len() + entries.len() * 32,
        );
        out.push_str(START_MARKER);
        out.push('\n');
        out.push_str(DESCRIPTION_COMMENT);
        out.push('\n');
        for entry in entries {
            out.push_str(entry.address());
            out.push(' ');
            out.push_str(entry.domain());
            out.push('\n');
        }
        out.push_str(END_MARKER);
        out
    }
}

impl fmt::Display for RenderedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Runs the fetch/parse/merge/render pipeline over configured sources.
pub struct Processor<F> {
    fetcher: Arc<F>,
    blocklists: Vec<String>,
    whitelists: Vec<String>,
}

impl Processor<Fetcher> {
    /// Build a processor with an HTTP fetcher configured from `config`
    pub fn from_config(config: &Config) -> Result<Self, ProcessError> {
        let fetcher = Fetcher::new(config.http.timeout()).map_err(ProcessError::Client)?;
        Ok(Self::new(Arc::new(fetcher), config))
    }
}

impl<F: ListFetcher + 'static> Processor<F> {
    pub fn new(fetcher: Arc<F>, config: &Config) -> Self {
        Self::with_sources(
            fetcher,
            config.blocklists.iter().map(|s| s.target.clone()).collect(),
            config.whitelists.iter().map(|s| s.target.clone()).collect(),
        )
    }

    pub fn with_sources(fetcher: Arc<F>, blocklists: Vec<String>, whitelists: Vec<String>) -> Self {
        Self {
            fetcher,
            blocklists,
            whitelists,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch and parse every source concurrently, merge the results and
    /// subtract whitelisted domains.
    ///
    /// A source that fails contributes no domains; the failure is logged
    /// and recorded in the report. Nothing is written to disk.
    pub async fn process(&self) -> Result<(RenderedBlock, ProcessReport), ProcessError> {
        if self.blocklists.is_empty() {
            return Err(ProcessError::NoBlocklists);
        }

        let jobs: Vec<(ListKind, String)> = self
            .blocklists
            .iter()
            .map(|url| (ListKind::Blocklist, url.clone()))
            .chain(
                self.whitelists
                    .iter()
                    .map(|url| (ListKind::Whitelist, url.clone())),
            )
            .collect();

        // One task per source; each owns its result and hands it back
        // through its join handle, indexed like `jobs`.
        let handles: Vec<_> = jobs
            .iter()
            .map(|(kind, url)| {
                let fetcher = Arc::clone(&self.fetcher);
                let kind = *kind;
                let url = url.clone();
                tokio::spawn(async move { process_source(fetcher.as_ref(), kind, &url).await })
            })
            .collect();

        // Barrier: merging starts only once every task has finished or failed
        let joined = join_all(handles).await;

        let mut blocklist_domains = DomainSet::new();
        let mut whitelist_domains = DomainSet::new();
        let mut report = ProcessReport::default();

        for ((kind, url), outcome) in jobs.into_iter().zip(joined) {
            let outcome = match outcome {
                Ok(Ok(domains)) => Ok(domains),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => Err(format!("task failed: {}", e)),
            };

            let result = match outcome {
                Ok(domains) => {
                    let count = domains.len();
                    match kind {
                        ListKind::Blocklist => blocklist_domains.extend(domains),
                        ListKind::Whitelist => whitelist_domains.extend(domains),
                    }
                    Ok(count)
                }
                Err(message) => {
                    error!("Failed to process {} {}: {}", kind, url, message);
                    Err(message)
                }
            };

            report.sources.push(SourceOutcome { url, kind, result });
        }

        let before = blocklist_domains.len();
        blocklist_domains.retain(|domain, _| !whitelist_domains.contains_key(domain));
        if before > blocklist_domains.len() {
            info!(
                "Whitelist removed {} domains",
                format_count(before - blocklist_domains.len())
            );
        }

        report.total_domains = blocklist_domains.len();
        info!(
            "Total number of unique domains: {}",
            format_count(report.total_domains)
        );

        Ok((RenderedBlock::new(blocklist_domains), report))
    }
}

async fn process_source<F: ListFetcher + ?Sized>(
    fetcher: &F,
    kind: ListKind,
    url: &str,
) -> Result<DomainSet, FetchError> {
    info!("Processing {} {}...", kind, url);

    let content = fetcher.fetch(url).await?;
    let domains = parse_content(&content);

    info!("{} {} - {} domains", kind, url, format_count(domains.len()));
    Ok(domains)
}

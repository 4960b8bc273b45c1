//! # adless - local ad and tracker blocker
//!
//! Fetches blocklists and whitelists, merges them into a deduplicated set of
//! domains and writes that set into the system hosts file as a
//! marker-delimited block bound to `127.0.0.1`. Everything else in the hosts
//! file is left untouched.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          adless                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: enable, disable, update, status, restore  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Blocklist / whitelist targets, HTTP timeout          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Processor                                                  │
//! │    ├── Fetcher (reqwest + rustls), one task per source      │
//! │    ├── Parser (hosts format, ABP rules, skip-list)          │
//! │    └── Merge, whitelist subtraction, rendering              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  HostsFile                                                  │
//! │    └── Status, backup, atomic block replacement, restore    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use adless::config::Config;
//! use adless::hosts::HostsFile;
//! use adless::processor::Processor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_or_default(Config::location())?;
//!
//!     let processor = Processor::from_config(&config)?;
//!     let (block, report) = processor.process().await?;
//!     println!("{} domains, {} failed sources", block.len(), report.failures().count());
//!
//!     let hosts = HostsFile::system();
//!     hosts.update(&block.render())?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`error`] - Typed errors and exit codes
//! - [`fetcher`] - HTTP client for downloading lists
//! - [`fs_abstraction`] - Mockable filesystem primitives
//! - [`hosts`] - Hosts file status, backup and block replacement
//! - [`parser`] - Line parser for hosts and Adblock-Plus lists
//! - [`processor`] - Concurrent fetch, merge and rendering
//! - [`utils`] - Formatting helpers

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod fs_abstraction;
pub mod hosts;
pub mod parser;
pub mod processor;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;

//! Status command implementation.

use anyhow::{Context as _, Result};

use super::Context;
use crate::hosts::Status;

/// Run the status command
pub async fn run(ctx: &Context) -> Result<()> {
    let hosts = ctx.hosts();
    let status = hosts.status().context("Failed to read hosts file")?;

    let label = match status {
        Status::Enabled => "ENABLED",
        Status::Disabled => "DISABLED",
    };

    println!("Domains blocking: {}", label);
    println!("Hosts file: {}", hosts.path().display());
    if hosts.backup_path().exists() {
        println!("Backup: {}", hosts.backup_path().display());
    } else {
        println!("Backup: none");
    }

    Ok(())
}

//! Enable command implementation.

use anyhow::{Context as _, Result};
use tracing::info;

use super::{build_block, Context};
use crate::hosts::{Status, Transition};
use crate::utils::format_count_with_separator;

/// Run the enable command
pub async fn run(ctx: &Context) -> Result<()> {
    let hosts = ctx.hosts();

    // Checked up front so an enabled system doesn't trigger any downloads
    if hosts.status().context("Failed to read hosts file")? == Status::Enabled {
        info!("Domains blocking is already enabled");
        println!("[OK] Domains blocking is already enabled");
        return Ok(());
    }

    let config = ctx.load_config()?;

    info!("Enabling domains blocking...");
    let block = build_block(&config).await?;

    match hosts
        .enable(&block.render())
        .context("Failed to enable domains blocking")?
    {
        Transition::Changed => println!(
            "[OK] Domains blocking enabled ({} domains blocked)",
            format_count_with_separator(block.len())
        ),
        Transition::Unchanged => println!("[OK] Domains blocking is already enabled"),
    }

    Ok(())
}

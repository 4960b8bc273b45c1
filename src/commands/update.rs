//! Update command implementation.

use anyhow::{Context as _, Result};
use tracing::info;

use super::{build_block, Context};
use crate::utils::format_count_with_separator;

/// Run the update command
pub async fn run(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let hosts = ctx.hosts();

    // Fail on an unreadable hosts file before spending time on downloads
    hosts.status().context("Failed to read hosts file")?;

    info!("Updating blocklists...");
    let block = build_block(&config).await?;

    hosts
        .update(&block.render())
        .context("Failed to update domains blocking")?;

    println!(
        "[OK] Domains blocking updated and enabled ({} domains blocked)",
        format_count_with_separator(block.len())
    );
    Ok(())
}

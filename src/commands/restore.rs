//! Restore command implementation.

use anyhow::{Context as _, Result};

use super::Context;

/// Run the restore command
pub async fn run(ctx: &Context) -> Result<()> {
    let hosts = ctx.hosts();
    hosts.restore().context("Failed to restore hosts file")?;

    let status = hosts.status().context("Failed to read restored hosts file")?;
    println!(
        "[OK] {:?} restored from {:?} (domains blocking {})",
        hosts.path(),
        hosts.backup_path(),
        status
    );
    Ok(())
}

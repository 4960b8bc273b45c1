//! Disable command implementation.

use anyhow::{Context as _, Result};
use tracing::info;

use super::Context;
use crate::hosts::Transition;

/// Run the disable command
pub async fn run(ctx: &Context) -> Result<()> {
    info!("Disabling domains blocking...");

    let hosts = ctx.hosts();
    match hosts
        .disable()
        .context("Failed to disable domains blocking")?
    {
        Transition::Changed => {
            println!("[OK] Domains blocking disabled (managed block removed, config preserved)")
        }
        Transition::Unchanged => println!("[OK] Domains blocking is already disabled"),
    }

    Ok(())
}

//! Config command implementation (init, show, edit, path).

use anyhow::{Context as _, Result};
use std::env;
use std::process::Command;
use tracing::info;

use super::Context;
use crate::cli::ConfigAction;
use crate::config::Config;

const FALLBACK_EDITOR: &str = "vi";

/// Run the config command
pub async fn run(action: ConfigAction, ctx: &Context) -> Result<()> {
    let location = ctx.config_location();

    match action {
        ConfigAction::Init => {
            if Config::init(&location)? {
                info!("Config file has been initialized at {:?}", location);
                println!("[OK] Config file written to {}", location.display());
            } else {
                println!("Config file already exists at {}", location.display());
            }
        }
        ConfigAction::Show => {
            let config = ctx.load_config()?;
            print!("{}", config.to_yaml()?);
        }
        ConfigAction::Path => {
            println!("{}", location.display());
        }
        ConfigAction::Edit => {
            Config::init(&location)?;

            let editor = editor_command(|key| env::var(key).ok());
            let (program, args) = split_command(&editor);
            let status = Command::new(program)
                .args(args)
                .arg(&location)
                .status()
                .with_context(|| format!("Failed to launch editor '{}'", editor))?;
            if !status.success() {
                anyhow::bail!("Editor '{}' exited with {}", editor, status);
            }

            // Catch mistakes right away instead of on the next update
            Config::load(&location)?;
            println!("[OK] Config file is valid");
        }
    }

    Ok(())
}

fn editor_command<F>(var: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|key| var(key))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Split an editor setting such as "code --wait" into program and arguments
fn split_command(command: &str) -> (&str, Vec<&str>) {
    let mut parts = command.split_whitespace();
    let program = parts.next().unwrap_or(FALLBACK_EDITOR);
    (program, parts.collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_command_precedence() {
        let both = |key: &str| match key {
            "VISUAL" => Some("code --wait".to_string()),
            "EDITOR" => Some("nano".to_string()),
            _ => None,
        };
        assert_eq!(editor_command(both), "code --wait");

        let editor_only = |key: &str| (key == "EDITOR").then(|| "nano".to_string());
        assert_eq!(editor_command(editor_only), "nano");

        let blank = |_: &str| Some("  ".to_string());
        assert_eq!(editor_command(blank), "vi");

        assert_eq!(editor_command(|_: &str| None), "vi");
    }

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("code --wait"), ("code", vec!["--wait"]));
        assert_eq!(split_command("vim"), ("vim", vec![]));
        assert_eq!(split_command(""), ("vi", vec![]));
    }
}

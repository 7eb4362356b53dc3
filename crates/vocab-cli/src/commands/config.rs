//! Config command handlers

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use vocab_core::{BackendKind, Config, Scoring};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "backend": config.backend,
                    "scoring": config.scoring,
                    "export_notes": config.export_notes,
                    "speech_command": config.speech_command,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.storage_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:       {}", config.data_dir.display());
            println!("  backend:        {}", config.backend);
            println!("  scoring:        {}", config.scoring);
            println!("  export_notes:   {}", config.export_notes);
            println!(
                "  speech_command: {}",
                config.speech_command.as_deref().unwrap_or("(auto)")
            );
            println!(
                "  log_file:       {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let unset = value.is_empty() || value == "none";

    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "backend" => {
            config.backend = value.parse::<BackendKind>().map_err(|e| anyhow!(e))?;
        }
        "scoring" => {
            config.scoring = value.parse::<Scoring>().map_err(|e| anyhow!(e))?;
        }
        "export_notes" => {
            config.export_notes = value
                .parse()
                .context("Invalid value for export_notes. Use 'true' or 'false'.")?;
        }
        "speech_command" => {
            config.speech_command = (!unset).then(|| value.to_string());
        }
        "log_file" => {
            config.log_file = (!unset).then(|| value.into());
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, backend, scoring, export_notes, speech_command, log_file",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "backend", "sqlite").unwrap();
        apply(&mut config, "scoring", "accelerated").unwrap();
        apply(&mut config, "export_notes", "true").unwrap();
        apply(&mut config, "speech_command", "espeak-ng -s 140").unwrap();

        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.scoring, Scoring::Accelerated);
        assert!(config.export_notes);
        assert_eq!(config.speech_command.as_deref(), Some("espeak-ng -s 140"));

        apply(&mut config, "speech_command", "none").unwrap();
        assert!(config.speech_command.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply(&mut config, "backend", "postgres").is_err());
        assert!(apply(&mut config, "export_notes", "maybe").is_err());
        assert!(apply(&mut config, "sync_url", "ws://x").is_err());
        assert_eq!(config.backend, BackendKind::Json);
    }

    #[test]
    fn test_set_writes_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!("data_dir = {:?}\n", temp_dir.path().join("data")),
        )
        .unwrap();

        let output = Output::new(OutputFormat::Quiet);
        set("scoring".into(), "accelerated".into(), Some(&path), &output).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("scoring = \"accelerated\""));
    }
}

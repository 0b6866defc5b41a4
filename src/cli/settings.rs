//! Settings subcommand implementation.

use super::load_settings;
use crate::config::{Paths, Settings};
use crate::error::CliResult;
use crate::output;
use clap::Parser;
use std::path::Path;

/// Show the effective settings, or write defaults to the settings file.
#[derive(Parser, Debug)]
pub struct SettingsCommand {
    /// Write default settings to the settings file
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing settings file with --init
    #[arg(long, requires = "init")]
    pub force: bool,
}

impl SettingsCommand {
    /// Execute the settings command.
    pub fn execute(&self, config: Option<&Path>) -> CliResult<()> {
        if !self.init {
            output::print_json(&load_settings(config)?)?;
            return Ok(());
        }

        let path = match config {
            Some(path) => path.to_path_buf(),
            None => Paths::resolve()?.settings_file(),
        };
        if path.exists() && !self.force {
            output::print_warning(&format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            ));
            return Ok(());
        }

        Settings::default().save_to(&path)?;
        output::print_success(&format!("Default settings written to {}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let init = SettingsCommand {
            init: true,
            force: false,
        };

        init.execute(Some(&path)).unwrap();
        let written = Settings::load_from(&path).unwrap();
        assert_eq!(written.concurrency, Settings::default().concurrency);

        std::fs::write(&path, r#"{"retries": 4}"#).unwrap();
        init.execute(Some(&path)).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().retries, 4);
    }
}

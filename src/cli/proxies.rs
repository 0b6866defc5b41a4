//! Proxies subcommand implementation.

use crate::cli::OutputFormat;
use crate::config::Settings;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::proxy::ProxyPool;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// Load a proxy list and show what would be used.
#[derive(Parser, Debug)]
pub struct ProxiesCommand {
    /// Proxy list (defaults to the file named in settings)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ProxyEntry {
    scheme: String,
    proxy: String,
}

impl ProxiesCommand {
    /// Execute the proxies command.
    pub fn execute(&self, settings: &Settings, quiet: bool) -> CliResult<()> {
        let path = self
            .file
            .as_ref()
            .or(settings.proxies_file.as_ref())
            .ok_or_else(|| CliError::Other("no proxy file given or configured".to_string()))?;

        let pool = ProxyPool::new();
        let loaded = pool.load_file(path)?;
        let usage = pool.usage();

        match self.format {
            OutputFormat::Json => {
                let entries: Vec<_> = usage
                    .iter()
                    .map(|u| ProxyEntry {
                        scheme: u.proxy.scheme().to_string(),
                        proxy: u.proxy.to_string(),
                    })
                    .collect();
                output::print_json(&entries)?;
            }
            OutputFormat::Plain => {
                if !quiet {
                    output::print_info(&format!(
                        "{} proxies loaded from {}",
                        loaded,
                        path.display()
                    ));
                }
                output::print_proxies(&usage)?;
            }
        }
        Ok(())
    }
}

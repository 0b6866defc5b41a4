//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::pipeline::RunReport;
use crate::proxy::ProxyUsage;
use console::style;
use std::io::{self, Write};
use std::path::Path;

const RULE: &str = "═══════════════════════════════════════════════════════════════";

/// Print a run report in human-readable plain text format.
pub fn print_plain(report: &RunReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_plain(&mut out, report)
}

fn write_plain(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Run Summary",
        style("liveprobe").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {}",
        style("Run ID:").bold(),
        style(report.run_id.short()).dim()
    )?;
    writeln!(
        out,
        "  {} {} workers, {} proxies",
        style("Pool:").bold(),
        report.workers,
        report.proxies
    )?;
    writeln!(
        out,
        "  {} {} received, {} unique, {} targets",
        style("Input:").bold(),
        report.candidates_received,
        report.unique_candidates,
        report.targets_queued
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} targets probed in {:.2}s",
        style("Statistics:").bold(),
        report.probed,
        report.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "               {} alive, {} not alive, {} aborted",
        style(report.alive).green().bold(),
        style(report.not_alive).red(),
        style(report.aborted).yellow()
    )?;
    writeln!(
        out,
        "               {} written ({:.1} alive/s)",
        style(report.written).white().bold(),
        report.alive_rate()
    )?;

    if report.cancelled {
        writeln!(out)?;
        writeln!(
            out,
            "  {}",
            style("Run was cancelled; results above are partial.").yellow()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;
    Ok(())
}

/// Print a header before the run begins.
pub fn print_run_header(inputs: usize, workers: usize, proxies: usize, output: &Path) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("liveprobe").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Inputs: {}",
        style("•").dim(),
        style(inputs).white().bold()
    );
    println!(
        "{} Workers: {} ({} proxies)",
        style("•").dim(),
        style(workers).white().bold(),
        proxies
    );
    println!(
        "{} Writing alive targets to {}",
        style("•").dim(),
        style(output.display()).yellow()
    );
    println!();
}

/// List loaded proxies with their usage counters.
pub fn print_proxies(usage: &[ProxyUsage]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if usage.is_empty() {
        writeln!(out, "  {}", style("No proxies loaded.").dim())?;
        return Ok(());
    }

    writeln!(
        out,
        "  {:<8}  {}",
        style("SCHEME").bold(),
        style("PROXY").bold()
    )?;
    for entry in usage {
        writeln!(
            out,
            "  {:<8}  {}",
            entry.proxy.scheme().to_string(),
            entry.proxy
        )?;
    }
    Ok(())
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

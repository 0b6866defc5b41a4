//! Output formatting module.
//!
//! Run reports go to stdout as plain text or JSON. Alive targets never pass
//! through here: the result sink owns that stream.

mod json_format;
mod plain;

pub use json_format::print_json;
pub use plain::{
    print_error, print_info, print_plain, print_proxies, print_run_header, print_success,
    print_warning,
};

use crate::cli::OutputFormat;
use crate::pipeline::RunReport;
use std::io;

/// Format and print a run report according to the specified format.
pub fn print_report(report: &RunReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_plain(report),
        OutputFormat::Json => json_format::print_json(report),
    }
}

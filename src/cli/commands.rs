//! CLI argument definitions

use crate::domain::LogDate;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "klog")]
#[command(about = "Kitchen log: dated journal entries kept in a git repository", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Date of the entry (YYYY-MM-DD, default: today)
    #[arg(value_name = "DATE", value_parser = parse_date)]
    pub date: Option<LogDate>,

    /// Do not pull before or push after editing
    #[arg(short = 'n', long)]
    pub no_sync: bool,

    /// Generate the exported log (not implemented yet)
    #[arg(short, long)]
    pub generate: bool,

    /// List all entries instead of editing
    #[arg(short, long)]
    pub list: bool,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_date(text: &str) -> Result<LogDate, String> {
    LogDate::parse(text).map_err(|_| format!("'{}' is not a valid date, expected YYYY-MM-DD", text))
}

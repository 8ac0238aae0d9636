use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::exit;

use crate::RETURN_CODE_CMDLINE;

/// Command-line arguments parser
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Overpass API JSON export containing the coastline ways (required)
    #[arg(long)]
    pub file: PathBuf,

    /// Directory the output layers are written to (required)
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// EPSG code of the output reference system (4326 or 3857)
    #[arg(long, default_value_t = 4326)]
    pub srs: u32,

    /// Merge open rings with endpoints closer than this distance, in
    /// degrees (0 disables gap closing)
    #[arg(long, default_value_t = 1.0)]
    pub close_distance: f64,

    /// Enable debug output (optional)
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    pub debug: bool,
}

impl Args {
    pub fn run(&self) {
        if !self.file.is_file() {
            eprintln!(
                "{}",
                format!("Error! Input file '{}' not found", self.file.display())
                    .red()
                    .bold()
            );
            exit(RETURN_CODE_CMDLINE);
        }

        if self.close_distance < 0.0 {
            eprintln!(
                "{}",
                "Error! close-distance must not be negative".red().bold()
            );
            exit(RETURN_CODE_CMDLINE);
        }
    }
}

//! Command-Line Interface (CLI) argument parsing.
//!
//! Two flags, both with defaults: the config file path and the database
//! file path. Everything else comes from the config file.

use clap::Parser;
use std::path::PathBuf;

/// An endpoint health and TLS-certificate monitor.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    pub config: PathBuf,

    /// Path to the database file.
    #[arg(long, value_name = "FILE", default_value = "sitewatch.db")]
    pub db: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_paths() {
        let cli = Cli::parse_from(["sitewatch"]);
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.db, PathBuf::from("sitewatch.db"));
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["sitewatch", "--config", "/etc/sw.json", "--db", "/var/sw.db"]);
        assert_eq!(cli.config, PathBuf::from("/etc/sw.json"));
        assert_eq!(cli.db, PathBuf::from("/var/sw.db"));
    }
}

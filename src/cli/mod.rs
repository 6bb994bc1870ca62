//! CLI module
//!
//! Command-line interface of the `tap-incident` binary.
//!
//! # Modes
//!
//! - `--discover` - Print the catalog of available streams
//! - default - Sync the selected streams to stdout

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_parse_sync_flags() {
        let cli = Cli::try_parse_from([
            "tap-incident",
            "-c",
            "config.json",
            "--state",
            "state.json",
            "--catalog",
            "catalog.json",
            "--reset-stream",
            "alerts",
            "--reset-stream",
            "incidents",
            "--parquet-dir",
            "out",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("config.json")));
        assert_eq!(cli.catalog_path(), Some(&PathBuf::from("catalog.json")));
        assert_eq!(cli.reset_streams, vec!["alerts", "incidents"]);
        assert_eq!(cli.parquet_dir, Some(PathBuf::from("out")));
        assert!(!cli.discover);
        assert!(!cli.full_refresh);
    }

    #[test]
    fn test_properties_alias() {
        let cli = Cli::try_parse_from(["tap-incident", "-p", "props.json", "-d"]).unwrap();
        assert_eq!(cli.catalog_path(), Some(&PathBuf::from("props.json")));
        assert!(cli.discover);
    }

    #[test]
    fn test_catalog_conflicts_with_properties() {
        let result =
            Cli::try_parse_from(["tap-incident", "--catalog", "a.json", "--properties", "b.json"]);
        assert!(result.is_err());
    }
}

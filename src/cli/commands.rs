//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Extract incident.io data as a Singer stream
#[derive(Parser, Debug)]
#[command(name = "tap-incident")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON). Optional when INCIDENT_API_KEY is set.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// State file (JSON)
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Catalog file selecting streams and fields (JSON)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Deprecated alias for --catalog
    #[arg(short, long, conflicts_with = "catalog")]
    pub properties: Option<PathBuf>,

    /// Print the catalog and exit
    #[arg(short, long)]
    pub discover: bool,

    /// Ignore the state file and sync everything from scratch
    #[arg(long)]
    pub full_refresh: bool,

    /// Drop the bookmarks of a stream before syncing (repeatable)
    #[arg(long = "reset-stream", value_name = "STREAM")]
    pub reset_streams: Vec<String>,

    /// Also write each synced stream to <DIR>/<stream>.parquet
    #[arg(long, value_name = "DIR")]
    pub parquet_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Catalog path from --catalog or the deprecated --properties
    pub fn catalog_path(&self) -> Option<&PathBuf> {
        self.catalog.as_ref().or(self.properties.as_ref())
    }
}

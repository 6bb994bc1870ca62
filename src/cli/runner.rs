//! CLI runner - executes the discover or sync mode

use crate::catalog::{discover, Catalog};
use crate::cli::commands::Cli;
use crate::config::TapConfig;
use crate::engine::{SyncConfig, SyncEngine, SyncStats};
use crate::error::{Result, ResultExt};
use crate::http::HttpClient;
use crate::output::{FanoutSink, JsonLinesSink, OutputSink, ParquetSink};
use crate::state::StateManager;
use crate::streams::ApiAccessor;
use std::io::Write;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected mode
    pub async fn run(&self) -> Result<()> {
        if self.cli.discover {
            return self.discover();
        }
        let mut sink = self.build_sink()?;
        let stats = self.sync(sink.as_mut()).await?;
        log_summary(&stats);
        Ok(())
    }

    /// Print the catalog as pretty JSON
    fn discover(&self) -> Result<()> {
        info!("Running discovery");
        let catalog = discover()?;
        let json = serde_json::to_string_pretty(&catalog)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}")?;
        stdout.flush()?;
        Ok(())
    }

    /// Run the sync against the live API, writing to `sink`
    pub async fn sync(&self, sink: &mut dyn OutputSink) -> Result<SyncStats> {
        let config = TapConfig::load(self.cli.config.as_deref())?;
        let catalog = self.load_catalog()?;
        let state = self.load_state()?;

        let client = HttpClient::with_config(config.http_client_config())?;
        let engine = SyncEngine::new(ApiAccessor::new(client), state).with_config(self.sync_config());

        engine.run(catalog.as_ref(), sink).await
    }

    fn load_catalog(&self) -> Result<Option<Catalog>> {
        if self.cli.properties.is_some() {
            warn!("--properties is deprecated, use --catalog");
        }
        self.cli.catalog_path().map(Catalog::from_file).transpose()
    }

    fn load_state(&self) -> Result<StateManager> {
        match &self.cli.state {
            Some(_) if self.cli.full_refresh => {
                info!("Full refresh requested, ignoring state file");
                Ok(StateManager::in_memory())
            }
            Some(path) => StateManager::from_file(path),
            None => Ok(StateManager::in_memory()),
        }
    }

    fn sync_config(&self) -> SyncConfig {
        self.cli
            .reset_streams
            .iter()
            .fold(SyncConfig::new(), |config, stream| config.with_reset_stream(stream))
    }

    /// Stdout JSON lines, plus Parquet files when requested
    fn build_sink(&self) -> Result<Box<dyn OutputSink>> {
        match &self.cli.parquet_dir {
            Some(dir) => {
                let parquet = ParquetSink::new(dir)
                    .with_context(|| format!("Cannot use parquet dir {}", dir.display()))?;
                Ok(Box::new(
                    FanoutSink::new().with(JsonLinesSink::stdout()).with(parquet),
                ))
            }
            None => Ok(Box::new(JsonLinesSink::stdout())),
        }
    }
}

fn log_summary(stats: &SyncStats) {
    for stream in &stats.streams {
        info!(
            "  {}: {} emitted, {} skipped, {} checkpoints, {} ms",
            stream.name, stream.emitted, stream.skipped, stream.checkpoints, stream.duration_ms
        );
    }
    info!(
        "Synced {} streams ({} skipped), {} records in {} ms",
        stats.streams_synced(),
        stats.streams_skipped,
        stats.records_emitted(),
        stats.duration_ms
    );
}

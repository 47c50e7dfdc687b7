//! One-shot lookup command.

use crate::amazon::RelayClient;
use crate::commands::sink::PayloadSink;
use crate::config::Config;
use crate::format::Formatter;
use crate::lookup::{LookupError, Orchestrator, Snapshot, Transport};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Looks up one or more ASINs, one request at a time.
pub struct LookupCommand {
    config: Config,
    save_dir: Option<PathBuf>,
}

impl LookupCommand {
    /// Creates a new lookup command.
    pub fn new(config: Config) -> Self {
        Self { config, save_dir: None }
    }

    /// Saves found product pages into `dir`.
    pub fn save_to(mut self, dir: Option<PathBuf>) -> Self {
        self.save_dir = dir;
        self
    }

    /// Looks up one ASIN and returns formatted output.
    pub async fn execute(&self, asin: &str) -> Result<String> {
        let transport = self.transport()?;
        self.execute_with_transport(transport, asin).await
    }

    /// Looks up one ASIN with a provided transport (for testing).
    pub async fn execute_with_transport(
        &self,
        transport: Arc<dyn Transport>,
        asin: &str,
    ) -> Result<String> {
        let mut orchestrator = self.orchestrator(transport);
        let snapshot = lookup(&mut orchestrator, asin).await?;

        Ok(Formatter::new(self.config.format).format_snapshot(&snapshot))
    }

    /// Looks up several ASINs.
    pub async fn execute_batch(&self, asins: &[String]) -> Result<String> {
        let transport = self.transport()?;
        self.execute_batch_with_transport(transport, asins).await
    }

    /// Looks up several ASINs with a provided transport (for testing).
    ///
    /// Invalid ASINs are reported and skipped.
    pub async fn execute_batch_with_transport(
        &self,
        transport: Arc<dyn Transport>,
        asins: &[String],
    ) -> Result<String> {
        let mut orchestrator = self.orchestrator(transport);
        let mut snapshots = Vec::with_capacity(asins.len());

        for asin in asins {
            match lookup(&mut orchestrator, asin).await {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!("Skipping '{}': {}", asin, e),
            }
        }

        Ok(Formatter::new(self.config.format).format_snapshots(&snapshots))
    }

    fn transport(&self) -> Result<Arc<dyn Transport>> {
        let client = RelayClient::new(&self.config).context("Failed to create HTTP client")?;
        Ok(Arc::new(client))
    }

    fn orchestrator(&self, transport: Arc<dyn Transport>) -> Orchestrator {
        Orchestrator::from_config(&self.config, transport, PayloadSink::new(self.save_dir.clone()))
    }
}

/// Types `asin`, submits it, and waits for the result.
async fn lookup(orchestrator: &mut Orchestrator, asin: &str) -> Result<Snapshot, LookupError> {
    orchestrator.text_changed(asin);
    orchestrator.state().check_submit()?;

    info!("Looking up product: {}", asin);
    orchestrator.submit();
    Ok(orchestrator.settle().await)
}

//! Payload consumer used by the CLI commands.

use crate::lookup::{Extractor, TargetUrl};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Hands successful payloads off as raw HTML files.
///
/// With no directory configured the payload is dropped after the lookup.
#[derive(Debug, Clone, Default)]
pub struct PayloadSink {
    dir: Option<PathBuf>,
}

impl PayloadSink {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }
}

impl Extractor for PayloadSink {
    fn extract(&mut self, payload: &str, target: &TargetUrl, identifier: &str) -> Result<()> {
        let Some(dir) = &self.dir else {
            debug!("No save directory; discarding payload for {}", identifier);
            return Ok(());
        };

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let path = dir.join(format!("{}.html", identifier));
        std::fs::write(&path, payload)
            .with_context(|| format!("Failed to write payload: {}", path.display()))?;

        info!("Saved {} to {}", target.upstream_for(identifier), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("pages");
        let mut sink = PayloadSink::new(Some(out.clone()));

        sink.extract("<html>X</html>", &TargetUrl::default(), "B002QYW8LW").unwrap();

        let saved = std::fs::read_to_string(out.join("B002QYW8LW.html")).unwrap();
        assert_eq!(saved, "<html>X</html>");
    }

    #[test]
    fn test_without_dir_is_noop() {
        let mut sink = PayloadSink::default();
        assert!(sink.extract("X", &TargetUrl::default(), "B0").is_ok());
    }

    #[test]
    fn test_unwritable_dir_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // A regular file cannot be used as a directory
        let mut sink = PayloadSink::new(Some(file.path().to_path_buf()));
        let err = sink.extract("X", &TargetUrl::default(), "B0").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to"));
    }
}

//! Output formatting for lookup snapshots (text, JSON).

use crate::amazon::Region;
use crate::config::OutputFormat;
use crate::lookup::relay::{RelayEndpoint, RelaySet};
use crate::lookup::status::{StatusView, RELAY_PROMPT};
use crate::lookup::validator::INVALID_ASIN_HINT;
use crate::lookup::Snapshot;

/// Formats snapshots for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single snapshot.
    pub fn format_snapshot(&self, snapshot: &Snapshot) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Text => self.text_snapshot(snapshot),
        }
    }

    /// Formats the results of several lookups.
    pub fn format_snapshots(&self, snapshots: &[Snapshot]) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(snapshots).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Text if snapshots.is_empty() => "No lookups performed.".to_string(),
            OutputFormat::Text => snapshots
                .iter()
                .map(|s| self.text_snapshot(s))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    /// Lists the known relays, marking the current one.
    pub fn format_relays(&self, relays: &RelaySet, current: &RelayEndpoint) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "current": current,
                "known": relays.known(),
            }))
            .unwrap_or_else(|_| "{}".to_string()),
            OutputFormat::Text => {
                let mut lines = vec!["Known relays:".to_string()];
                lines.extend(numbered_relays(relays.known(), current));
                if !relays.contains(current) {
                    lines.push(format!("  *  {}  (custom)", current));
                }
                lines.join("\n")
            }
        }
    }

    /// Lists supported regions with their product page templates.
    pub fn format_regions(&self, regions: &[Region]) -> String {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<_> = regions
                    .iter()
                    .map(|r| serde_json::json!({ "code": r, "target_url": r.product_url_template() }))
                    .collect();
                serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Text => {
                let mut lines = vec![
                    format!("{:<6} {:<16} {}", "Code", "Domain", "Target URL"),
                    format!("{:-<6} {:-<16} {:-<32}", "", "", ""),
                ];
                for region in regions {
                    lines.push(format!(
                        "{:<6} {:<16} {}",
                        region.to_string(),
                        region.domain(),
                        region.product_url_template()
                    ));
                }
                lines.join("\n")
            }
        }
    }

    fn text_snapshot(&self, snapshot: &Snapshot) -> String {
        let mut lines = Vec::new();

        match &snapshot.identifier {
            Some(asin) => lines.push(format!("ASIN:    {}", asin)),
            None if !snapshot.input.is_empty() => lines.push(format!("Input:   {}", snapshot.input)),
            None => {}
        }

        if !snapshot.is_valid {
            lines.push(INVALID_ASIN_HINT.to_string());
        }

        lines.push(format!("Relay:   {}", snapshot.relay));

        if snapshot.in_flight {
            lines.push("Status:  Looking up...".to_string());
        }

        if let (Some(message), Some(code)) = (snapshot.status.message(), snapshot.http_status) {
            lines.push(format!("Status:  {} (HTTP {})", message, code));
        }

        if let StatusView::Unavailable { offer } = &snapshot.status {
            lines.push(RELAY_PROMPT.to_string());
            lines.extend(numbered_relays(&offer.options, &offer.current));
        }

        lines.join("\n")
    }
}

fn numbered_relays<'a>(
    relays: &'a [RelayEndpoint],
    current: &'a RelayEndpoint,
) -> impl Iterator<Item = String> + 'a {
    relays.iter().enumerate().map(move |(i, relay)| {
        let marker = if relay == current { "  (current)" } else { "" };
        format!("  [{}] {}{}", i + 1, relay, marker)
    })
}

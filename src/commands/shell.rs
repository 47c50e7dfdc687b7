//! Interactive lookup shell.
//!
//! Each input line is typed into the lookup field and submitted. Lines
//! starting with `:` are shell commands. Results are printed whenever the
//! orchestrator publishes a new snapshot.

use crate::amazon::RelayClient;
use crate::commands::sink::PayloadSink;
use crate::config::Config;
use crate::format::Formatter;
use crate::lookup::{Input, Orchestrator, Phase, RelayEndpoint, RelaySet, Snapshot, Transport};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

const HELP: &str = "Type an ASIN (e.g. B002QYW8LW) and press Enter.
Commands: :relays  :relay <N|URL>  :cancel  :help  :quit";

/// One parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Lookup(String),
    Relay(String),
    Relays,
    Cancel,
    Help,
    Quit,
    Unknown(String),
}

fn parse_line(line: &str) -> Line {
    if !line.starts_with(':') {
        return Line::Lookup(line.to_string());
    }

    let mut parts = line[1..].trim().splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match command {
        "q" | "quit" | "exit" => Line::Quit,
        "relays" => Line::Relays,
        "relay" if !arg.is_empty() => Line::Relay(arg.to_string()),
        "relay" => Line::Relays,
        "cancel" => Line::Cancel,
        "h" | "help" => Line::Help,
        _ => Line::Unknown(line.to_string()),
    }
}

/// Resolves `:relay` arguments: a 1-based index into the known set, or a URL.
fn relay_argument(arg: &str, relays: &RelaySet) -> String {
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| relays.known().get(i))
        .map(|relay| relay.as_str().to_string())
        .unwrap_or_else(|| arg.to_string())
}

/// The part of a snapshot worth re-printing. Keystrokes alone are not.
fn render_key(s: &Snapshot) -> (Phase, Option<&str>, Option<u16>, &RelayEndpoint, bool) {
    (s.phase, s.identifier.as_deref(), s.http_status, &s.relay, s.is_valid)
}

/// Runs the interactive shell.
pub struct ShellCommand {
    config: Config,
    save_dir: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new(config: Config) -> Self {
        Self { config, save_dir: None }
    }

    /// Saves found product pages into `dir`.
    pub fn save_to(mut self, dir: Option<PathBuf>) -> Self {
        self.save_dir = dir;
        self
    }

    /// Runs against stdin/stdout.
    pub async fn execute(&self) -> Result<()> {
        let client = RelayClient::new(&self.config).context("Failed to create HTTP client")?;
        let reader = BufReader::new(tokio::io::stdin());
        self.execute_with(Arc::new(client), reader, tokio::io::stdout()).await
    }

    /// Runs with a provided transport and I/O (for testing).
    pub async fn execute_with<R, W>(
        &self,
        transport: Arc<dyn Transport>,
        reader: R,
        mut writer: W,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let orchestrator = Orchestrator::from_config(
            &self.config,
            transport,
            PayloadSink::new(self.save_dir.clone()),
        );
        let relays = orchestrator.relays().clone();
        let mut updates = orchestrator.subscribe();
        let mut last = updates.borrow_and_update().clone();

        let (inputs, rx) = mpsc::channel(16);
        let worker = tokio::spawn(orchestrator.run(rx));

        let formatter = Formatter::new(self.config.format);
        let mut lines = reader.lines();

        write_block(&mut writer, HELP).await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read input")? else {
                        break;
                    };

                    let batch = match parse_line(&line) {
                        Line::Quit => break,
                        Line::Lookup(text) => vec![Input::Text(text), Input::Submit],
                        Line::Relay(arg) => vec![Input::SelectRelay(relay_argument(&arg, &relays))],
                        Line::Cancel => vec![Input::Cancel],
                        Line::Relays => {
                            let current = updates.borrow().relay.clone();
                            write_block(&mut writer, &formatter.format_relays(&relays, &current)).await?;
                            Vec::new()
                        }
                        Line::Help => {
                            write_block(&mut writer, HELP).await?;
                            Vec::new()
                        }
                        Line::Unknown(command) => {
                            write_block(&mut writer, &format!("Unknown command: {}", command)).await?;
                            Vec::new()
                        }
                    };

                    for input in batch {
                        inputs.send(input).await.context("Lookup worker stopped")?;
                    }
                }

                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    if render_key(&snapshot) != render_key(&last) {
                        write_block(&mut writer, &formatter.format_snapshot(&snapshot)).await?;
                        last = snapshot;
                    }
                }
            }
        }

        debug!("Input closed; waiting for the last lookup");
        drop(inputs);
        let snapshot = worker.await.context("Lookup worker panicked")?;
        if render_key(&snapshot) != render_key(&last) {
            write_block(&mut writer, &formatter.format_snapshot(&snapshot)).await?;
        }

        writer.flush().await.context("Failed to flush output")?;
        Ok(())
    }
}

async fn write_block<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<()> {
    writer.write_all(text.as_bytes()).await.context("Failed to write output")?;
    writer.write_all(b"\n\n").await.context("Failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{RelayResponse, ALTERNATE_RELAY, DEFAULT_RELAY};
    use crate::lookup::StatusView;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct MockTransport {
        status: u16,
        requests: Mutex<Vec<String>>,
    }

    impl MockTransport {
        fn new(status: u16) -> Arc<Self> {
            Arc::new(Self { status, requests: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, url: &str) -> RelayResponse {
            self.requests.lock().unwrap().push(url.to_string());
            RelayResponse::new(self.status, "<html></html>")
        }
    }

    /// Transport that never answers until released.
    struct GatedTransport {
        gate: Notify,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn get(&self, _url: &str) -> RelayResponse {
            self.gate.notified().await;
            RelayResponse::new(200, "<html></html>")
        }
    }

    fn resolved(identifier: &str) -> Snapshot {
        Snapshot {
            input: identifier.to_string(),
            is_valid: true,
            phase: Phase::Resolved,
            in_flight: false,
            identifier: Some(identifier.to_string()),
            http_status: Some(200),
            relay: RelayEndpoint::default(),
            status: StatusView::Found,
        }
    }

    async fn run_shell(transport: Arc<MockTransport>, script: &str) -> String {
        let mut output = Vec::new();
        ShellCommand::new(Config::default())
            .execute_with(transport, script.as_bytes(), &mut output)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("B002QYW8LW"), Line::Lookup("B002QYW8LW".to_string()));
        assert_eq!(parse_line(" B0 "), Line::Lookup(" B0 ".to_string()));
        assert_eq!(parse_line(":q"), Line::Quit);
        assert_eq!(parse_line(":relays"), Line::Relays);
        assert_eq!(parse_line(":relay"), Line::Relays);
        assert_eq!(parse_line(":relay  2 "), Line::Relay("2".to_string()));
        assert_eq!(parse_line(":cancel"), Line::Cancel);
        assert_eq!(parse_line(":nope"), Line::Unknown(":nope".to_string()));
    }

    #[test]
    fn test_relay_argument() {
        let relays = RelaySet::default();
        assert_eq!(relay_argument("1", &relays), DEFAULT_RELAY);
        assert_eq!(relay_argument("2", &relays), ALTERNATE_RELAY);
        // Out of range indexes are passed through as text
        assert_eq!(relay_argument("0", &relays), "0");
        assert_eq!(relay_argument("3", &relays), "3");
        assert_eq!(relay_argument("http://x/", &relays), "http://x/");
    }

    #[tokio::test]
    async fn test_shell_lookup_found() {
        let transport = MockTransport::new(200);
        let output = run_shell(transport.clone(), "B002QYW8LW\n").await;

        assert!(output.contains("Type an ASIN"));
        assert!(output.contains("Product found."));
        assert_eq!(transport.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shell_invalid_input_shows_hint() {
        let transport = MockTransport::new(200);
        let output = run_shell(transport.clone(), "B0-2\n").await;

        assert!(output.contains("Amazon Standard Identification Numbers"));
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shell_relay_switch_after_unavailable() {
        let transport = MockTransport::new(503);
        let output = run_shell(transport.clone(), "B002QYW8LW\n:relay 2\n").await;

        assert!(output.contains("Service is unavailable at this moment."));
        assert!(output.contains(&format!("{}  (current)", ALTERNATE_RELAY)));
        // Switching relays never retries on its own
        assert_eq!(transport.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shell_lists_relays_and_quits() {
        let transport = MockTransport::new(200);
        let output = run_shell(transport.clone(), ":relays\n:quit\nB002QYW8LW\n").await;

        assert!(output.contains("Known relays:"));
        assert!(output.contains(&format!("[1] {}  (current)", DEFAULT_RELAY)));
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shell_unknown_command() {
        let output = run_shell(MockTransport::new(200), ":frobnicate\n").await;
        assert!(output.contains("Unknown command: :frobnicate"));
    }

    #[test]
    fn test_render_key_distinguishes_identifiers() {
        let first = resolved("B002QYW8LW");
        let second = resolved("B000000001");

        assert_ne!(render_key(&first), render_key(&second));
        assert_eq!(render_key(&first), render_key(&first.clone()));
    }

    #[test]
    fn test_render_key_ignores_keystrokes() {
        let before = resolved("B002QYW8LW");
        let after = Snapshot { input: "B00".to_string(), ..before.clone() };
        assert_eq!(render_key(&before), render_key(&after));
    }

    #[tokio::test]
    async fn test_shell_cancel_abandons_lookup() {
        let transport = Arc::new(GatedTransport { gate: Notify::new() });
        let mut output = Vec::new();

        // Without the cancel, the shell would wait on the gated lookup forever
        let run = ShellCommand::new(Config::default()).execute_with(
            transport,
            "B002QYW8LW\n:cancel\n".as_bytes(),
            &mut output,
        );
        tokio::time::timeout(Duration::from_secs(5), run).await.unwrap().unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(!output.contains("Product found."));
        assert!(!output.contains("Product not found."));
    }
}

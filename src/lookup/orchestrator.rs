//! Drives the lookup state machine against a real transport.
//!
//! The orchestrator is the only writer of [`LookupState`]. Requests run on a
//! spawned task and report back through a channel, so all transitions happen
//! on whichever task owns the orchestrator.

use crate::config::Config;
use crate::lookup::error::LookupError;
use crate::lookup::machine::{Effect, Event, LookupState, Phase, SessionId};
use crate::lookup::relay::{RelayEndpoint, RelaySet};
use crate::lookup::status::{interpret, StatusView};
use crate::lookup::target::TargetUrl;
use crate::lookup::transport::Transport;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Consumer of successful payloads (product-detail extraction).
pub trait Extractor: Send {
    fn extract(&mut self, payload: &str, target: &TargetUrl, identifier: &str) -> Result<()>;
}

/// Read-only view published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Current input text.
    pub input: String,
    pub is_valid: bool,
    pub phase: Phase,
    pub in_flight: bool,
    /// Identifier of the latest session, if any.
    pub identifier: Option<String>,
    pub http_status: Option<u16>,
    /// Relay the next submission will use.
    pub relay: RelayEndpoint,
    pub status: StatusView,
}

/// Inbound events from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Submit,
    SelectRelay(String),
    Cancel,
}

pub struct Orchestrator {
    state: LookupState,
    relays: RelaySet,
    transport: Arc<dyn Transport>,
    extractor: Box<dyn Extractor>,
    completions_tx: mpsc::UnboundedSender<Event>,
    completions_rx: mpsc::UnboundedReceiver<Event>,
    snapshots: watch::Sender<Snapshot>,
    in_flight: Option<(SessionId, CancellationToken)>,
}

impl Orchestrator {
    pub fn new(
        state: LookupState,
        relays: RelaySet,
        transport: Arc<dyn Transport>,
        extractor: impl Extractor + 'static,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let initial = build_snapshot(&state, &relays);
        let (snapshots, _) = watch::channel(initial);

        Self {
            state,
            relays,
            transport,
            extractor: Box::new(extractor),
            completions_tx,
            completions_rx,
            snapshots,
            in_flight: None,
        }
    }

    /// Creates an orchestrator with the target, relay and relay set from `config`.
    pub fn from_config(
        config: &Config,
        transport: Arc<dyn Transport>,
        extractor: impl Extractor + 'static,
    ) -> Self {
        let state = LookupState::new(config.target(), config.relay_endpoint());
        Self::new(state, config.relay_set(), transport, extractor)
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn relays(&self) -> &RelaySet {
        &self.relays
    }

    pub fn snapshot(&self) -> Snapshot {
        build_snapshot(&self.state, &self.relays)
    }

    /// Subscribes to snapshots; a new one is published after every event.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    pub fn text_changed(&mut self, text: impl Into<String>) {
        self.dispatch(Event::TextChanged(text.into()));
    }

    /// Submits the current input.
    ///
    /// Returns the new session id, or `None` when the submit was dropped
    /// (invalid or empty input, or a lookup already in flight). Must be
    /// called from within a Tokio runtime.
    pub fn submit(&mut self) -> Option<SessionId> {
        if let Err(e) = self.state.check_submit() {
            debug!("Submit ignored: {}", e);
            return None;
        }

        self.dispatch(Event::Submit);
        self.state.session().map(|s| s.id)
    }

    /// Switches the relay used by the next submission.
    pub fn select_relay(&mut self, candidate: &str) -> Result<(), LookupError> {
        let relay = self.relays.select(candidate)?;
        info!("Relay set to {}", relay);
        self.dispatch(Event::RelaySelected(relay));
        Ok(())
    }

    /// Abandons the lookup in flight, if any.
    pub fn cancel(&mut self) {
        self.dispatch(Event::Cancel);
    }

    pub fn handle_input(&mut self, input: Input) {
        match input {
            Input::Text(text) => self.text_changed(text),
            Input::Submit => {
                self.submit();
            }
            Input::SelectRelay(candidate) => {
                if let Err(e) = self.select_relay(&candidate) {
                    warn!("{}", e);
                }
            }
            Input::Cancel => self.cancel(),
        }
    }

    /// Waits until no lookup is in flight and returns the resulting snapshot.
    ///
    /// Returns immediately when idle or resolved. With a transport that never
    /// answers this waits forever; the HTTP client's timeout bounds it.
    pub async fn settle(&mut self) -> Snapshot {
        while self.state.phase() == Phase::InFlight {
            match self.completions_rx.recv().await {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
        self.snapshot()
    }

    /// Processes inputs until the channel closes, then lets the last lookup finish.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<Input>) -> Snapshot {
        enum Step {
            Input(Option<Input>),
            Completion(Event),
        }

        loop {
            let step = tokio::select! {
                input = inputs.recv() => Step::Input(input),
                Some(event) = self.completions_rx.recv() => Step::Completion(event),
            };

            match step {
                Step::Input(Some(input)) => self.handle_input(input),
                Step::Input(None) => break,
                Step::Completion(event) => self.dispatch(event),
            }
        }

        self.settle().await
    }

    fn dispatch(&mut self, event: Event) {
        trace!("Event: {:?}", event);

        let (state, effect) = std::mem::take(&mut self.state).apply(event);
        self.state = state;

        if let Some(effect) = effect {
            self.perform(effect);
        }
        if self.state.phase() != Phase::InFlight {
            self.in_flight = None;
        }

        self.snapshots.send_replace(self.snapshot());
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::Send { session, url } => {
                info!("Lookup {} started: GET {}", session, url);

                let token = CancellationToken::new();
                let cancelled = token.clone();
                let transport = Arc::clone(&self.transport);
                let completions = self.completions_tx.clone();

                tokio::spawn(async move {
                    tokio::select! {
                        _ = cancelled.cancelled() => {
                            debug!("Lookup {} cancelled", session);
                        }
                        response = transport.get(&url) => {
                            if response.is_failure() {
                                debug!("Lookup {} got no response", session);
                            } else {
                                debug!("Lookup {} completed with status {}", session, response.status);
                            }
                            // The orchestrator may already be gone
                            let _ = completions.send(Event::Completed { session, response });
                        }
                    }
                });

                self.in_flight = Some((session, token));
            }

            Effect::Extract { payload, target, identifier } => {
                info!("Product {} found ({} bytes)", identifier, payload.len());
                if let Err(e) = self.extractor.extract(&payload, &target, &identifier) {
                    warn!("Extraction failed for {}: {:#}", identifier, e);
                }
            }

            Effect::Cancel { session } => {
                if let Some((id, token)) = self.in_flight.take() {
                    debug!("Cancelling lookup {}", id);
                    token.cancel();
                } else {
                    debug!("Lookup {} had no outstanding request", session);
                }
            }
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        if let Some((_, token)) = self.in_flight.take() {
            token.cancel();
        }
    }
}

fn build_snapshot(state: &LookupState, relays: &RelaySet) -> Snapshot {
    let http_status = state.http_status();
    Snapshot {
        input: state.input().to_string(),
        is_valid: state.is_valid(),
        phase: state.phase(),
        in_flight: state.phase() == Phase::InFlight,
        identifier: state.session().map(|s| s.identifier.clone()),
        http_status,
        relay: state.relay().clone(),
        status: interpret(http_status, relays, state.relay()),
    }
}

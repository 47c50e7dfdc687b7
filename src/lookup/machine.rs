//! Lookup state machine.
//!
//! `LookupState::apply` is a pure `(state, event) -> (state, effect)`
//! transition. It performs no I/O; the orchestrator carries out the returned
//! effect.

use crate::lookup::error::LookupError;
use crate::lookup::relay::RelayEndpoint;
use crate::lookup::target::TargetUrl;
use crate::lookup::transport::RelayResponse;
use crate::lookup::validator;
use serde::Serialize;
use std::fmt;

/// Lifecycle phase of the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    InFlight,
    Resolved,
}

/// Identifies one submitted lookup. Completions carrying a stale id are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One submitted lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSession {
    pub id: SessionId,
    /// Trimmed copy of the input at submit time.
    pub identifier: String,
    /// Relay in use at submit time.
    pub relay: RelayEndpoint,
    pub request_url: String,
    pub http_status: Option<u16>,
    /// Raw body, kept only for a 200.
    pub payload: Option<String>,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TextChanged(String),
    Submit,
    Completed { session: SessionId, response: RelayResponse },
    RelaySelected(RelayEndpoint),
    Cancel,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue one GET for the session.
    Send { session: SessionId, url: String },
    /// Hand a 200 payload to the extraction consumer.
    Extract { payload: String, target: TargetUrl, identifier: String },
    /// Abort the session's outstanding request.
    Cancel { session: SessionId },
}

/// Complete workflow state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupState {
    target: TargetUrl,
    relay: RelayEndpoint,
    input: String,
    is_valid: bool,
    phase: Phase,
    session: Option<LookupSession>,
    next_session: u64,
}

impl LookupState {
    pub fn new(target: TargetUrl, relay: RelayEndpoint) -> Self {
        Self {
            target,
            relay,
            input: String::new(),
            is_valid: true,
            phase: Phase::Idle,
            session: None,
            next_session: 1,
        }
    }

    pub fn target(&self) -> &TargetUrl {
        &self.target
    }

    /// Relay the next submission will use.
    pub fn relay(&self) -> &RelayEndpoint {
        &self.relay
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> Option<&LookupSession> {
        self.session.as_ref()
    }

    pub fn http_status(&self) -> Option<u16> {
        self.session.as_ref().and_then(|s| s.http_status)
    }

    /// Checks the submit guard without changing anything.
    pub fn check_submit(&self) -> Result<(), LookupError> {
        if self.phase == Phase::InFlight {
            let identifier = self.session.as_ref().map(|s| s.identifier.clone()).unwrap_or_default();
            return Err(LookupError::RequestRejected(identifier));
        }
        if !self.is_valid {
            return Err(LookupError::InvalidIdentifier(self.input.clone()));
        }
        if self.input.trim().is_empty() {
            return Err(LookupError::EmptyIdentifier);
        }
        Ok(())
    }

    /// Applies one event.
    pub fn apply(mut self, event: Event) -> (Self, Option<Effect>) {
        match event {
            Event::TextChanged(text) => {
                let verdict = validator::validate(&text);
                self.input = verdict.text;
                self.is_valid = verdict.is_valid;
                (self, None)
            }

            Event::Submit => {
                if self.check_submit().is_err() {
                    return (self, None);
                }

                let id = SessionId(self.next_session);
                self.next_session += 1;

                let identifier = self.input.trim().to_string();
                let request_url = self.relay.wrap(&self.target.upstream_for(&identifier));

                self.session = Some(LookupSession {
                    id,
                    identifier,
                    relay: self.relay.clone(),
                    request_url: request_url.clone(),
                    http_status: None,
                    payload: None,
                });
                self.phase = Phase::InFlight;

                (self, Some(Effect::Send { session: id, url: request_url }))
            }

            Event::Completed { session, response } => {
                let is_current = self.phase == Phase::InFlight
                    && self.session.as_ref().is_some_and(|s| s.id == session);
                if !is_current {
                    return (self, None);
                }

                let mut effect = None;
                if let Some(current) = self.session.as_mut() {
                    current.http_status = Some(response.status);
                    if response.status == 200 {
                        current.payload = Some(response.body.clone());
                        effect = Some(Effect::Extract {
                            payload: response.body,
                            target: self.target.clone(),
                            identifier: current.identifier.clone(),
                        });
                    }
                }

                self.phase = Phase::Resolved;
                (self, effect)
            }

            Event::RelaySelected(relay) => {
                self.relay = relay;
                (self, None)
            }

            Event::Cancel => {
                if self.phase != Phase::InFlight {
                    return (self, None);
                }
                self.phase = Phase::Idle;
                let effect = self.session.take().map(|s| Effect::Cancel { session: s.id });
                (self, effect)
            }
        }
    }
}

impl Default for LookupState {
    fn default() -> Self {
        Self::new(TargetUrl::default(), RelayEndpoint::default())
    }
}

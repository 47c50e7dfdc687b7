//! ASIN lookup workflow: validation, relay policy, state machine and orchestration.

pub mod error;
pub mod machine;
pub mod orchestrator;
pub mod relay;
pub mod status;
pub mod target;
pub mod transport;
pub mod validator;

pub use error::LookupError;
pub use machine::{Effect, Event, LookupSession, LookupState, Phase, SessionId};
pub use orchestrator::{Extractor, Input, Orchestrator, Snapshot};
pub use relay::{RelayEndpoint, RelayOffer, RelaySet, ALTERNATE_RELAY, DEFAULT_RELAY};
pub use status::{interpret, StatusView};
pub use target::TargetUrl;
pub use transport::{RelayResponse, Transport};
pub use validator::{validate, Validation, INVALID_ASIN_HINT};

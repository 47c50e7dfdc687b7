//! asin-lookup - Look up Amazon products by ASIN through a CORS relay
//!
//! Input validation, a lookup state machine with relay failover, and a
//! wreq-based transport with TLS fingerprint emulation.

pub mod amazon;
pub mod commands;
pub mod config;
pub mod format;
pub mod lookup;

pub use amazon::regions::Region;
pub use config::Config;
pub use lookup::{Orchestrator, Snapshot, StatusView};

//! CLI command implementations.

pub mod lookup;
pub mod shell;
pub mod sink;

pub use lookup::LookupCommand;
pub use shell::ShellCommand;
pub use sink::PayloadSink;

//! Amazon-specific modules: storefront regions and the relay HTTP client.

pub mod client;
pub mod regions;

pub use client::RelayClient;
pub use regions::Region;

//! Metadata provider identities and the registry holding them.

pub mod provider;
pub mod registry;

pub use provider::ProviderInfo;
pub use registry::ProviderRegistry;

//! Inbound ports. Front-ends and the provider shim call into the application.

use crate::domain::DomainError;

/// Input port: a front-end (console, UI) drives reminder management until it exits.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    async fn run(&self) -> Result<(), DomainError>;
}

/// Raw callback body delivered by the geofencing provider. Decoded by the ingestion path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPayload(pub Vec<u8>);

impl From<&str> for ProviderPayload {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for ProviderPayload {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

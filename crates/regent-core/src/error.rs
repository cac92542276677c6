use thiserror::Error;

use crate::crypto::CryptoError;

/// Boxed error returned by device and transfer client factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by registry lookups, resolution and provider
/// environment injection.
#[derive(Debug, Error)]
pub enum RegistryError {
    // ── Lookup ───────────────────────────────────────────────────────
    #[error("could not find {item_type} {name}")]
    ItemNotFound {
        item_type: &'static str,
        name: String,
    },

    // ── Transform ────────────────────────────────────────────────────
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    // ── Client construction ──────────────────────────────────────────
    #[error("could not create client for node {node}: node not found in environment {environment}")]
    EndpointNotFound { node: String, environment: String },

    #[error("could not create client for node {node} in environment {environment}: {source}")]
    ClientConstruction {
        node: String,
        environment: String,
        #[source]
        source: BoxError,
    },

    // ── Primary resolution ───────────────────────────────────────────
    #[error("no management node defined for environment {environment}")]
    NoManagementNode { environment: String },

    #[error("no individual nodes defined for environment {environment}")]
    NoIndividualNodes { environment: String },

    #[error("could not determine status for node {node} in environment {environment}: {source}")]
    PrimaryStatus {
        node: String,
        environment: String,
        #[source]
        source: BoxError,
    },

    #[error("could not find a primary node for environment {environment}")]
    NoPrimaryNode { environment: String },

    // ── Provider environment ─────────────────────────────────────────
    #[error("could not set environment variable '{key}': {reason}")]
    EnvironmentVariable { key: String, reason: String },
}

impl RegistryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound { .. })
    }

    /// Errors raised while building a device or transfer client.
    pub fn is_client_construction(&self) -> bool {
        matches!(
            self,
            Self::EndpointNotFound { .. } | Self::ClientConstruction { .. }
        )
    }

    /// Errors raised by primary-node resolution itself, as opposed to
    /// the client construction it depends on.
    pub fn is_primary_resolution(&self) -> bool {
        matches!(
            self,
            Self::NoManagementNode { .. }
                | Self::NoIndividualNodes { .. }
                | Self::PrimaryStatus { .. }
                | Self::NoPrimaryNode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = RegistryError::ItemNotFound {
            item_type: "organization",
            name: "acme".into(),
        };
        assert_eq!(err.to_string(), "could not find organization acme");
        assert!(err.is_not_found());
    }

    #[test]
    fn classification() {
        let err = RegistryError::NoPrimaryNode {
            environment: "prod".into(),
        };
        assert!(err.is_primary_resolution());
        assert!(!err.is_client_construction());

        let err = RegistryError::EndpointNotFound {
            node: "ns9".into(),
            environment: "prod".into(),
        };
        assert!(err.is_client_construction());
    }
}

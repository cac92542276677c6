// ── Device and transfer client seams ──
//
// The resolver never talks to an appliance directly; it asks a factory
// for a client and the client for its HA state. `NitroClientFactory` is
// the production implementation, tests substitute their own.

use std::future::Future;
use std::path::PathBuf;

use secrecy::SecretString;

use regent_api::{ConnectionSettings, NitroClient, NitroCredentials};

use crate::error::BoxError;
use crate::model::{Credential, Node, Settings};

/// Port used for file transfers to an appliance.
pub const SSH_PORT: u16 = 22;

// ── Device clients ──────────────────────────────────────────────────

/// A connected device API client.
pub trait DeviceClient {
    fn node_name(&self) -> &str;

    /// Whether the node currently holds the primary role of its HA pair.
    fn is_primary_node(&self) -> impl Future<Output = Result<bool, BoxError>> + Send;
}

/// Builds device clients for environment endpoints.
pub trait DeviceClientFactory {
    type Client: DeviceClient;

    fn new_client(
        &self,
        node: &Node,
        credential: &Credential,
        settings: &Settings,
    ) -> Result<Self::Client, BoxError>;
}

/// Builds NITRO REST clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct NitroClientFactory;

impl DeviceClientFactory for NitroClientFactory {
    type Client = NitroClient;

    fn new_client(
        &self,
        node: &Node,
        credential: &Credential,
        settings: &Settings,
    ) -> Result<NitroClient, BoxError> {
        let credentials = NitroCredentials::new(&credential.username, &credential.password);
        let client = NitroClient::new(
            &node.name,
            &node.address,
            credentials,
            &ConnectionSettings::from(settings),
        )?;
        Ok(client)
    }
}

impl DeviceClient for NitroClient {
    fn node_name(&self) -> &str {
        self.name()
    }

    async fn is_primary_node(&self) -> Result<bool, BoxError> {
        Ok(NitroClient::is_primary_node(self).await?)
    }
}

// ── File transfer ───────────────────────────────────────────────────

/// How the transfer client verifies the appliance's SSH host key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Check against an OpenSSH `known_hosts` file.
    KnownHosts(PathBuf),
    /// Accept only this SHA-256 fingerprint (`SHA256:...`).
    Fingerprint(String),
    /// Accept any host key.
    AcceptAny,
}

/// Password-authenticated SSH session parameters.
#[derive(Debug, Clone)]
pub struct SshConfig {
    pub username: String,
    pub password: SecretString,
    pub host_key: HostKeyPolicy,
}

impl SshConfig {
    pub fn with_password(credential: &Credential, host_key: HostKeyPolicy) -> Self {
        Self {
            username: credential.username.clone(),
            password: SecretString::from(credential.password.clone()),
            host_key,
        }
    }
}

/// Builds SCP clients.
pub trait TransferClientFactory {
    type Client;

    /// `address` is `host:port`.
    fn new_scp_client(&self, address: &str, config: SshConfig) -> Result<Self::Client, BoxError>;
}

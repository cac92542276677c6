// ── Environment resolver ──
//
// Endpoint selection and client construction over a single environment.
// Primary resolution prefers the management address and otherwise probes
// the HA peers one at a time, in declaration order.

use tracing::{debug, info};

use crate::device::{
    DeviceClient, DeviceClientFactory, HostKeyPolicy, SSH_PORT, SshConfig, TransferClientFactory,
};
use crate::error::RegistryError;
use crate::model::{Credential, Environment, Node};

impl Environment {
    /// The management node, unless absent or left at its default.
    pub fn management_node(&self) -> Option<&Node> {
        self.management
            .as_ref()
            .filter(|node| **node != Node::default())
    }

    pub fn has_management(&self) -> bool {
        self.management_node().is_some()
    }

    pub fn has_nodes(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Peer nodes in order, followed by the management node if present.
    pub fn all_endpoints(&self) -> Vec<&Node> {
        self.nodes.iter().chain(self.management_node()).collect()
    }

    pub fn resolve_credential(&self, name: &str) -> Result<&Credential, RegistryError> {
        self.credentials.find_by_name(name)
    }

    fn endpoint(&self, node_name: &str) -> Result<&Node, RegistryError> {
        self.all_endpoints()
            .into_iter()
            .find(|node| node.name == node_name)
            .ok_or_else(|| RegistryError::EndpointNotFound {
                node: node_name.to_owned(),
                environment: self.name.clone(),
            })
    }

    fn connect<F: DeviceClientFactory>(
        &self,
        factory: &F,
        node: &Node,
        credential: &Credential,
    ) -> Result<F::Client, RegistryError> {
        debug!(environment = %self.name, node = %node.name, "building device client");
        factory
            .new_client(node, credential, &self.settings)
            .map_err(|source| RegistryError::ClientConstruction {
                node: node.name.clone(),
                environment: self.name.clone(),
                source,
            })
    }

    /// Client for any endpoint of this environment, management included.
    pub fn build_client<F: DeviceClientFactory>(
        &self,
        factory: &F,
        node_name: &str,
        credential: &Credential,
    ) -> Result<F::Client, RegistryError> {
        let node = self.endpoint(node_name)?;
        self.connect(factory, node, credential)
    }

    pub fn build_management_client<F: DeviceClientFactory>(
        &self,
        factory: &F,
        credential: &Credential,
    ) -> Result<F::Client, RegistryError> {
        let node = self
            .management_node()
            .ok_or_else(|| RegistryError::NoManagementNode {
                environment: self.name.clone(),
            })?;
        self.connect(factory, node, credential)
    }

    /// Client for the node currently able to take configuration changes.
    ///
    /// A buildable management client is returned as-is, without asking it
    /// anything. Otherwise each peer is probed in order and the first one
    /// reporting primary wins; a failed probe aborts the search.
    pub async fn resolve_primary_client<F: DeviceClientFactory>(
        &self,
        factory: &F,
        credential: &Credential,
    ) -> Result<F::Client, RegistryError> {
        match self.build_management_client(factory, credential) {
            Ok(client) => {
                info!(
                    environment = %self.name,
                    node = %client.node_name(),
                    "using management node"
                );
                return Ok(client);
            }
            Err(err) => debug!(environment = %self.name, "{err}, probing peer nodes"),
        }

        if !self.has_nodes() {
            return Err(RegistryError::NoIndividualNodes {
                environment: self.name.clone(),
            });
        }

        for node in &self.nodes {
            let client = self.connect(factory, node, credential)?;
            let primary =
                client
                    .is_primary_node()
                    .await
                    .map_err(|source| RegistryError::PrimaryStatus {
                        node: node.name.clone(),
                        environment: self.name.clone(),
                        source,
                    })?;

            if primary {
                info!(environment = %self.name, node = %node.name, "found primary node");
                return Ok(client);
            }
            debug!(environment = %self.name, node = %node.name, "node is not primary");
        }

        Err(RegistryError::NoPrimaryNode {
            environment: self.name.clone(),
        })
    }

    /// SCP client for an endpoint, authenticated with the credential's
    /// username and password.
    pub fn build_transfer_client<F: TransferClientFactory>(
        &self,
        factory: &F,
        node_name: &str,
        credential: &Credential,
        host_key: HostKeyPolicy,
    ) -> Result<F::Client, RegistryError> {
        let node = self.endpoint(node_name)?;
        let address = format!("{}:{SSH_PORT}", node.address);
        debug!(environment = %self.name, node = %node.name, "building transfer client");

        factory
            .new_scp_client(&address, SshConfig::with_password(credential, host_key))
            .map_err(|source| RegistryError::ClientConstruction {
                node: node.name.clone(),
                environment: self.name.clone(),
                source,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::BoxError;

    fn env() -> Environment {
        Environment {
            name: "prod".into(),
            management: Some(Node::new("snip", "10.0.0.10")),
            nodes: vec![Node::new("ns1", "10.0.0.11"), Node::new("ns2", "10.0.0.12")].into(),
            credentials: vec![Credential::new("admin", "nsroot", "secret")].into(),
            ..Environment::default()
        }
    }

    #[test]
    fn endpoints_list_peers_then_management() {
        let env = env();
        let names: Vec<_> = env.all_endpoints().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["ns1", "ns2", "snip"]);
    }

    #[test]
    fn default_management_node_counts_as_absent() {
        let mut env = env();
        env.management = Some(Node::default());
        assert!(!env.has_management());
        assert_eq!(env.all_endpoints().len(), 2);

        env.management = None;
        assert!(!env.has_management());
    }

    #[test]
    fn credential_lookup() {
        let env = env();
        assert_eq!(env.resolve_credential("admin").unwrap().username, "nsroot");
        assert!(env.resolve_credential("viewer").unwrap_err().is_not_found());
    }

    struct RecordingTransfer;

    impl TransferClientFactory for RecordingTransfer {
        type Client = (String, String);

        fn new_scp_client(
            &self,
            address: &str,
            config: SshConfig,
        ) -> Result<Self::Client, BoxError> {
            Ok((address.to_owned(), config.username))
        }
    }

    #[test]
    fn transfer_client_targets_ssh_port() {
        let env = env();
        let credential = env.resolve_credential("admin").unwrap();
        let (address, username) = env
            .build_transfer_client(&RecordingTransfer, "ns2", credential, HostKeyPolicy::AcceptAny)
            .unwrap();
        assert_eq!(address, "10.0.0.12:22");
        assert_eq!(username, "nsroot");
    }

    #[test]
    fn transfer_client_for_unknown_node() {
        let env = env();
        let credential = env.resolve_credential("admin").unwrap();
        let err = env
            .build_transfer_client(&RecordingTransfer, "ns9", credential, HostKeyPolicy::AcceptAny)
            .unwrap_err();
        assert!(err.is_client_construction());
    }
}

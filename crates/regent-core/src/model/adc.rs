// ── NetScaler ADC environments ──

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use regent_api::ConnectionSettings;

use super::named::{NamedList, named};
use super::pair::entity_pair;

entity_pair! {
    /// One NetScaler ADC endpoint: an NSIP of an HA peer, or the SNIP /
    /// cluster IP used for management.
    pub struct Node / SecureNode {
        clear name: String,
        secret address: String,
    }
}

entity_pair! {
    /// Login for the NITRO API of an environment.
    pub struct Credential / SecureCredential {
        clear name: String,
        secret username: String,
        secret password: String,
    }
}

entity_pair! {
    /// A deployment target, such as "production", made of HA peer nodes and
    /// an optional management address.
    pub struct Environment / SecureEnvironment {
        clear name: String,
        nested management: Option<Node>,
        nested nodes: NamedList<Node>,
        nested credentials: NamedList<Credential>,
        clear settings: Settings,
    }
}

entity_pair! {
    pub struct AdcRegistry / SecureAdcRegistry {
        nested environments: NamedList<Environment>,
    }
}

entity_pair! {
    /// Placeholder for SDX appliances; holds no data yet.
    pub struct SdxRegistry / SecureSdxRegistry {}
}

entity_pair! {
    pub struct NetScalerRegistry / SecureNetScalerRegistry {
        nested adc: AdcRegistry,
        nested sdx: SdxRegistry,
    }
}

named!("netscaler adc node" => Node, SecureNode; name);
named!("netscaler adc credential" => Credential, SecureCredential; name);
named!("netscaler adc environment" => Environment, SecureEnvironment; name);

impl Node {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl Credential {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

// ── Connection settings ─────────────────────────────────────────────

/// NITRO connection settings of an environment. Never encrypted.
///
/// Missing keys read as zero values: documents omit fields that are
/// `false`, `0` or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub use_ssl: bool,
    /// Request timeout in seconds; 0 means the client default.
    pub timeout: u64,
    pub user_agent: String,
    pub validate_server_certificate: bool,
    pub log_tls_secrets: bool,
    pub log_tls_secrets_destination: String,
    pub auto_login: bool,
}

impl From<&Settings> for ConnectionSettings {
    fn from(settings: &Settings) -> Self {
        let defaults = ConnectionSettings::default();
        Self {
            use_ssl: settings.use_ssl,
            timeout: match settings.timeout {
                0 => defaults.timeout,
                secs => Duration::from_secs(secs),
            },
            user_agent: if settings.user_agent.is_empty() {
                defaults.user_agent
            } else {
                settings.user_agent.clone()
            },
            validate_server_certificate: settings.validate_server_certificate,
            log_tls_secrets: settings.log_tls_secrets,
            log_tls_secrets_destination: (!settings.log_tls_secrets_destination.is_empty())
                .then(|| PathBuf::from(&settings.log_tls_secrets_destination)),
            auto_login: settings.auto_login,
        }
    }
}

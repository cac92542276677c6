// Connection settings for building reqwest::Client instances.
//
// Mirrors the per-environment `settings` block of the registry. Every
// appliance client in an environment is built from the same settings.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use tracing::warn;

use crate::error::Error;

/// Login material for one appliance.
#[derive(Debug, Clone)]
pub struct NitroCredentials {
    pub username: String,
    pub password: SecretString,
}

impl NitroCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Connection policy shared by every client of an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// `https` when set, plain `http` otherwise.
    pub use_ssl: bool,
    pub timeout: Duration,
    pub user_agent: String,
    pub validate_server_certificate: bool,
    pub log_tls_secrets: bool,
    pub log_tls_secrets_destination: Option<PathBuf>,
    /// Open a NITRO session up front instead of sending credentials
    /// as headers on every request.
    pub auto_login: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            use_ssl: true,
            timeout: Duration::from_secs(30),
            user_agent: concat!("regent/", env!("CARGO_PKG_VERSION")).into(),
            validate_server_certificate: true,
            log_tls_secrets: false,
            log_tls_secrets_destination: None,
            auto_login: false,
        }
    }
}

impl ConnectionSettings {
    pub fn scheme(&self) -> &'static str {
        if self.use_ssl { "https" } else { "http" }
    }

    /// Build a `reqwest::Client` from these settings.
    ///
    /// The client keeps a cookie store so a NITRO session opened by
    /// `login` is reused by later requests.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .cookie_store(true);

        if !self.validate_server_certificate {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if self.log_tls_secrets {
            warn!(
                destination = ?self.log_tls_secrets_destination,
                "TLS secret logging is not supported by the HTTP stack, ignoring"
            );
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

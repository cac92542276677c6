// NITRO HTTP client
//
// Wraps `reqwest::Client` with NITRO URL construction, envelope
// unwrapping and the two authentication modes: credential headers on
// every request, or a session opened once via `login` (auto-login).

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::nitro::models::{HaNode, LoginPayload, LoginRequest, NitroEnvelope};
use crate::transport::{ConnectionSettings, NitroCredentials};

const CONFIG_PATH: &str = "/nitro/v1/config";

/// Client for the NITRO configuration API of one appliance.
pub struct NitroClient {
    http: reqwest::Client,
    name: String,
    base_url: Url,
    credentials: NitroCredentials,
    auto_login: bool,
    /// Set once a session has been opened; only used with auto-login.
    session: OnceCell<()>,
}

impl std::fmt::Debug for NitroClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NitroClient")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .field("auto_login", &self.auto_login)
            .finish_non_exhaustive()
    }
}

impl NitroClient {
    /// Create a client for the appliance reachable at `address`.
    ///
    /// `address` is an IP or FQDN, optionally with a port. An explicit
    /// scheme (`https://...`) wins over `settings.use_ssl`. No request is
    /// sent until the first call.
    pub fn new(
        name: impl Into<String>,
        address: &str,
        credentials: NitroCredentials,
        settings: &ConnectionSettings,
    ) -> Result<Self, Error> {
        let base_url = if address.contains("://") {
            Url::parse(address)?
        } else {
            Url::parse(&format!("{}://{address}", settings.scheme()))?
        };
        let http = settings.build_client()?;

        Ok(Self {
            http,
            name: name.into(),
            base_url,
            credentials,
            auto_login: settings.auto_login,
            session: OnceCell::new(),
        })
    }

    /// The node name this client was built for.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Open a NITRO session. The appliance answers with a
    /// `NITRO_AUTH_TOKEN` cookie that the client's cookie store keeps.
    pub async fn login(&self) -> Result<(), Error> {
        let url = self.config_url("login")?;
        debug!(node = %self.name, "logging in at {}", url);

        let body = LoginRequest {
            login: LoginPayload {
                username: &self.credentials.username,
                password: self.credentials.password.expose_secret(),
            },
        };

        let resp = self.http.post(url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        debug!(node = %self.name, "login successful");
        Ok(())
    }

    async fn ensure_session(&self) -> Result<(), Error> {
        if self.auto_login {
            self.session.get_or_try_init(|| self.login()).await?;
        }
        Ok(())
    }

    /// Header authentication unless a session is in use.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.auto_login {
            builder
        } else {
            builder
                .header("X-NITRO-USER", &self.credentials.username)
                .header("X-NITRO-PASS", self.credentials.password.expose_secret())
        }
    }

    // ── HA status ────────────────────────────────────────────────────

    /// Fetch the local HA node entry (`hanode` id 0).
    pub async fn local_ha_node(&self) -> Result<HaNode, Error> {
        let mut nodes: Vec<HaNode> = self.get("hanode", Some("0")).await?;
        if nodes.is_empty() {
            return Err(Error::UnexpectedResponse(format!(
                "no hanode entry returned by {}",
                self.name
            )));
        }
        Ok(nodes.swap_remove(0))
    }

    /// Ask the appliance whether it is currently the primary node.
    pub async fn is_primary_node(&self) -> Result<bool, Error> {
        let node = self.local_ha_node().await?;
        trace!(node = %self.name, state = ?node.state, "hanode state");
        Ok(node.is_primary())
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn config_url(&self, resource: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("{CONFIG_PATH}/{resource}"))?)
    }

    /// GET a configuration resource and unwrap its array from the envelope.
    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: Option<&str>,
    ) -> Result<Vec<T>, Error> {
        self.ensure_session().await?;

        let path = match id {
            Some(id) => format!("{resource}/{id}"),
            None => resource.to_owned(),
        };
        let url = self.config_url(&path)?;
        debug!("GET {}", url);

        let resp = self.authorize(self.http.get(url)).send().await?;
        parse_envelope(resp, resource).await
    }
}

/// Decode the NITRO envelope, mapping `errorcode != 0` and HTTP failures
/// to errors and returning the `resource` array otherwise.
async fn parse_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
    resource: &str,
) -> Result<Vec<T>, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    let envelope: Option<NitroEnvelope> = serde_json::from_str(&body).ok();

    if !status.is_success() {
        let (errorcode, message) = envelope.map_or_else(
            || (-1, format!("HTTP {status}: {}", preview(&body))),
            |e| (e.errorcode, e.message),
        );
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication { message });
        }
        return Err(Error::Nitro {
            errorcode,
            message,
            status: status.as_u16(),
        });
    }

    let Some(mut envelope) = envelope else {
        return Err(Error::Deserialization {
            message: format!("not a NITRO envelope (body preview: {:?})", preview(&body)),
            body,
        });
    };

    if envelope.errorcode != 0 {
        return Err(Error::Nitro {
            errorcode: envelope.errorcode,
            message: envelope.message,
            status: status.as_u16(),
        });
    }

    let Some(items) = envelope.resources.remove(resource) else {
        return Ok(Vec::new());
    };

    serde_json::from_value(items).map_err(|e| Error::Deserialization {
        message: format!("{resource}: {e}"),
        body,
    })
}

fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn settings(use_ssl: bool) -> ConnectionSettings {
        ConnectionSettings {
            use_ssl,
            ..ConnectionSettings::default()
        }
    }

    #[test]
    fn base_url_uses_settings_scheme() {
        let creds = NitroCredentials::new("nsroot", "secret");
        let client = NitroClient::new("ns1", "10.0.0.1", creds, &settings(true)).unwrap();
        assert_eq!(client.base_url().as_str(), "https://10.0.0.1/");
    }

    #[test]
    fn explicit_scheme_wins() {
        let creds = NitroCredentials::new("nsroot", "secret");
        let client =
            NitroClient::new("ns1", "http://adc.example.com:8080", creds, &settings(true)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://adc.example.com:8080/");
    }

    #[test]
    fn invalid_address_is_rejected() {
        let creds = NitroCredentials::new("nsroot", "secret");
        let result = NitroClient::new("ns1", "bad host name", creds, &settings(false));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn debug_hides_credentials() {
        let creds = NitroCredentials::new("nsroot", "hunter2");
        let client = NitroClient::new("ns1", "10.0.0.1", creds, &settings(true)).unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("ns1"));
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        assert_eq!(preview(&long).chars().count(), 200);
        assert_eq!(preview("short"), "short");
    }
}

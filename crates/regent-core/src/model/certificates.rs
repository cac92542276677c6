// ── Certificates: ACME accounts, DNS/HTTP providers and key passphrases ──

use super::named::{NamedList, named};
use super::pair::entity_pair;

entity_pair! {
    /// An ACME directory endpoint.
    pub struct AcmeService / SecureAcmeService {
        clear name: String,
        secret url: String,
    }
}

entity_pair! {
    pub struct ExternalAccountBinding / SecureExternalAccountBinding {
        secret kid: String,
        secret hmac: String,
    }
}

entity_pair! {
    /// An ACME account.
    pub struct AcmeUser / SecureAcmeUser {
        clear name: String,
        secret email: String,
        #[serde(rename = "eab")]
        nested external_account_binding: ExternalAccountBinding,
    }
}

entity_pair! {
    /// One environment variable consumed by a challenge provider.
    pub struct Variable / SecureVariable {
        clear key: String,
        secret value: String,
    }
}

entity_pair! {
    /// A challenge provider (for example a DNS plugin) and the variables it
    /// reads from the process environment.
    pub struct AcmeProvider / SecureAcmeProvider {
        clear name: String,
        #[serde(rename = "type")]
        clear kind: String,
        clear challenge: String,
        nested variables: Vec<Variable>,
    }
}

entity_pair! {
    pub struct AcmeRegistry / SecureAcmeRegistry {
        nested services: NamedList<AcmeService>,
        nested users: NamedList<AcmeUser>,
        nested providers: NamedList<AcmeProvider>,
    }
}

entity_pair! {
    /// Passphrase protecting a private key.
    pub struct Passphrase / SecurePassphrase {
        clear name: String,
        secret value: String,
    }
}

entity_pair! {
    pub struct CertificateRegistry / SecureCertificateRegistry {
        nested acme: AcmeRegistry,
        nested passphrases: NamedList<Passphrase>,
    }
}

named!("acme service" => AcmeService, SecureAcmeService; name);
named!("acme user" => AcmeUser, SecureAcmeUser; name);
named!("acme provider" => AcmeProvider, SecureAcmeProvider; name);
named!("certificate passphrase" => Passphrase, SecurePassphrase; name);
// Variables are addressed by their environment key.
named!("acme provider variable" => Variable, SecureVariable; key);

impl AcmeService {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl AcmeUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        external_account_binding: ExternalAccountBinding,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            external_account_binding,
        }
    }
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::crypto::MasterKey;
    use crate::model::pair::{SecureEntity, Transform};

    #[test]
    fn provider_keeps_identity_clear_and_seals_values() {
        let provider = AcmeProvider {
            name: "cloudflare".into(),
            kind: "dns".into(),
            challenge: "dns-01".into(),
            variables: vec![Variable::new("CF_API_TOKEN", "tok-123")],
        };
        let key = MasterKey::new("k");
        let secure = provider.encrypt(&key).unwrap();

        assert_eq!(secure.kind, "dns");
        assert_eq!(secure.variables[0].key, "CF_API_TOKEN");
        assert_ne!(secure.variables[0].value, "tok-123");
        assert_eq!(secure.decrypt(&key).unwrap(), provider);
    }

    #[test]
    fn renamed_fields_use_persisted_keys() {
        let user = AcmeUser::new("ops", "ops@example.com", ExternalAccountBinding::default());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("eab").is_some());

        let provider = AcmeProvider {
            kind: "http".into(),
            ..AcmeProvider::default()
        };
        let json = serde_json::to_value(&provider).unwrap();
        assert_eq!(json["type"], "http");
    }
}

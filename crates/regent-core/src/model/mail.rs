// ── Outbound mail ──

use super::named::{NamedList, named};
use super::pair::entity_pair;

entity_pair! {
    pub struct SmtpAuthentication / SecureSmtpAuthentication {
        secret username: String,
        secret password: String,
        /// Mechanism, e.g. "plain" or "login".
        #[serde(rename = "type")]
        secret kind: String,
    }
}

entity_pair! {
    /// A relay for outbound notifications.
    ///
    /// The name stays readable in the secure form so servers can still be
    /// looked up without the key.
    pub struct SmtpServer / SecureSmtpServer {
        clear name: String,
        secret address: String,
        secret port: u16,
        nested authentication: SmtpAuthentication,
    }
}

entity_pair! {
    pub struct MailRegistry / SecureMailRegistry {
        nested smtp_servers: NamedList<SmtpServer>,
    }
}

named!("smtp server" => SmtpServer, SecureSmtpServer; name);

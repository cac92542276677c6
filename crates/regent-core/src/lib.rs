//! Hierarchical, multi-tenant configuration registry for NetScaler
//! automation.
//!
//! A [`Registry`] holds organizations, each with its ADC environments,
//! ACME accounts and providers, certificate passphrases and SMTP relays.
//! Every entity comes as a pair:
//!
//! - a **plaintext** form used at runtime, and
//! - a **secure** form (`SecureRegistry`, `SecureNode`, ...) whose
//!   sensitive fields are sealed and which carries per-instance
//!   [`CryptoParams`]. This is the form written to disk.
//!
//! Both forms are generated from one declaration, so they always have the
//! same fields; [`Transformer`] converts between them with a
//! [`MasterKey`].
//!
//! On top of the tree sit the [`Environment`] resolver (which node of an HA
//! pair to talk to) and the provider variable injector
//! ([`EnvironmentGuard`] and friends).

pub mod crypto;
pub mod device;
pub mod error;
pub mod injector;
pub mod model;
pub mod resolver;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use crypto::{CryptoError, CryptoParams, MasterKey, Transformer};
pub use device::{
    DeviceClient, DeviceClientFactory, HostKeyPolicy, NitroClientFactory, SshConfig,
    TransferClientFactory,
};
pub use error::{BoxError, RegistryError};
pub use injector::{
    EnvironmentGuard, apply_environment, apply_secure_environment, child_environment,
    reset_environment,
};
pub use store::SharedRegistry;

pub use model::{
    AcmeProvider, AcmeRegistry, AcmeService, AcmeUser, AdcRegistry, CertificateRegistry,
    Credential, DuplicateName, EntityPair, Environment, ExternalAccountBinding, MachinesRegistry,
    MailRegistry, Named, NamedList, NetScalerRegistry, Node, Organization, OrganizationRegistry,
    Passphrase, Registry, SdxRegistry, SecureAcmeProvider, SecureEntity, SecureEnvironment,
    SecureRegistry, SecureVariable, Settings, SmtpAuthentication, SmtpServer, Transform, Variable,
};

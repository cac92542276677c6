// ── Registry domain model ──
//
// Plaintext entities and their secure twins, one module per subtree.

pub mod adc;
pub mod certificates;
pub mod mail;
pub mod named;
pub mod pair;
pub mod registry;

pub use adc::{
    AdcRegistry, Credential, Environment, NetScalerRegistry, Node, SdxRegistry,
    SecureAdcRegistry, SecureCredential, SecureEnvironment, SecureNetScalerRegistry, SecureNode,
    SecureSdxRegistry, Settings,
};
pub use certificates::{
    AcmeProvider, AcmeRegistry, AcmeService, AcmeUser, CertificateRegistry,
    ExternalAccountBinding, Passphrase, SecureAcmeProvider, SecureAcmeRegistry, SecureAcmeService,
    SecureAcmeUser, SecureCertificateRegistry, SecureExternalAccountBinding, SecurePassphrase,
    SecureVariable, Variable,
};
pub use mail::{
    MailRegistry, SecureMailRegistry, SecureSmtpAuthentication, SecureSmtpServer,
    SmtpAuthentication, SmtpServer,
};
pub use named::{Named, NamedList};
pub use pair::{EntityPair, FieldSpec, SecureEntity, Sensitivity, Transform, TransformDescriptor};
pub use registry::{
    DuplicateName, MachinesRegistry, Organization, OrganizationRegistry, Registry,
    SecureMachinesRegistry, SecureOrganization, SecureOrganizationRegistry, SecureRegistry,
};

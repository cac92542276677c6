// ── Registry tree ──
//
// Registry → Organization → OrganizationRegistry → {machines, certificates,
// mail} → ... → leaves. Queried top-down by name.

use super::adc::{
    AdcRegistry, Credential, Environment, NetScalerRegistry, Node, SdxRegistry, Settings,
};
use super::certificates::{
    AcmeProvider, AcmeRegistry, AcmeService, AcmeUser, CertificateRegistry,
    ExternalAccountBinding, Passphrase, Variable,
};
use super::mail::{MailRegistry, SmtpAuthentication, SmtpServer};
use super::named::{NamedList, named};
use super::pair::entity_pair;
use crate::error::RegistryError;

entity_pair! {
    /// Root of the configuration tree.
    pub struct Registry / SecureRegistry {
        nested organizations: NamedList<Organization>,
    }
}

entity_pair! {
    /// A tenant.
    pub struct Organization / SecureOrganization {
        clear name: String,
        nested registry: OrganizationRegistry,
    }
}

entity_pair! {
    pub struct OrganizationRegistry / SecureOrganizationRegistry {
        nested machines: MachinesRegistry,
        nested certificates: CertificateRegistry,
        nested mail: MailRegistry,
    }
}

entity_pair! {
    pub struct MachinesRegistry / SecureMachinesRegistry {
        nested netscaler: NetScalerRegistry,
    }
}

named!("organization" => Organization, SecureOrganization; name);

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: OrganizationRegistry::default(),
        }
    }

    pub fn environments(&self) -> &NamedList<Environment> {
        &self.registry.machines.netscaler.adc.environments
    }

    pub fn acme(&self) -> &AcmeRegistry {
        &self.registry.certificates.acme
    }
}

impl Registry {
    /// A registry holding a single unnamed organization.
    pub fn empty() -> Self {
        Self {
            organizations: vec![Organization::new("")].into(),
        }
    }

    /// A registry with one fully populated placeholder organization,
    /// written out by `regent init --example` as a starting point.
    pub fn example() -> Self {
        let environment = Environment {
            name: "netscaler adc environment name".into(),
            management: Some(Node::new(
                "netscaler adc snip name",
                "netscaler adc snip ip address | fqdn",
            )),
            nodes: vec![Node::new(
                "netscaler adc nsip name",
                "netscaler adc nsip ip address | fqdn",
            )]
            .into(),
            credentials: vec![Credential::new(
                "netscaler adc credential name",
                "netscaler adc credential username",
                "netscaler adc credential password",
            )]
            .into(),
            settings: Settings {
                use_ssl: false,
                timeout: 30,
                user_agent: "regent".into(),
                validate_server_certificate: true,
                ..Settings::default()
            },
        };

        let acme = AcmeRegistry {
            services: vec![AcmeService::new("acme service name", "acme service url")].into(),
            users: vec![AcmeUser::new(
                "acme user name",
                "acme user email",
                ExternalAccountBinding {
                    kid: "acme user kid value".into(),
                    hmac: "acme user hmac value".into(),
                },
            )]
            .into(),
            providers: vec![AcmeProvider {
                name: "acme provider name".into(),
                kind: "acme provider type".into(),
                challenge: "acme challenge type http-01 | dns-01".into(),
                variables: vec![Variable::new(
                    "acme provider variable name",
                    "acme provider variable value",
                )],
            }]
            .into(),
        };

        let organization = Organization {
            name: "organization name".into(),
            registry: OrganizationRegistry {
                machines: MachinesRegistry {
                    netscaler: NetScalerRegistry {
                        adc: AdcRegistry {
                            environments: vec![environment].into(),
                        },
                        sdx: SdxRegistry {},
                    },
                },
                certificates: CertificateRegistry {
                    acme,
                    passphrases: vec![Passphrase {
                        name: "passphrase name".into(),
                        value: "passphrase value".into(),
                    }]
                    .into(),
                },
                mail: MailRegistry {
                    smtp_servers: vec![SmtpServer {
                        name: "smtp server name".into(),
                        address: "smtp server ip address | fqdn".into(),
                        port: 25,
                        authentication: SmtpAuthentication {
                            username: "smtp username".into(),
                            password: "smtp password".into(),
                            kind: "smtp authentication type plain | login".into(),
                        },
                    }]
                    .into(),
                },
            },
        };

        Self {
            organizations: vec![organization].into(),
        }
    }

    pub fn organization(&self, name: &str) -> Result<&Organization, RegistryError> {
        self.organizations.find_by_name(name)
    }

    pub fn environment(
        &self,
        organization: &str,
        environment: &str,
    ) -> Result<&Environment, RegistryError> {
        self.organization(organization)?
            .environments()
            .find_by_name(environment)
    }

    pub fn provider(
        &self,
        organization: &str,
        provider: &str,
    ) -> Result<&AcmeProvider, RegistryError> {
        self.organization(organization)?
            .acme()
            .providers
            .find_by_name(provider)
    }
}

// ── Duplicate detection ─────────────────────────────────────────────

/// A name that occurs more than once within one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateName {
    /// Path of the collection, e.g. `acme/environments`.
    pub scope: String,
    pub name: String,
}

fn collect_duplicates<T: super::named::Named>(
    out: &mut Vec<DuplicateName>,
    scope: &str,
    list: &NamedList<T>,
) {
    out.extend(list.duplicate_names().into_iter().map(|name| DuplicateName {
        scope: scope.to_owned(),
        name: name.to_owned(),
    }));
}

// Both forms share field names, so one walk serves both.
macro_rules! duplicate_walk {
    ($registry:ty) => {
        impl $registry {
            /// Every repeated name in the tree. Lookups resolve repeats to
            /// the first entry; callers decide whether that is acceptable.
            pub fn duplicate_names(&self) -> Vec<DuplicateName> {
                let mut out = Vec::new();
                collect_duplicates(&mut out, "organizations", &self.organizations);

                for org in &self.organizations {
                    let registry = &org.registry;
                    let adc = &registry.machines.netscaler.adc;
                    collect_duplicates(
                        &mut out,
                        &format!("{}/environments", org.name),
                        &adc.environments,
                    );
                    for env in &adc.environments {
                        let scope = format!("{}/{}", org.name, env.name);
                        collect_duplicates(&mut out, &format!("{scope}/nodes"), &env.nodes);
                        collect_duplicates(
                            &mut out,
                            &format!("{scope}/credentials"),
                            &env.credentials,
                        );
                    }

                    let certificates = &registry.certificates;
                    let acme = &certificates.acme;
                    collect_duplicates(&mut out, &format!("{}/services", org.name), &acme.services);
                    collect_duplicates(&mut out, &format!("{}/users", org.name), &acme.users);
                    collect_duplicates(
                        &mut out,
                        &format!("{}/providers", org.name),
                        &acme.providers,
                    );
                    collect_duplicates(
                        &mut out,
                        &format!("{}/passphrases", org.name),
                        &certificates.passphrases,
                    );
                    collect_duplicates(
                        &mut out,
                        &format!("{}/smtpServers", org.name),
                        &registry.mail.smtp_servers,
                    );
                }
                out
            }
        }
    };
}

duplicate_walk!(Registry);
duplicate_walk!(SecureRegistry);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::crypto::MasterKey;
    use crate::model::pair::{SecureEntity, Transform};

    #[test]
    fn empty_registry_has_one_unnamed_organization() {
        let registry = Registry::empty();
        assert_eq!(registry.organizations.names(), [""]);
        assert!(registry.organization("").is_ok());
    }

    #[test]
    fn example_registry_is_navigable() {
        let registry = Registry::example();
        let env = registry
            .environment("organization name", "netscaler adc environment name")
            .unwrap();
        assert!(env.has_management());
        assert_eq!(env.nodes.names(), ["netscaler adc nsip name"]);
        assert!(!env.settings.use_ssl);

        let provider = registry
            .provider("organization name", "acme provider name")
            .unwrap();
        assert_eq!(provider.variables.len(), 1);
    }

    #[test]
    fn missing_levels_report_item_type() {
        let registry = Registry::example();
        let err = registry.environment("nope", "x").unwrap_err();
        assert_eq!(err.to_string(), "could not find organization nope");

        let err = registry
            .environment("organization name", "staging")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not find netscaler adc environment staging"
        );
    }

    #[test]
    fn whole_tree_round_trips() {
        let key = MasterKey::new("tree key");
        let registry = Registry::example();
        let secure = registry.encrypt(&key).unwrap();
        assert_eq!(secure.decrypt(&key).unwrap(), registry);
    }

    #[test]
    fn secure_tree_keeps_names_readable() {
        let secure = Registry::example().encrypt(&MasterKey::new("k")).unwrap();
        let org = secure.organizations.find_by_name("organization name").unwrap();
        let env = org
            .registry
            .machines
            .netscaler
            .adc
            .environments
            .find_by_name("netscaler adc environment name")
            .unwrap();
        assert_ne!(env.nodes[0].address, "netscaler adc nsip ip address | fqdn");
    }

    #[test]
    fn duplicates_are_reported_in_both_forms() {
        let mut registry = Registry::example();
        registry.organizations.push(Organization::new("organization name"));
        let dups = registry.duplicate_names();
        assert_eq!(
            dups,
            [DuplicateName {
                scope: "organizations".into(),
                name: "organization name".into(),
            }]
        );

        let secure = registry.encrypt(&MasterKey::new("k")).unwrap();
        assert_eq!(secure.duplicate_names(), dups);
    }
}

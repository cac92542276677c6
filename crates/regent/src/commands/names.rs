//! `names`: list entity names at one level of the registry.
//!
//! Names are stored in clear in both forms, so a secure document is
//! listed without its master key.

use clap::ValueEnum;
use serde::Serialize;
use tabled::Tabled;

use regent_config::{load_registry, load_secure_registry};

use crate::cli::{GlobalOpts, NameLevel, NamesArgs};
use crate::config;
use crate::error::CliError;
use crate::output::{print_output, render_list};

#[derive(Debug, Serialize, Tabled)]
struct NameRow {
    #[tabled(rename = "Name")]
    name: String,
}

fn required<'a>(value: Option<&'a str>, flag: &str, level: NameLevel) -> Result<&'a str, CliError> {
    value.ok_or_else(|| CliError::Validation {
        field: flag.into(),
        reason: format!(
            "required when listing {}",
            level
                .to_possible_value()
                .map_or_else(String::new, |v| v.get_name().to_owned())
        ),
    })
}

/// Walks either registry form; the plaintext and secure trees share
/// their field names.
macro_rules! collect_names {
    ($registry:expr, $args:expr) => {{
        let registry = $registry;
        let args: &NamesArgs = $args;

        let organization = || -> Result<_, CliError> {
            let name = required(args.org.as_deref(), "--org", args.level)?;
            Ok(&registry.organizations.find_by_name(name)?.registry)
        };
        let environment = || -> Result<_, CliError> {
            let name = required(args.env.as_deref(), "--env", args.level)?;
            Ok(organization()?
                .machines
                .netscaler
                .adc
                .environments
                .find_by_name(name)?)
        };

        let names = match args.level {
            NameLevel::Organizations => registry.organizations.names(),
            NameLevel::Environments => organization()?.machines.netscaler.adc.environments.names(),
            NameLevel::Nodes => environment()?.nodes.names(),
            NameLevel::Credentials => environment()?.credentials.names(),
            NameLevel::AcmeServices => organization()?.certificates.acme.services.names(),
            NameLevel::AcmeUsers => organization()?.certificates.acme.users.names(),
            NameLevel::AcmeProviders => organization()?.certificates.acme.providers.names(),
            NameLevel::Passphrases => organization()?.certificates.passphrases.names(),
            NameLevel::SmtpServers => organization()?.mail.smtp_servers.names(),
        };
        names.into_iter().map(str::to_owned).collect::<Vec<String>>()
    }};
}

pub fn handle(args: &NamesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.level.needs_organization() {
        required(args.org.as_deref(), "--org", args.level)?;
    }
    if args.level.needs_environment() {
        required(args.env.as_deref(), "--env", args.level)?;
    }

    let target = config::registry_target(global)?;
    let names = if target.profile.secure {
        let registry = load_secure_registry(target.registry_path())?;
        collect_names!(&registry, args)
    } else {
        let registry = load_registry(target.registry_path())?;
        collect_names!(&registry, args)
    };

    let rows: Vec<NameRow> = names.into_iter().map(|name| NameRow { name }).collect();
    let out = render_list(
        &global.output,
        &rows,
        |r| NameRow {
            name: r.name.clone(),
        },
        |r| r.name.clone(),
    )?;
    print_output(&out, global.quiet)
}

//! `primary`: resolve the node of an HA environment that accepts
//! configuration changes.

use owo_colors::OwoColorize;
use serde::Serialize;

use regent_core::NitroClientFactory;

use crate::cli::{GlobalOpts, PrimaryArgs};
use crate::config;
use crate::error::CliError;
use crate::output::{print_output, render_single, should_color};

#[derive(Debug, Serialize)]
struct PrimaryNode {
    organization: String,
    environment: String,
    node: String,
    url: String,
}

fn detail(primary: &PrimaryNode, color: bool) -> String {
    let node = if color {
        primary.node.green().bold().to_string()
    } else {
        primary.node.clone()
    };
    format!(
        "Organization: {}\nEnvironment:  {}\nPrimary node: {node}\nNITRO URL:    {}",
        primary.organization, primary.environment, primary.url
    )
}

pub async fn handle(args: &PrimaryArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let registry = config::registry_target(global)?.open()?;
    let environment = registry.environment(&args.org, &args.env)?;
    let credential = environment.resolve_credential(&args.credential)?;

    let client = environment
        .resolve_primary_client(&NitroClientFactory, credential)
        .await?;

    let primary = PrimaryNode {
        organization: args.org.clone(),
        environment: environment.name.clone(),
        node: client.name().to_owned(),
        url: client.base_url().to_string(),
    };
    let color = should_color(&global.color);
    let out = render_single(
        &global.output,
        &primary,
        |p| detail(p, color),
        |p| p.node.clone(),
    )?;
    print_output(&out, global.quiet)
}

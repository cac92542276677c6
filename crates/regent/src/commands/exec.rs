//! `exec`: run a program with an ACME provider's variables applied.
//!
//! Variables are passed to the child's environment only. This process's
//! environment is never modified while the runtime's threads are alive.

use tokio::process::Command;
use tracing::debug;

use crate::cli::{ExecArgs, GlobalOpts};
use crate::config;
use crate::error::{CliError, exit_code};

pub async fn handle(args: &ExecArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let Some((program, rest)) = args.command.split_first() else {
        return Err(CliError::Validation {
            field: "command".into(),
            reason: "no program given".into(),
        });
    };

    let registry = config::registry_target(global)?.open()?;
    let provider = registry.provider(&args.org, &args.provider)?;

    let variables = provider.child_environment()?;
    debug!(
        provider = %provider.name,
        keys = ?variables.iter().map(|(key, _)| *key).collect::<Vec<_>>(),
        "passing provider variables to child"
    );

    let status = Command::new(program)
        .args(rest)
        .envs(variables)
        .status()
        .await
        .map_err(|source| CliError::Exec {
            program: program.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CliError::ChildFailed {
            program: program.clone(),
            code: status.code().unwrap_or(exit_code::GENERAL),
        })
    }
}

//! `key`: manage the profile's master key in the system keyring.

use std::io::{self, BufRead, IsTerminal};

use regent_config::store_master_key;

use crate::cli::{GlobalOpts, KeyArgs, KeyCommand};
use crate::config;
use crate::error::CliError;
use crate::output::print_output;

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "master key".into(),
        reason: format!("could not read key: {e}"),
    }
}

/// Read the key from the terminal without echo, or one line from piped
/// stdin.
fn read_key() -> Result<String, CliError> {
    let raw = if io::stdin().is_terminal() {
        rpassword::prompt_password("Master key: ").map_err(prompt_err)?
    } else {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map_err(prompt_err)?;
        line
    };

    let key = raw.trim_end_matches(['\r', '\n']).to_owned();
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "master key".into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(key)
}

pub fn handle(args: &KeyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        KeyCommand::Set => {
            let target = config::key_target(global)?;
            let key = read_key()?;
            store_master_key(&target.name, &key)?;
            print_output(
                &format!(
                    "Stored master key for profile '{}' in the system keyring",
                    target.name
                ),
                global.quiet,
            )
        }
    }
}

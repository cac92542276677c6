//! Command dispatch: bridges CLI args to registry operations and output
//! formatting.

pub mod documents;
pub mod exec;
pub mod key;
pub mod names;
pub mod primary;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a registry command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Init(args) => documents::init(&args, global),
        Command::Encrypt(args) => documents::encrypt(&args, global),
        Command::Decrypt(args) => documents::decrypt(&args, global),
        Command::Names(args) => names::handle(&args, global),
        Command::Primary(args) => primary::handle(&args, global).await,
        Command::Exec(args) => exec::handle(&args, global).await,
        Command::Key(args) => key::handle(&args, global),
        // Completions are handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}

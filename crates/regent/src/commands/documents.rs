//! `init`, `encrypt` and `decrypt`: writing registry documents.

use std::path::Path;

use tracing::info;

use regent_config::{load_registry, load_secure_registry, save_document};
use regent_core::{Registry, Transformer};

use crate::cli::{GlobalOpts, InitArgs, TransformArgs};
use crate::config;
use crate::error::CliError;
use crate::output::print_output;

fn ensure_writable(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::Conflict {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn transformer(global: &GlobalOpts) -> Result<Transformer, CliError> {
    let key = config::key_target(global)?.master_key()?;
    Ok(Transformer::new(key))
}

pub fn init(args: &InitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    ensure_writable(&args.path, args.force)?;

    let registry = if args.example {
        Registry::example()
    } else {
        Registry::empty()
    };

    if global.plaintext {
        save_document(&args.path, &registry)?;
    } else {
        let secure = transformer(global)?
            .encrypt(&registry)
            .map_err(CliError::Encryption)?;
        save_document(&args.path, &secure)?;
    }

    info!(path = %args.path.display(), example = args.example, "initialized registry");
    let form = if global.plaintext { "plaintext" } else { "encrypted" };
    print_output(
        &format!("Wrote {form} registry to {}", args.path.display()),
        global.quiet,
    )
}

pub fn encrypt(args: &TransformArgs, global: &GlobalOpts) -> Result<(), CliError> {
    ensure_writable(&args.output, args.force)?;

    let registry = load_registry(&args.input)?;
    let secure = transformer(global)?
        .encrypt(&registry)
        .map_err(CliError::Encryption)?;
    save_document(&args.output, &secure)?;

    info!(input = %args.input.display(), output = %args.output.display(), "encrypted registry");
    print_output(
        &format!(
            "Encrypted {} into {}",
            args.input.display(),
            args.output.display()
        ),
        global.quiet,
    )
}

pub fn decrypt(args: &TransformArgs, global: &GlobalOpts) -> Result<(), CliError> {
    ensure_writable(&args.output, args.force)?;

    let secure = load_secure_registry(&args.input)?;
    let registry = transformer(global)?
        .decrypt(&secure)
        .map_err(CliError::Decryption)?;
    save_document(&args.output, &registry)?;

    info!(input = %args.input.display(), output = %args.output.display(), "decrypted registry");
    print_output(
        &format!(
            "Decrypted {} into {}",
            args.input.display(),
            args.output.display()
        ),
        global.quiet,
    )
}

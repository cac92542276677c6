//! CLI error types with miette diagnostics.
//!
//! Maps `ConfigError` and `RegistryError` into user-facing errors with
//! actionable help text.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use regent_config::ConfigError;
use regent_core::{CryptoError, RegistryError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const KEY: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Registry lookups ─────────────────────────────────────────────
    #[error("{item_type} '{name}' not found")]
    #[diagnostic(
        code(regent::not_found),
        help("Run: regent names {list_command} to see what is defined")
    )]
    NotFound {
        item_type: String,
        name: String,
        list_command: String,
    },

    #[error(transparent)]
    #[diagnostic(
        code(regent::resolution),
        help("Check the environment's node addresses, credentials and settings.")
    )]
    Resolution(RegistryError),

    // ── Keys ─────────────────────────────────────────────────────────
    #[error("No master key available for profile '{profile}'")]
    #[diagnostic(
        code(regent::no_key),
        help(
            "Set REGENT_MASTER_KEY, store one with: regent key set\n\
             Or add `key` to the profile in your configuration file."
        )
    )]
    NoKey { profile: String },

    #[error("Could not decrypt the registry: {0}")]
    #[diagnostic(
        code(regent::decryption),
        help("Check that the master key is the one the document was encrypted with.")
    )]
    Decryption(CryptoError),

    #[error("Could not encrypt the registry: {0}")]
    #[diagnostic(code(regent::encryption))]
    Encryption(CryptoError),

    // ── Documents ────────────────────────────────────────────────────
    #[error("Registry document {} does not exist", path.display())]
    #[diagnostic(
        code(regent::document_not_found),
        help("Create one with: regent init <PATH>")
    )]
    DocumentNotFound { path: PathBuf },

    #[error("{} already exists", path.display())]
    #[diagnostic(code(regent::conflict), help("Use --force to overwrite it."))]
    Conflict { path: PathBuf },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(regent::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No registry document configured")]
    #[diagnostic(
        code(regent::no_registry),
        help("Pass --registry <PATH>, or add a profile to {config_path}")
    )]
    NoRegistry { config_path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(regent::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(regent::config))]
    Config(ConfigError),

    // ── Child processes ──────────────────────────────────────────────
    #[error("Could not run {program}")]
    #[diagnostic(code(regent::exec))]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code}")]
    #[diagnostic(code(regent::child_failed))]
    ChildFailed { program: String, code: i32 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON: {0}")]
    #[diagnostic(code(regent::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML: {0}")]
    #[diagnostic(code(regent::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::DocumentNotFound { .. } => exit_code::NOT_FOUND,
            Self::Resolution(_) => exit_code::CONNECTION,
            Self::NoKey { .. } | Self::Decryption(_) => exit_code::KEY,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoRegistry { .. } => {
                exit_code::USAGE
            }
            Self::ChildFailed { code, .. } => *code,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoKey { profile } => Self::NoKey { profile },
            ConfigError::Crypto(err) => Self::Decryption(err),
            ConfigError::NotFound { path } => Self::DocumentNotFound { path },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

// ── RegistryError → CliError mapping ─────────────────────────────────

/// The `regent names` invocation listing items of this type.
fn list_command(item_type: &str) -> &'static str {
    match item_type {
        "organization" => "organizations",
        "netscaler adc environment" => "environments --org <ORG>",
        "netscaler adc node" => "nodes --org <ORG> --env <ENV>",
        "netscaler adc credential" => "credentials --org <ORG> --env <ENV>",
        "acme service" => "acme-services --org <ORG>",
        "acme user" => "acme-users --org <ORG>",
        "acme provider" => "acme-providers --org <ORG>",
        "certificate passphrase" => "passphrases --org <ORG>",
        "smtp server" => "smtp-servers --org <ORG>",
        _ => "--help",
    }
}

impl From<RegistryError> for CliError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ItemNotFound { item_type, name } => Self::NotFound {
                list_command: list_command(item_type).into(),
                item_type: item_type.into(),
                name,
            },
            RegistryError::Crypto(err) => Self::Decryption(err),
            RegistryError::EnvironmentVariable { key, reason } => Self::Validation {
                field: format!("variable {key}"),
                reason,
            },
            other => Self::Resolution(other),
        }
    }
}

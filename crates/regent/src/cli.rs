//! Clap derive structures for the `regent` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// regent -- encrypted configuration registry for NetScaler automation
#[derive(Debug, Parser)]
#[command(
    name = "regent",
    version,
    about = "Manage encrypted NetScaler configuration registries",
    long_about = "Create, encrypt and query multi-tenant registry documents.\n\n\
        Registries hold ADC environments, ACME accounts and providers,\n\
        certificate passphrases and SMTP relays per organization.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Registry profile to use
    #[arg(long, short = 'p', env = "REGENT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, env = "REGENT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Registry document to use instead of the profile's
    #[arg(long, short = 'r', env = "REGENT_REGISTRY", global = true)]
    pub registry: Option<PathBuf>,

    /// The registry document is stored unencrypted
    #[arg(long, global = true)]
    pub plaintext: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "REGENT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a new registry document
    Init(InitArgs),

    /// Encrypt a plaintext registry document
    #[command(alias = "enc")]
    Encrypt(TransformArgs),

    /// Decrypt a secure registry document
    #[command(alias = "dec")]
    Decrypt(TransformArgs),

    /// List entity names at one level of the registry
    #[command(alias = "ls")]
    Names(NamesArgs),

    /// Find the node of an environment that accepts configuration changes
    Primary(PrimaryArgs),

    /// Run a command with an ACME provider's variables in its environment
    Exec(ExecArgs),

    /// Manage the profile's master key
    Key(KeyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Registry documents ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Document to create (.yaml, .yml, .json or .toml)
    pub path: PathBuf,

    /// Fill the document with placeholder entries for every entity
    #[arg(long)]
    pub example: bool,

    /// Overwrite an existing document
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct TransformArgs {
    /// Document to read
    pub input: PathBuf,

    /// Document to write (format follows the extension)
    pub output: PathBuf,

    /// Overwrite an existing output document
    #[arg(long)]
    pub force: bool,
}

// ── Queries ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NameLevel {
    Organizations,
    Environments,
    Nodes,
    Credentials,
    AcmeServices,
    AcmeUsers,
    AcmeProviders,
    Passphrases,
    SmtpServers,
}

impl NameLevel {
    /// Whether listing this level needs `--org`.
    pub fn needs_organization(self) -> bool {
        self != Self::Organizations
    }

    /// Whether listing this level needs `--env` as well.
    pub fn needs_environment(self) -> bool {
        matches!(self, Self::Nodes | Self::Credentials)
    }
}

#[derive(Debug, Args)]
pub struct NamesArgs {
    /// Level of the registry to list
    #[arg(value_enum)]
    pub level: NameLevel,

    /// Organization to look in
    #[arg(long)]
    pub org: Option<String>,

    /// ADC environment to look in (nodes, credentials)
    #[arg(long)]
    pub env: Option<String>,
}

#[derive(Debug, Args)]
pub struct PrimaryArgs {
    /// Organization name
    #[arg(long)]
    pub org: String,

    /// ADC environment name
    #[arg(long)]
    pub env: String,

    /// Credential used to log in
    #[arg(long)]
    pub credential: String,
}

// ── Provider environment ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Organization name
    #[arg(long)]
    pub org: String,

    /// ACME provider whose variables are applied
    #[arg(long)]
    pub provider: String,

    /// Program and arguments to run
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

// ── Master key ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommand,
}

#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Store the master key in the system keyring (read from stdin)
    Set,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

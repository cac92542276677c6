//! Configuration and registry documents for regent tools.
//!
//! TOML profiles (each pointing at one registry document), master-key
//! resolution (env + keyring + plaintext), and loading/saving registry
//! documents as YAML, JSON or TOML.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use regent_core::{CryptoError, DuplicateName, MasterKey, Registry, SecureEntity, SecureRegistry};

/// Environment variable consulted for the master key when a profile does
/// not name its own.
pub const DEFAULT_KEY_ENV: &str = "REGENT_MASTER_KEY";

const KEYRING_SERVICE: &str = "regent";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no master key configured for profile '{profile}'")]
    NoKey { profile: String },

    #[error("registry document {} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported document format for {} (expected .yaml, .yml, .json or .toml)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to serialize TOML: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("failed to serialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named registry profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// One registry document and how to unlock it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Path of the registry document.
    pub registry: PathBuf,

    /// Whether the document holds the encrypted form.
    #[serde(default = "default_secure")]
    pub secure: bool,

    /// Environment variable holding the master key.
    pub key_env: Option<String>,

    /// Master key in plaintext. The keyring and env var are checked first.
    pub key: Option<String>,
}

fn default_secure() -> bool {
    true
}

impl Profile {
    pub fn new(registry: impl Into<PathBuf>) -> Self {
        Self {
            registry: registry.into(),
            secure: true,
            key_env: None,
            key: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "regent", "regent").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("regent");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load Config from `path`, layered over defaults and under `REGENT_*`
/// environment overrides (`REGENT_DEFAULTS__OUTPUT=json`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("REGENT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Look up a profile, falling back to the config's default profile.
pub fn select_profile<'a>(
    cfg: &'a Config,
    name: Option<&'a str>,
) -> Result<(&'a str, &'a Profile), ConfigError> {
    let name = name
        .or(cfg.default_profile.as_deref())
        .unwrap_or("default");
    cfg.profiles
        .get(name)
        .map(|profile| (name, profile))
        .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
}

// ── Registry documents ──────────────────────────────────────────────

/// On-disk encoding of a registry document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Toml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Deserialize a document, picking the figment provider from the extension.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = DocumentFormat::from_path(path)?;
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), ?format, "loading registry document");

    let figment = match format {
        DocumentFormat::Yaml => Figment::from(Yaml::file(path)),
        DocumentFormat::Json => Figment::from(Json::file(path)),
        DocumentFormat::Toml => Figment::from(Toml::file(path)),
    };
    Ok(figment.extract()?)
}

/// Serialize a document in the format implied by the extension.
pub fn save_document<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let rendered = match DocumentFormat::from_path(path)? {
        DocumentFormat::Yaml => serde_yaml::to_string(value)?,
        DocumentFormat::Json => serde_json::to_string_pretty(value)?,
        DocumentFormat::Toml => toml::to_string_pretty(value)?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, rendered)?;
    debug!(path = %path.display(), "wrote registry document");
    Ok(())
}

fn warn_duplicates(path: &Path, duplicates: &[DuplicateName]) {
    for dup in duplicates {
        warn!(
            path = %path.display(),
            scope = %dup.scope,
            name = %dup.name,
            "duplicate name, lookups return the first entry"
        );
    }
}

pub fn load_registry(path: &Path) -> Result<Registry, ConfigError> {
    let registry: Registry = load_document(path)?;
    warn_duplicates(path, &registry.duplicate_names());
    Ok(registry)
}

pub fn load_secure_registry(path: &Path) -> Result<SecureRegistry, ConfigError> {
    let registry: SecureRegistry = load_document(path)?;
    warn_duplicates(path, &registry.duplicate_names());
    Ok(registry)
}

/// Load a profile's registry as plaintext, decrypting it if the profile
/// stores the secure form.
pub fn open_registry(profile: &Profile, profile_name: &str) -> Result<Registry, ConfigError> {
    if !profile.secure {
        return load_registry(&profile.registry);
    }
    let secure = load_secure_registry(&profile.registry)?;
    let key = resolve_master_key(profile, profile_name)?;
    Ok(secure.decrypt(&key)?)
}

// ── Master key resolution ───────────────────────────────────────────

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/master-key")
}

/// Resolve the master key from the credential chain.
pub fn resolve_master_key(profile: &Profile, profile_name: &str) -> Result<MasterKey, ConfigError> {
    // 1. Profile's key_env (or the default variable) → env var lookup
    let env_name = profile.key_env.as_deref().unwrap_or(DEFAULT_KEY_ENV);
    if let Ok(val) = std::env::var(env_name) {
        if !val.is_empty() {
            return Ok(MasterKey::from(SecretString::from(val)));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Ok(MasterKey::from(SecretString::from(secret)));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.key {
        return Ok(MasterKey::new(key.clone()));
    }

    Err(ConfigError::NoKey {
        profile: profile_name.into(),
    })
}

/// Store a profile's master key in the system keyring.
pub fn store_master_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)).map_err(|e| {
        ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        }
    })?;
    entry
        .set_password(key)
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("r.YML")).unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("dir/r.json")).unwrap(),
            DocumentFormat::Json
        );
        assert!(matches!(
            DocumentFormat::from_path(Path::new("registry")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn select_profile_uses_default() {
        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("registry.yaml"));

        let (name, profile) = select_profile(&cfg, None).unwrap();
        assert_eq!(name, "default");
        assert!(profile.secure);

        assert!(matches!(
            select_profile(&cfg, Some("lab")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }
}

//! Resolution of the registry document a command works on: profile from
//! the config file, overridden by `--registry` / `--plaintext`.

use std::path::{Path, PathBuf};

use regent_config::{
    Config, ConfigError, Profile, config_path, load_config_from, open_registry,
    resolve_master_key, select_profile,
};
use regent_core::{MasterKey, Registry};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The profile a command runs against, after CLI overrides.
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub profile: Profile,
}

impl Target {
    pub fn registry_path(&self) -> &Path {
        &self.profile.registry
    }

    pub fn master_key(&self) -> Result<MasterKey, CliError> {
        Ok(resolve_master_key(&self.profile, &self.name)?)
    }

    pub fn open(&self) -> Result<Registry, CliError> {
        Ok(open_registry(&self.profile, &self.name)?)
    }
}

fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&config_file(global))?)
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

/// Profile for commands that only need key material (`init`, `encrypt`,
/// `decrypt`, `key set`). Falls back to an unnamed default profile.
pub fn key_target(global: &GlobalOpts) -> Result<Target, CliError> {
    let cfg = load(global)?;
    match select_profile(&cfg, global.profile.as_deref()) {
        Ok((name, profile)) => Ok(Target {
            name: name.to_owned(),
            profile: profile.clone(),
        }),
        Err(ConfigError::UnknownProfile { name }) if global.profile.is_none() => Ok(Target {
            name,
            profile: Profile::new(global.registry.clone().unwrap_or_default()),
        }),
        Err(ConfigError::UnknownProfile { name }) => Err(CliError::ProfileNotFound {
            name,
            available: available_profiles(&cfg),
        }),
        Err(err) => Err(err.into()),
    }
}

/// Profile for commands that read a registry document.
pub fn registry_target(global: &GlobalOpts) -> Result<Target, CliError> {
    let mut target = key_target(global)?;

    if let Some(ref path) = global.registry {
        target.profile.registry.clone_from(path);
    }
    if target.profile.registry.as_os_str().is_empty() {
        return Err(CliError::NoRegistry {
            config_path: config_file(global).display().to_string(),
        });
    }
    if global.plaintext {
        target.profile.secure = false;
    }

    tracing::debug!(
        profile = %target.name,
        registry = %target.profile.registry.display(),
        secure = target.profile.secure,
        "resolved registry target"
    );
    Ok(target)
}

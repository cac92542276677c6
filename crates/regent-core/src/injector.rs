// ── Provider variable injector ──
//
// Challenge providers read their parameters from the process
// environment. The free functions apply and remove variables directly;
// `EnvironmentGuard` records what it overwrites and puts it back on drop.
// `child_environment` validates the same variables for a child process
// without touching this one.
//
// Mutating the environment is only sound while no other thread reads or
// writes it. Multi-threaded programs (a tokio runtime, a test harness)
// must hand variables to children through `Command::envs` instead, or
// hold one lock around every access.

use std::env;
use std::ffi::{OsStr, OsString};

use tracing::{debug, warn};

use crate::crypto::MasterKey;
use crate::error::RegistryError;
use crate::model::named::Named;
use crate::model::pair::SecureEntity;
use crate::model::{AcmeProvider, SecureAcmeProvider, SecureVariable, Variable};

// ── Raw environment access ──────────────────────────────────────────

fn check_variable(key: &str, value: Option<&OsStr>) -> Result<(), RegistryError> {
    let reason = if key.is_empty() {
        "key is empty"
    } else if key.contains('=') {
        "key contains '='"
    } else if key.contains('\0') {
        "key contains a NUL byte"
    } else if value.is_some_and(|v| v.as_encoded_bytes().contains(&0)) {
        "value contains a NUL byte"
    } else {
        return Ok(());
    };
    Err(RegistryError::EnvironmentVariable {
        key: key.to_owned(),
        reason: reason.to_owned(),
    })
}

#[allow(unsafe_code)]
fn set_var(key: &str, value: &OsStr) -> Result<(), RegistryError> {
    check_variable(key, Some(value))?;
    // SAFETY: key and value were validated above, so `set_var` cannot
    // panic. Callers run with no other thread touching the environment,
    // as the module header requires.
    unsafe { env::set_var(key, value) };
    Ok(())
}

#[allow(unsafe_code)]
fn remove_var(key: &str) -> Result<(), RegistryError> {
    check_variable(key, None)?;
    // SAFETY: see `set_var`.
    unsafe { env::remove_var(key) };
    Ok(())
}

// ── Direct application ──────────────────────────────────────────────

/// Set every variable in order. Stops at the first failure; variables set
/// before it stay set.
pub fn apply_environment(variables: &[Variable]) -> Result<(), RegistryError> {
    for variable in variables {
        debug!(variable = %variable.key, "setting environment variable");
        set_var(&variable.key, variable.value.as_ref())?;
    }
    Ok(())
}

/// Decrypt and set every variable in order, with the same abort
/// behaviour as [`apply_environment`].
pub fn apply_secure_environment(
    variables: &[SecureVariable],
    key: &MasterKey,
) -> Result<(), RegistryError> {
    for secure in variables {
        let variable = secure.decrypt(key)?;
        debug!(variable = %variable.key, "setting environment variable");
        set_var(&variable.key, variable.value.as_ref())?;
    }
    Ok(())
}

/// Remove every variable's key, whether or not it is currently set.
pub fn reset_environment<V: Named>(variables: &[V]) -> Result<(), RegistryError> {
    for variable in variables {
        debug!(variable = %variable.name(), "removing environment variable");
        remove_var(variable.name())?;
    }
    Ok(())
}

// ── Scoped application ──────────────────────────────────────────────

/// Variables applied for the lifetime of the guard.
///
/// Every key the guard touches is snapshotted before its first write. On
/// drop, each key goes back to its prior value, or is removed if it was
/// unset. A failed apply restores whatever it had already written.
#[must_use = "the environment is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct EnvironmentGuard {
    saved: Vec<(String, Option<OsString>)>,
}

impl EnvironmentGuard {
    pub fn apply(variables: &[Variable]) -> Result<Self, RegistryError> {
        let mut guard = Self { saved: Vec::new() };
        for variable in variables {
            guard.set(&variable.key, &variable.value)?;
        }
        Ok(guard)
    }

    pub fn apply_secure(
        variables: &[SecureVariable],
        key: &MasterKey,
    ) -> Result<Self, RegistryError> {
        let mut guard = Self { saved: Vec::new() };
        for secure in variables {
            let variable = secure.decrypt(key)?;
            guard.set(&variable.key, &variable.value)?;
        }
        Ok(guard)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RegistryError> {
        check_variable(key, Some(value.as_ref()))?;
        if !self.saved.iter().any(|(saved, _)| saved == key) {
            self.saved.push((key.to_owned(), env::var_os(key)));
        }
        debug!(variable = %key, "setting scoped environment variable");
        set_var(key, value.as_ref())
    }

    /// Keys the guard will restore, in first-touched order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.saved.iter().map(|(key, _)| key.as_str())
    }
}

impl Drop for EnvironmentGuard {
    fn drop(&mut self) {
        for (key, prior) in self.saved.drain(..).rev() {
            let restored = match &prior {
                Some(value) => set_var(&key, value),
                None => remove_var(&key),
            };
            if let Err(err) = restored {
                warn!(variable = %key, "failed to restore environment variable: {err}");
            }
        }
    }
}

// ── Child processes ─────────────────────────────────────────────────

/// Validate every variable and return the pairs to pass to
/// `Command::envs`. Nothing is written to this process's environment.
pub fn child_environment(variables: &[Variable]) -> Result<Vec<(&str, &str)>, RegistryError> {
    variables
        .iter()
        .map(|variable| {
            check_variable(&variable.key, Some(variable.value.as_ref()))
                .map(|()| (variable.key.as_str(), variable.value.as_str()))
        })
        .collect()
}

// ── Provider helpers ────────────────────────────────────────────────

impl AcmeProvider {
    pub fn apply_environment(&self) -> Result<(), RegistryError> {
        debug!(provider = %self.name, "applying provider parameters");
        apply_environment(&self.variables)
    }

    pub fn reset_environment(&self) -> Result<(), RegistryError> {
        debug!(provider = %self.name, "resetting provider parameters");
        reset_environment(&self.variables)
    }

    pub fn scoped_environment(&self) -> Result<EnvironmentGuard, RegistryError> {
        debug!(provider = %self.name, "applying scoped provider parameters");
        EnvironmentGuard::apply(&self.variables)
    }

    pub fn child_environment(&self) -> Result<Vec<(&str, &str)>, RegistryError> {
        child_environment(&self.variables)
    }
}

impl SecureAcmeProvider {
    pub fn apply_environment(&self, key: &MasterKey) -> Result<(), RegistryError> {
        debug!(provider = %self.name, "applying provider parameters");
        apply_secure_environment(&self.variables, key)
    }

    /// Keys are stored in the clear, so no master key is needed.
    pub fn reset_environment(&self) -> Result<(), RegistryError> {
        debug!(provider = %self.name, "resetting provider parameters");
        reset_environment(&self.variables)
    }

    pub fn scoped_environment(&self, key: &MasterKey) -> Result<EnvironmentGuard, RegistryError> {
        debug!(provider = %self.name, "applying scoped provider parameters");
        EnvironmentGuard::apply_secure(&self.variables, key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use super::*;
    use crate::model::pair::Transform;

    // Tests run on parallel threads. Every test that reads or writes the
    // environment holds this lock, and each uses its own keys.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[test]
    fn apply_then_reset() {
        let _env = env_lock();
        let vars = [
            Variable::new("REGENT_T_APPLY_K1", "V1"),
            Variable::new("REGENT_T_APPLY_K2", "V2"),
        ];
        apply_environment(&vars).unwrap();
        assert_eq!(env::var("REGENT_T_APPLY_K1").unwrap(), "V1");
        assert_eq!(env::var("REGENT_T_APPLY_K2").unwrap(), "V2");

        reset_environment(&vars).unwrap();
        assert!(env::var_os("REGENT_T_APPLY_K1").is_none());
        assert!(env::var_os("REGENT_T_APPLY_K2").is_none());
    }

    #[test]
    fn reset_of_unset_key_is_fine() {
        let _env = env_lock();
        reset_environment(&[Variable::new("REGENT_T_NEVER_SET", "")]).unwrap();
    }

    #[test]
    fn apply_stops_at_first_invalid_key() {
        let _env = env_lock();
        let vars = [
            Variable::new("REGENT_T_PARTIAL_OK", "yes"),
            Variable::new("BAD=KEY", "x"),
            Variable::new("REGENT_T_PARTIAL_AFTER", "no"),
        ];
        let err = apply_environment(&vars).unwrap_err();
        assert!(matches!(err, RegistryError::EnvironmentVariable { ref key, .. } if key == "BAD=KEY"));
        assert_eq!(env::var("REGENT_T_PARTIAL_OK").unwrap(), "yes");
        assert!(env::var_os("REGENT_T_PARTIAL_AFTER").is_none());
        reset_environment(&vars[..1]).unwrap();
    }

    #[test]
    fn empty_key_and_nul_value_are_rejected() {
        let _env = env_lock();
        assert!(apply_environment(&[Variable::new("", "x")]).is_err());
        assert!(apply_environment(&[Variable::new("REGENT_T_NUL", "a\0b")]).is_err());
        assert!(env::var_os("REGENT_T_NUL").is_none());
    }

    #[test]
    fn secure_variables_are_decrypted_before_apply() {
        let _env = env_lock();
        let key = MasterKey::new("k");
        let secure = Variable::new("REGENT_T_SECURE", "plain-value")
            .encrypt(&key)
            .unwrap();
        apply_secure_environment(std::slice::from_ref(&secure), &key).unwrap();
        assert_eq!(env::var("REGENT_T_SECURE").unwrap(), "plain-value");
        reset_environment(&[secure]).unwrap();
        assert!(env::var_os("REGENT_T_SECURE").is_none());
    }

    #[test]
    fn secure_apply_with_wrong_key_sets_nothing() {
        let _env = env_lock();
        let secure = Variable::new("REGENT_T_WRONG_KEY", "v")
            .encrypt(&MasterKey::new("right"))
            .unwrap();
        let err = apply_secure_environment(&[secure], &MasterKey::new("wrong")).unwrap_err();
        assert!(matches!(err, RegistryError::Crypto(_)));
        assert!(env::var_os("REGENT_T_WRONG_KEY").is_none());
    }

    #[test]
    fn guard_restores_prior_state() {
        let _env = env_lock();
        set_var("REGENT_T_GUARD_EXISTING", "before".as_ref()).unwrap();

        {
            let guard = EnvironmentGuard::apply(&[
                Variable::new("REGENT_T_GUARD_EXISTING", "during"),
                Variable::new("REGENT_T_GUARD_NEW", "during"),
            ])
            .unwrap();
            assert_eq!(env::var("REGENT_T_GUARD_EXISTING").unwrap(), "during");
            assert_eq!(env::var("REGENT_T_GUARD_NEW").unwrap(), "during");
            assert_eq!(
                guard.keys().collect::<Vec<_>>(),
                ["REGENT_T_GUARD_EXISTING", "REGENT_T_GUARD_NEW"]
            );
        }

        assert_eq!(env::var("REGENT_T_GUARD_EXISTING").unwrap(), "before");
        assert!(env::var_os("REGENT_T_GUARD_NEW").is_none());
        remove_var("REGENT_T_GUARD_EXISTING").unwrap();
    }

    #[test]
    fn guard_restores_first_value_when_key_repeats() {
        let _env = env_lock();
        {
            let _guard = EnvironmentGuard::apply(&[
                Variable::new("REGENT_T_GUARD_REPEAT", "one"),
                Variable::new("REGENT_T_GUARD_REPEAT", "two"),
            ])
            .unwrap();
            assert_eq!(env::var("REGENT_T_GUARD_REPEAT").unwrap(), "two");
        }
        assert!(env::var_os("REGENT_T_GUARD_REPEAT").is_none());
    }

    #[test]
    fn failed_guard_apply_rolls_back() {
        let _env = env_lock();
        let result = EnvironmentGuard::apply(&[
            Variable::new("REGENT_T_GUARD_ROLLBACK", "v"),
            Variable::new("", "bad"),
        ]);
        assert!(result.is_err());
        assert!(env::var_os("REGENT_T_GUARD_ROLLBACK").is_none());
    }

    #[test]
    fn provider_helpers() {
        let _env = env_lock();
        let provider = AcmeProvider {
            name: "dns".into(),
            variables: vec![Variable::new("REGENT_T_PROVIDER", "token")],
            ..AcmeProvider::default()
        };
        provider.apply_environment().unwrap();
        assert_eq!(env::var("REGENT_T_PROVIDER").unwrap(), "token");
        provider.reset_environment().unwrap();
        assert!(env::var_os("REGENT_T_PROVIDER").is_none());

        let key = MasterKey::new("k");
        let secure = provider.encrypt(&key).unwrap();
        {
            let _guard = secure.scoped_environment(&key).unwrap();
            assert_eq!(env::var("REGENT_T_PROVIDER").unwrap(), "token");
        }
        assert!(env::var_os("REGENT_T_PROVIDER").is_none());
    }

    #[test]
    fn child_environment_validates_without_mutating() {
        let _env = env_lock();
        let provider = AcmeProvider {
            name: "dns".into(),
            variables: vec![
                Variable::new("REGENT_T_CHILD_TOKEN", "abc"),
                Variable::new("REGENT_T_CHILD_ZONE", "example.com"),
            ],
            ..AcmeProvider::default()
        };
        assert_eq!(
            provider.child_environment().unwrap(),
            [
                ("REGENT_T_CHILD_TOKEN", "abc"),
                ("REGENT_T_CHILD_ZONE", "example.com")
            ]
        );
        assert!(env::var_os("REGENT_T_CHILD_TOKEN").is_none());

        let err = child_environment(&[
            Variable::new("REGENT_T_CHILD_OK", "x"),
            Variable::new("BAD=KEY", "y"),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::EnvironmentVariable { ref key, .. } if key == "BAD=KEY"));
        assert!(child_environment(&[Variable::new("REGENT_T_CHILD_NUL", "a\0b")]).is_err());
    }
}

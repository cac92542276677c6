// ── Entity pairs ──
//
// Every registry entity exists twice: a plaintext form used at runtime
// and a secure form that is safe to persist. Both are generated from a
// single field declaration by `entity_pair!`, so the two shapes cannot
// drift apart. Each field is declared with one of three kinds:
//
//   clear   copied as-is into the secure form
//   secret  serialized to JSON and sealed into an opaque string
//   nested  transformed recursively through its own pair

use crate::crypto::{CryptoError, CryptoParams, MasterKey};

/// Name of the per-instance parameter field every secure form appends.
pub const CRYPTO_PARAMS_FIELD: &str = "crypto_params";

// ── Traits ──────────────────────────────────────────────────────────

/// Total bidirectional mapping between a plaintext value and its
/// encrypted counterpart.
pub trait Transform: Sized {
    type Secure;

    fn encrypt(&self, key: &MasterKey) -> Result<Self::Secure, CryptoError>;

    fn decrypt(secure: &Self::Secure, key: &MasterKey) -> Result<Self, CryptoError>;
}

/// A declared plaintext/secure entity pair.
pub trait EntityPair: Transform {
    /// Plaintext fields, in declaration order.
    const FIELDS: &'static [FieldSpec];

    fn describe() -> TransformDescriptor {
        TransformDescriptor {
            plain: std::any::type_name::<Self>(),
            secure: std::any::type_name::<Self::Secure>(),
            fields: Self::FIELDS,
        }
    }
}

/// The persisted side of an entity pair.
pub trait SecureEntity: Sized {
    type Plain: Transform<Secure = Self>;

    fn crypto_params(&self) -> &CryptoParams;

    fn decrypt(&self, key: &MasterKey) -> Result<Self::Plain, CryptoError> {
        <Self::Plain as Transform>::decrypt(self, key)
    }
}

// ── Descriptors ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    Clear,
    Secret,
    Nested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub sensitivity: Sensitivity,
}

/// Static description of one entity pair.
#[derive(Debug, Clone, Copy)]
pub struct TransformDescriptor {
    pub plain: &'static str,
    pub secure: &'static str,
    pub fields: &'static [FieldSpec],
}

impl TransformDescriptor {
    /// Field names the secure form must carry: every plaintext field
    /// followed by the crypto parameters.
    pub fn secure_field_names(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .map(|f| f.name)
            .chain(std::iter::once(CRYPTO_PARAMS_FIELD))
            .collect()
    }
}

// ── Containers ──────────────────────────────────────────────────────

impl<T: Transform> Transform for Option<T> {
    type Secure = Option<T::Secure>;

    fn encrypt(&self, key: &MasterKey) -> Result<Self::Secure, CryptoError> {
        self.as_ref().map(|v| v.encrypt(key)).transpose()
    }

    fn decrypt(secure: &Self::Secure, key: &MasterKey) -> Result<Self, CryptoError> {
        secure.as_ref().map(|s| T::decrypt(s, key)).transpose()
    }
}

impl<T: Transform> Transform for Vec<T> {
    type Secure = Vec<T::Secure>;

    fn encrypt(&self, key: &MasterKey) -> Result<Self::Secure, CryptoError> {
        self.iter().map(|v| v.encrypt(key)).collect()
    }

    fn decrypt(secure: &Self::Secure, key: &MasterKey) -> Result<Self, CryptoError> {
        secure.iter().map(|s| T::decrypt(s, key)).collect()
    }
}

// ── Declaration macros ──────────────────────────────────────────────

macro_rules! secure_ty {
    (clear $ty:ty) => { $ty };
    (secret $ty:ty) => { ::std::string::String };
    (nested $ty:ty) => { <$ty as $crate::model::pair::Transform>::Secure };
}

macro_rules! seal_field {
    (clear, $cipher:ident, $key:ident, $value:expr) => {
        ::std::clone::Clone::clone(&$value)
    };
    (secret, $cipher:ident, $key:ident, $value:expr) => {
        $cipher.seal(&$value)?
    };
    (nested, $cipher:ident, $key:ident, $value:expr) => {
        $crate::model::pair::Transform::encrypt(&$value, $key)?
    };
}

macro_rules! open_field {
    (clear, $cipher:ident, $key:ident, $value:expr, $ty:ty) => {
        ::std::clone::Clone::clone(&$value)
    };
    (secret, $cipher:ident, $key:ident, $value:expr, $ty:ty) => {
        $cipher.open::<$ty>(&$value)?
    };
    (nested, $cipher:ident, $key:ident, $value:expr, $ty:ty) => {
        <$ty as $crate::model::pair::Transform>::decrypt(&$value, $key)?
    };
}

macro_rules! debug_field {
    (secret, $value:expr) => {
        &"[REDACTED]"
    };
    ($kind:ident, $value:expr) => {
        &$value
    };
}

macro_rules! sensitivity {
    (clear) => {
        $crate::model::pair::Sensitivity::Clear
    };
    (secret) => {
        $crate::model::pair::Sensitivity::Secret
    };
    (nested) => {
        $crate::model::pair::Sensitivity::Nested
    };
}

/// Declare a plaintext entity and its secure twin.
///
/// ```ignore
/// entity_pair! {
///     /// A single appliance.
///     pub struct Node / SecureNode {
///         clear name: String,
///         secret address: String,
///     }
/// }
/// ```
macro_rules! entity_pair {
    (
        $(#[$meta:meta])*
        pub struct $plain:ident / $secure:ident {
            $(
                $(#[$fmeta:meta])*
                $kind:ident $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Default, PartialEq, Eq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        pub struct $plain {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        #[doc = concat!("Encrypted form of [`", stringify!($plain), "`].")]
        #[derive(Debug, Clone, Default, PartialEq, Eq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        pub struct $secure {
            $( $(#[$fmeta])* pub $field: $crate::model::pair::secure_ty!($kind $ty), )*
            pub crypto_params: $crate::crypto::CryptoParams,
        }

        impl ::std::fmt::Debug for $plain {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($plain))
                    $( .field(stringify!($field), $crate::model::pair::debug_field!($kind, self.$field)) )*
                    .finish()
            }
        }

        impl $crate::model::pair::Transform for $plain {
            type Secure = $secure;

            fn encrypt(
                &self,
                key: &$crate::crypto::MasterKey,
            ) -> ::std::result::Result<$secure, $crate::crypto::CryptoError> {
                #[allow(unused_variables)]
                let (cipher, crypto_params) = $crate::crypto::FieldCipher::generate(key)?;
                Ok($secure {
                    $( $field: $crate::model::pair::seal_field!($kind, cipher, key, self.$field), )*
                    crypto_params,
                })
            }

            fn decrypt(
                secure: &$secure,
                key: &$crate::crypto::MasterKey,
            ) -> ::std::result::Result<Self, $crate::crypto::CryptoError> {
                #[allow(unused_variables)]
                let cipher = $crate::crypto::FieldCipher::for_params(key, &secure.crypto_params)?;
                Ok(Self {
                    $( $field: $crate::model::pair::open_field!($kind, cipher, key, secure.$field, $ty), )*
                })
            }
        }

        impl $crate::model::pair::EntityPair for $plain {
            const FIELDS: &'static [$crate::model::pair::FieldSpec] = &[
                $(
                    $crate::model::pair::FieldSpec {
                        name: stringify!($field),
                        sensitivity: $crate::model::pair::sensitivity!($kind),
                    },
                )*
            ];
        }

        impl $crate::model::pair::SecureEntity for $secure {
            type Plain = $plain;

            fn crypto_params(&self) -> &$crate::crypto::CryptoParams {
                &self.crypto_params
            }
        }
    };
}

pub(crate) use {debug_field, entity_pair, open_field, seal_field, secure_ty, sensitivity};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    entity_pair! {
        /// Test-only pair covering every field kind.
        pub struct Sample / SecureSample {
            clear label: String,
            secret token: String,
            secret port: u16,
            nested inner: Option<Leaf>,
        }
    }

    entity_pair! {
        pub struct Leaf / SecureLeaf {
            secret value: String,
        }
    }

    entity_pair! {
        pub struct Empty / SecureEmpty {}
    }

    fn sample() -> Sample {
        Sample {
            label: "front".into(),
            token: "t0ken".into(),
            port: 8443,
            inner: Some(Leaf {
                value: "deep".into(),
            }),
        }
    }

    #[test]
    fn secret_fields_are_sealed_and_clear_fields_copied() {
        let key = MasterKey::new("k");
        let secure = sample().encrypt(&key).unwrap();

        assert_eq!(secure.label, "front");
        assert_ne!(secure.token, "t0ken");
        assert_ne!(secure.port, "8443");
        let inner = secure.inner.as_ref().unwrap();
        assert_ne!(inner.value, "deep");
        assert_ne!(inner.crypto_params, secure.crypto_params);
    }

    #[test]
    fn decrypt_restores_plaintext() {
        let key = MasterKey::new("k");
        let secure = sample().encrypt(&key).unwrap();
        assert_eq!(secure.decrypt(&key).unwrap(), sample());
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let secure = sample().encrypt(&MasterKey::new("right")).unwrap();
        let result = secure.decrypt(&MasterKey::new("wrong"));
        assert!(matches!(result, Err(CryptoError::WrongKey)));
    }

    #[test]
    fn entity_without_secrets_still_detects_wrong_key() {
        let secure = Empty {}.encrypt(&MasterKey::new("right")).unwrap();
        let result = secure.decrypt(&MasterKey::new("wrong"));
        assert!(matches!(result, Err(CryptoError::WrongKey)));
    }

    #[test]
    fn debug_redacts_secret_fields() {
        let rendered = format!("{:?}", sample());
        assert!(rendered.contains("front"));
        assert!(!rendered.contains("t0ken"));
        assert!(!rendered.contains("8443"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn descriptor_lists_fields_in_order() {
        let descriptor = Sample::describe();
        let names: Vec<_> = descriptor.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["label", "token", "port", "inner"]);
        assert_eq!(descriptor.fields[0].sensitivity, Sensitivity::Clear);
        assert_eq!(descriptor.fields[1].sensitivity, Sensitivity::Secret);
        assert_eq!(descriptor.fields[3].sensitivity, Sensitivity::Nested);
        assert!(descriptor.secure.ends_with("SecureSample"));
        assert_eq!(
            descriptor.secure_field_names(),
            ["label", "token", "port", "inner", "crypto_params"]
        );
    }

    #[test]
    fn option_and_vec_containers_transform_elementwise() {
        let key = MasterKey::new("k");
        let none: Option<Leaf> = None;
        assert_eq!(none.encrypt(&key).unwrap(), None);

        let leaves = vec![Leaf { value: "a".into() }, Leaf { value: "b".into() }];
        let secure = leaves.encrypt(&key).unwrap();
        assert_eq!(secure.len(), 2);
        assert_eq!(Vec::<Leaf>::decrypt(&secure, &key).unwrap(), leaves);
    }
}

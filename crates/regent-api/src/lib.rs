//! Async client for the NetScaler ADC NITRO REST API.
//!
//! Only the slice of NITRO the registry needs lives here: building an
//! authenticated HTTP client for one appliance and asking it whether it is
//! the primary node of its HA pair. Connection tuning comes from
//! [`ConnectionSettings`]; credentials never leave a [`SecretString`].
//!
//! [`SecretString`]: secrecy::SecretString

pub mod error;
pub mod nitro;
pub mod transport;

pub use error::Error;
pub use nitro::{HaNode, NitroClient};
pub use transport::{ConnectionSettings, NitroCredentials};

use thiserror::Error;

/// Top-level error type for the `regent-api` crate.
///
/// Covers every failure mode of a NITRO exchange: client construction,
/// authentication, transport and response decoding. `regent-core` wraps
/// these with node and environment context.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected or session invalid.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node address could not be turned into a base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── NITRO ───────────────────────────────────────────────────────
    /// Structured error from the NITRO envelope (`errorcode != 0`).
    #[error("NITRO error {errorcode} (HTTP {status}): {message}")]
    Nitro {
        errorcode: i64,
        message: String,
        status: u16,
    },

    /// The appliance answered but without the resource we asked for.
    #[error("Unexpected NITRO response: {0}")]
    UnexpectedResponse(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if re-authenticating might resolve the error.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Nitro { status, .. } => *status == 401,
            _ => false,
        }
    }
}

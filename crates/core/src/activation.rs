//! Account activation tokens.
//!
//! The plaintext token is mailed to the user exactly once; only its SHA-256
//! hex digest is persisted. Activation looks the token up by digest.

use chrono::Duration;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::types::Timestamp;

/// Scope stored alongside activation tokens.
pub const SCOPE_ACTIVATION: &str = "activation";

/// Length of the generated plaintext token (alphanumeric characters).
pub const TOKEN_LENGTH: usize = 26;

/// Activation tokens stay valid for three days unless configured otherwise.
pub const DEFAULT_ACTIVATION_TTL_HOURS: i64 = 72;

/// A freshly generated token.
#[derive(Debug, Clone)]
pub struct GeneratedToken {
    /// Sent to the user, never stored.
    pub plaintext: String,
    /// SHA-256 hex digest of `plaintext`, stored in the `tokens` table.
    pub hash: String,
}

pub fn generate_token() -> GeneratedToken {
    let plaintext: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    let hash = hash_token(&plaintext);
    GeneratedToken { plaintext, hash }
}

/// SHA-256 hex digest of a plaintext token.
pub fn hash_token(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    format!("{digest:x}")
}

/// Expiry instant for a token issued at `issued_at`.
pub fn expires_at(issued_at: Timestamp, ttl_hours: i64) -> Timestamp {
    issued_at + Duration::hours(ttl_hours)
}

//! Code generation, hashing and constant-time verification

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use sha2::{Digest, Sha256};

use otp_shared::config::otp::MAX_CODE_LENGTH;

/// Generate a cryptographically secure random decimal code
///
/// Draws uniformly from `[10^(length-1), 10^length - 1]` using the OS CSPRNG,
/// so the result always has exactly `length` digits and needs no padding.
/// `length` is clamped to `1..=9`.
pub fn generate_code(length: u32) -> String {
    let length = length.clamp(1, MAX_CODE_LENGTH);
    let low = 10u32.pow(length - 1);
    let high = 10u32.pow(length) - 1;
    OsRng.gen_range(low..=high).to_string()
}

/// Compute the SHA-256 digest of a code, hex encoded
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a candidate code against a stored digest
///
/// The candidate is hashed and the two digests are compared with
/// `constant_time_eq`, so timing does not reveal where they first differ.
pub fn verify_code(candidate: &str, stored_hash: &str) -> bool {
    let candidate_hash = hash_code(candidate);
    constant_time_eq(candidate_hash.as_bytes(), stored_hash.as_bytes())
}

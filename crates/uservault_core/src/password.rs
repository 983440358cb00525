//! Salted adaptive password hashing.
//!
//! # Responsibility
//! - Derive storable password hashes with PBKDF2-HMAC-SHA256.
//! - Verify candidate passwords in constant time.
//!
//! # Invariants
//! - Every hash carries its own random salt and iteration count.
//! - Stored format: `pbkdf2-sha256$<iterations>$<salt_hex>$<hash_hex>`.
//! - Verification honors the stored iteration count, so raising the configured
//!   cost never locks out existing accounts.
//! - Padded verification and dummy verification burn the same number of rounds
//!   for a given `work` target.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use std::error::Error;
use std::fmt::{Display, Formatter};

const SCHEME: &str = "pbkdf2-sha256";
const SALT_BYTES: usize = 16;
const HASH_BYTES: usize = 32;

/// Default PBKDF2 round count for new hashes.
pub const DEFAULT_HASH_ITERATIONS: u32 = 100_000;
/// Lowest round count accepted from configuration.
pub const MIN_HASH_ITERATIONS: u32 = 1_000;

/// Stored hash could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedHash(pub &'static str);

impl Display for MalformedHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed password hash: {}", self.0)
    }
}

impl Error for MalformedHash {}

/// Cost-parameterized password hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_ITERATIONS)
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hashes `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_BYTES];
        OsRng.fill_bytes(&mut salt);
        let digest = derive(password, &salt, self.iterations);
        format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(digest)
        )
    }

    /// Checks `password` against a stored hash.
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool, MalformedHash> {
        self.verify_with_work(password, stored, 0)
    }

    /// Checks `password` against a stored hash, then pads the derivation work
    /// up to `work` rounds when the stored cost is lower.
    ///
    /// Callers pass the same `work` to [`PasswordHasher::dummy_verify`] so a
    /// wrong password and an unknown username cost the same time.
    pub fn verify_with_work(
        &self,
        password: &str,
        stored: &str,
        work: u32,
    ) -> Result<bool, MalformedHash> {
        let parsed = parse(stored)?;
        let digest = derive(password, &parsed.salt, parsed.iterations);
        burn(password, work.saturating_sub(parsed.iterations));
        Ok(constant_time_eq(&digest, &parsed.digest))
    }

    /// Burns `work` rounds (never fewer than the configured cost).
    ///
    /// Used when the username is unknown so that response latency does not
    /// reveal whether an account exists.
    pub fn dummy_verify(&self, password: &str, work: u32) {
        burn(password, work.max(self.iterations));
    }

    /// Returns whether a hash made with `stored_cost` rounds should be
    /// re-derived at the configured cost.
    pub fn needs_upgrade(&self, stored_cost: u32) -> bool {
        stored_cost < self.iterations
    }
}

/// Returns the round count recorded in a stored hash.
pub fn cost_of(stored: &str) -> Result<u32, MalformedHash> {
    parse(stored).map(|parsed| parsed.iterations)
}

struct ParsedHash {
    iterations: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

fn parse(stored: &str) -> Result<ParsedHash, MalformedHash> {
    let mut parts = stored.split('$');
    if parts.next() != Some(SCHEME) {
        return Err(MalformedHash("unknown scheme"));
    }
    let iterations = parts
        .next()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .ok_or(MalformedHash("invalid iteration count"))?;
    let salt = parts
        .next()
        .and_then(|value| hex::decode(value).ok())
        .filter(|value| !value.is_empty())
        .ok_or(MalformedHash("invalid salt"))?;
    let digest = parts
        .next()
        .and_then(|value| hex::decode(value).ok())
        .filter(|value| value.len() == HASH_BYTES)
        .ok_or(MalformedHash("invalid digest"))?;
    if parts.next().is_some() {
        return Err(MalformedHash("trailing segments"));
    }
    Ok(ParsedHash {
        iterations,
        salt,
        digest,
    })
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_BYTES] {
    let mut out = [0u8; HASH_BYTES];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

fn burn(password: &str, rounds: u32) {
    if rounds == 0 {
        return;
    }
    std::hint::black_box(derive(
        std::hint::black_box(password),
        &[0u8; SALT_BYTES],
        rounds,
    ));
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

//! Salted password hashing.
//!
//! Stored form: `sha256$<salt, base64>$<digest, base64>` where the digest is
//! `SHA-256(salt || password)`. Anything without the `sha256$` prefix is a
//! legacy plain-text credential written by older builds; it still verifies,
//! and callers are expected to replace it via [`PasswordHash::needs_rehash`].

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// An encoded password credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes `password` with a fresh random salt.
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Self::with_salt(password, &salt)
    }

    fn with_salt(password: &str, salt: &[u8]) -> Self {
        let digest = digest(salt, password);
        Self(format!(
            "{SCHEME}${}${}",
            STANDARD.encode(salt),
            STANDARD.encode(digest)
        ))
    }

    /// Wraps an already-encoded value read from storage.
    pub fn from_stored(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded form that gets persisted.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the stored value is a legacy plain-text credential.
    pub fn needs_rehash(&self) -> bool {
        self.parts().is_none()
    }

    /// Checks `candidate` against the stored credential.
    pub fn verify(&self, candidate: &str) -> bool {
        match self.parts() {
            Some((salt, expected)) => {
                let actual = digest(&salt, candidate);
                constant_time_eq(&actual, &expected)
            }
            // Legacy value. Compare literally; an empty record never matches.
            None => !self.0.is_empty() && constant_time_eq(self.0.as_bytes(), candidate.as_bytes()),
        }
    }

    fn parts(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        let mut fields = self.0.splitn(3, '$');
        if fields.next()? != SCHEME {
            return None;
        }
        let salt = STANDARD.decode(fields.next()?).ok()?;
        let digest = STANDARD.decode(fields.next()?).ok()?;
        Some((salt, digest))
    }
}

// Never print the credential, even in debug output.
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

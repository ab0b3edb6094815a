//! Password hashing and verification
//!
//! PBKDF2 with SHA-256 over `ring`. Hash strings are self-describing so the
//! iteration count can be raised without invalidating stored hashes.

use std::num::NonZeroU32;

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

use crate::{AuthError, AuthResult};

const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 128;

/// Secret fed to the dummy hash used for unknown login identifiers
const DUMMY_SECRET: &str = "placeholder-secret";

/// Password hasher using PBKDF2-SHA256
pub struct PasswordHasher {
    /// Number of iterations
    iterations: NonZeroU32,
    /// Salt length in bytes
    salt_len: usize,
    /// Output hash length in bytes
    hash_len: usize,
    /// Hash of a placeholder secret, verified when no user matches a login
    /// identifier so that both paths cost one PBKDF2 run
    dummy: String,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// Create a new password hasher with production iteration count
    pub fn new() -> Self {
        Self::with_iterations(100_000)
    }

    /// Create hasher with custom iterations (lower for tests)
    pub fn with_iterations(iterations: u32) -> Self {
        let mut hasher = Self {
            iterations: NonZeroU32::new(iterations).unwrap_or(NonZeroU32::new(1).unwrap()),
            salt_len: 16,
            hash_len: 32,
            dummy: String::new(),
        };
        hasher.dummy = hasher
            .hash_unchecked(DUMMY_SECRET)
            .unwrap_or_else(|_| format!("$pbkdf2-sha256${}$AAAA$AAAA", iterations));
        hasher
    }

    /// Hash a password, returning the hash string
    ///
    /// Format: `$pbkdf2-sha256$iterations$salt$hash`
    /// where salt and hash are base64-encoded
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        self.validate_password(password)?;
        self.hash_unchecked(password)
    }

    fn hash_unchecked(&self, password: &str) -> AuthResult<String> {
        let rng = SystemRandom::new();
        let mut salt = vec![0u8; self.salt_len];
        rng.fill(&mut salt)
            .map_err(|_| AuthError::Internal("Failed to generate salt".into()))?;

        let mut hash = vec![0u8; self.hash_len];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            &salt,
            password.as_bytes(),
            &mut hash,
        );

        Ok(format!(
            "$pbkdf2-sha256${}${}${}",
            self.iterations,
            base64_encode(&salt),
            base64_encode(&hash)
        ))
    }

    /// Verify a password against a hash string (constant-time comparison)
    pub fn verify(&self, password: &str, hash_string: &str) -> bool {
        let Some((iterations, salt, expected)) = parse_hash(hash_string) else {
            return false;
        };

        pbkdf2::verify(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            &salt,
            password.as_bytes(),
            &expected,
        )
        .is_ok()
    }

    /// The fixed dummy hash for timing equalization
    pub fn dummy_hash(&self) -> &str {
        &self.dummy
    }

    /// Validate password meets the length rules
    pub fn validate_password(&self, password: &str) -> AuthResult<()> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidPasswordFormat(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if password.len() > MAX_PASSWORD_LEN {
            return Err(AuthError::InvalidPasswordFormat(format!(
                "Password must be at most {} characters",
                MAX_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

/// Parse a `$pbkdf2-sha256$iter$salt$hash` string
fn parse_hash(hash_string: &str) -> Option<(NonZeroU32, Vec<u8>, Vec<u8>)> {
    let parts: Vec<&str> = hash_string.split('$').collect();
    if parts.len() != 5 || !parts[0].is_empty() || parts[1] != "pbkdf2-sha256" {
        return None;
    }

    let iterations = NonZeroU32::new(parts[2].parse().ok()?)?;
    let salt = base64_decode(parts[3])?;
    let hash = base64_decode(parts[4])?;
    Some((iterations, salt, hash))
}

const B64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Base64 encoding without padding
fn base64_encode(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let b0 = chunk[0] as usize;
        let b1 = chunk.get(1).copied().unwrap_or(0) as usize;
        let b2 = chunk.get(2).copied().unwrap_or(0) as usize;

        let n = (b0 << 16) | (b1 << 8) | b2;

        result.push(B64_ALPHABET[(n >> 18) & 0x3F] as char);
        result.push(B64_ALPHABET[(n >> 12) & 0x3F] as char);
        if chunk.len() > 1 {
            result.push(B64_ALPHABET[(n >> 6) & 0x3F] as char);
        }
        if chunk.len() > 2 {
            result.push(B64_ALPHABET[n & 0x3F] as char);
        }
    }

    result
}

/// Base64 decoding
fn base64_decode(s: &str) -> Option<Vec<u8>> {
    const DECODE: [i8; 256] = {
        let mut table = [-1i8; 256];
        let alphabet = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
        let mut i = 0;
        while i < 64 {
            table[alphabet[i] as usize] = i as i8;
            i += 1;
        }
        table
    };

    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len().div_ceil(4) * 3);

    let mut i = 0;
    while i < bytes.len() {
        let b0 = DECODE[bytes[i] as usize];
        let b1 = bytes.get(i + 1).map(|&b| DECODE[b as usize]).unwrap_or(-1);
        let b2 = bytes.get(i + 2).map(|&b| DECODE[b as usize]).unwrap_or(-1);
        let b3 = bytes.get(i + 3).map(|&b| DECODE[b as usize]).unwrap_or(-1);

        if b0 < 0 || b1 < 0 {
            return None;
        }

        let n = ((b0 as u32) << 18)
            | ((b1 as u32) << 12)
            | (if b2 >= 0 { (b2 as u32) << 6 } else { 0 })
            | (if b3 >= 0 { b3 as u32 } else { 0 });

        result.push((n >> 16) as u8);
        if b2 >= 0 {
            result.push((n >> 8) as u8);
        }
        if b3 >= 0 {
            result.push(n as u8);
        }

        i += 4;
    }

    Some(result)
}

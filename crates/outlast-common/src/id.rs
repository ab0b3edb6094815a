//! Opaque 12-byte object identifiers
//!
//! Wire form is the 24-character lowercase hex string. Identifiers are
//! generated from a 4-byte big-endian unix timestamp followed by 8 random
//! bytes, so they sort roughly by creation time.

use std::fmt;
use std::hash::Hash;

use ring::rand::{SecureRandom, SystemRandom};
use time::OffsetDateTime;

use crate::{Error, ErrorCode, Result};

/// Opaque 12-byte document identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a new identifier
    pub fn new() -> Result<Self> {
        let mut bytes = [0u8; 12];
        let secs = OffsetDateTime::now_utc().unix_timestamp();
        bytes[..4].copy_from_slice(&(secs as u32).to_be_bytes());

        let rng = SystemRandom::new();
        rng.fill(&mut bytes[4..])
            .map_err(|_| Error::internal("Failed to generate object id"))?;

        Ok(Self(bytes))
    }

    /// Construct from raw bytes
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Raw byte view
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Parse the 24-hex-character wire form
    pub fn parse_str(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.len() != 24 || !input.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let mut bytes = [0u8; 12];
        for (i, chunk) in input.as_bytes().chunks(2).enumerate() {
            let hi = hex_val(chunk[0]);
            let lo = hex_val(chunk[1]);
            bytes[i] = (hi << 4) | lo;
        }
        Some(Self(bytes))
    }

    /// Render the 24-hex-character wire form
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(24);
        for b in &self.0 {
            out.push(HEX_CHARS[(b >> 4) as usize] as char);
            out.push(HEX_CHARS[(b & 0x0F) as usize] as char);
        }
        out
    }
}

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

fn hex_val(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Parse an identifier from request input, naming the offending field
pub fn parse_object_id(value: &str, field_name: &str) -> Result<ObjectId> {
    ObjectId::parse_str(value).ok_or_else(|| {
        Error::new(ErrorCode::InvalidId, format!("Invalid {}", field_name))
    })
}

//! Bearer credential encoding and decoding
//!
//! HS256 (HMAC-SHA256) tokens in `header.payload.signature` form, base64url
//! without padding. Claims carry only the credential contract: subject,
//! issued-at, expires-at.

use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use time::{Duration, OffsetDateTime};

use crate::{AuthError, AuthResult};

/// Credential claims
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user id, hex form)
    pub sub: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration time (unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Check if the credential is expired at `now`
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now.unix_timestamp() > self.exp
    }

    /// Check if the credential is due for a refresh at `now`
    pub fn should_refresh(&self, now: OffsetDateTime, refresh_interval: Duration) -> bool {
        now.unix_timestamp() - self.iat >= refresh_interval.whole_seconds()
    }

    /// Issued-at as a timestamp
    pub fn issued_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.iat).ok()
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.exp).ok()
    }

    fn to_json(&self) -> String {
        format!(
            "{{\"sub\":\"{}\",\"iat\":{},\"exp\":{}}}",
            escape_json(&self.sub),
            self.iat,
            self.exp
        )
    }

    fn from_json(json: &str) -> AuthResult<Self> {
        let json = json.trim();
        if !json.starts_with('{') || !json.ends_with('}') {
            return Err(AuthError::InvalidToken("Invalid claims JSON".into()));
        }

        let mut sub = None;
        let mut iat = None;
        let mut exp = None;

        for field in json[1..json.len() - 1].split(',') {
            let Some(colon) = field.find(':') else {
                return Err(AuthError::InvalidToken("Invalid claims field".into()));
            };
            let key = field[..colon].trim().trim_matches('"');
            let value = field[colon + 1..].trim();
            match key {
                "sub" => sub = Some(value.trim_matches('"').to_string()),
                "iat" => {
                    iat = Some(
                        value
                            .parse()
                            .map_err(|_| AuthError::InvalidToken("Invalid iat".into()))?,
                    )
                }
                "exp" => {
                    exp = Some(
                        value
                            .parse()
                            .map_err(|_| AuthError::InvalidToken("Invalid exp".into()))?,
                    )
                }
                _ => {}
            }
        }

        match (sub, iat, exp) {
            (Some(sub), Some(iat), Some(exp)) => Ok(Self { sub, iat, exp }),
            _ => Err(AuthError::InvalidToken("Missing claims".into())),
        }
    }
}

/// Credential generator and validator
pub struct Tokenizer {
    /// HMAC key
    key: hmac::Key,
    /// Credential lifetime
    ttl: Duration,
    /// Age after which a replacement credential is minted
    refresh_interval: Duration,
}

impl Tokenizer {
    /// Create a tokenizer with the given secret, TTL and refresh interval
    pub fn new(secret: &[u8], ttl: Duration, refresh_interval: Duration) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
            ttl,
            refresh_interval,
        }
    }

    /// Issue a credential for a subject
    pub fn issue(&self, subject: impl Into<String>) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc();
        self.issue_at(subject, now)
    }

    /// Issue a credential with an explicit issue instant
    pub fn issue_at(&self, subject: impl Into<String>, now: OffsetDateTime) -> AuthResult<String> {
        let claims = Claims {
            sub: subject.into(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };

        let header = r#"{"alg":"HS256","typ":"JWT"}"#;
        let header_b64 = base64url_encode(header.as_bytes());
        let payload_b64 = base64url_encode(claims.to_json().as_bytes());

        let message = format!("{}.{}", header_b64, payload_b64);
        let signature = hmac::sign(&self.key, message.as_bytes());

        Ok(format!("{}.{}", message, base64url_encode(signature.as_ref())))
    }

    /// Validate and decode a credential
    pub fn decode(&self, token: &str) -> AuthResult<Claims> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(AuthError::InvalidToken("Invalid token format".into()));
        }

        let message = format!("{}.{}", parts[0], parts[1]);
        let signature = base64url_decode(parts[2])
            .ok_or_else(|| AuthError::InvalidToken("Invalid signature encoding".into()))?;

        hmac::verify(&self.key, message.as_bytes(), &signature)
            .map_err(|_| AuthError::SignatureInvalid)?;

        let payload = base64url_decode(parts[1])
            .ok_or_else(|| AuthError::InvalidToken("Invalid payload encoding".into()))?;
        let payload = String::from_utf8(payload)
            .map_err(|_| AuthError::InvalidToken("Invalid payload UTF-8".into()))?;

        let claims = Claims::from_json(&payload)?;

        if claims.is_expired(OffsetDateTime::now_utc()) {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    /// Check if a set of claims is due for refresh under this tokenizer
    pub fn needs_refresh(&self, claims: &Claims, now: OffsetDateTime) -> bool {
        claims.should_refresh(now, self.refresh_interval)
    }
}

/// Generate a URL-safe random token (32 random bytes, base64url)
pub fn random_urlsafe_token() -> AuthResult<String> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes)
        .map_err(|_| AuthError::Internal("Failed to generate token".into()))?;
    Ok(base64url_encode(&bytes))
}

const B64URL_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Base64url encoding (no padding)
fn base64url_encode(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let b0 = chunk[0] as usize;
        let b1 = chunk.get(1).copied().unwrap_or(0) as usize;
        let b2 = chunk.get(2).copied().unwrap_or(0) as usize;

        let n = (b0 << 16) | (b1 << 8) | b2;

        result.push(B64URL_ALPHABET[(n >> 18) & 0x3F] as char);
        result.push(B64URL_ALPHABET[(n >> 12) & 0x3F] as char);
        if chunk.len() > 1 {
            result.push(B64URL_ALPHABET[(n >> 6) & 0x3F] as char);
        }
        if chunk.len() > 2 {
            result.push(B64URL_ALPHABET[n & 0x3F] as char);
        }
    }

    result
}

/// Base64url decoding
fn base64url_decode(s: &str) -> Option<Vec<u8>> {
    const DECODE: [i8; 256] = {
        let mut table = [-1i8; 256];
        let alphabet = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
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

/// Escape JSON string
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ => result.push(c),
        }
    }
    result
}

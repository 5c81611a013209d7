//! Session Token Value Objects
//!
//! [`SessionToken`] is the raw cookie value; [`TokenHash`] is what the
//! store keys on.

use std::fmt;

use platform::crypto::{random_token, sha256};

/// Random bytes behind a session token.
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Raw opaque session token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// 32 bytes from the OS RNG, base64url encoded.
    pub fn generate() -> Self {
        Self(random_token(SESSION_TOKEN_BYTES))
    }

    pub fn hash(&self) -> TokenHash {
        TokenHash::of(&self.0)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// SHA-256 of a raw token.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenHash([u8; 32]);

impl TokenHash {
    pub fn of(raw: &str) -> Self {
        Self(sha256(raw.as_bytes()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for TokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenHash({:02x}{:02x}{:02x}{:02x}..)", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

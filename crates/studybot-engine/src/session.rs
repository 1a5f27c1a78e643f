//! Session identity.
//!
//! A [`SessionId`] is an opaque token that correlates one client's requests
//! with the conversation state the server keeps. It is not a secret and makes
//! no uniqueness promise beyond "two tabs will practically never collide".

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every generated session token.
pub const SESSION_PREFIX: &str = "session_";

/// Number of base-36 digits after the prefix.
pub const SESSION_SUFFIX_LEN: usize = 9;

/// Opaque session token, e.g. `session_k3v9x0a1b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new token from the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate a new token from the given RNG.
    ///
    /// The suffix is the base-36 expansion of a random fraction in `[0, 1)`,
    /// truncated to [`SESSION_SUFFIX_LEN`] digits.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let fraction: f64 = rng.gen();
        Self(format!("{SESSION_PREFIX}{}", base36_fraction(fraction, SESSION_SUFFIX_LEN)))
    }

    /// Wrap an existing token (e.g. one passed on the command line).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Expand the fractional part of `value` into `digits` base-36 characters.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
fn base36_fraction(value: f64, digits: usize) -> String {
    let mut frac = value.fract().abs();
    let mut out = String::with_capacity(digits);
    for _ in 0..digits {
        frac *= 36.0;
        let digit = (frac.floor() as u32).min(35);
        frac -= digit as f64;
        // digit is clamped to 0..36, so from_digit cannot fail
        out.push(char::from_digit(digit, 36).unwrap_or('0'));
    }
    out
}

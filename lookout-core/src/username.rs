//! Username validation
//!
//! Accepted keys are 1 to 30 characters drawn from ASCII letters, digits,
//! `.` and `_`. Anything else is rejected before any cache or network access.

use thiserror::Error;

/// Maximum accepted username length
pub const MAX_USERNAME_LEN: usize = 30;

/// A username that matched the key grammar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

/// Rejection reason for a key that does not match the grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidUsername {
    #[error("username is empty")]
    Empty,

    #[error("username is longer than {MAX_USERNAME_LEN} characters")]
    TooLong,

    #[error("username contains disallowed character {0:?}")]
    DisallowedChar(char),
}

impl Username {
    /// Validates a raw key
    pub fn parse(raw: &str) -> Result<Self, InvalidUsername> {
        if raw.is_empty() {
            return Err(InvalidUsername::Empty);
        }

        if let Some(c) = raw.chars().find(|c| !is_allowed(*c)) {
            return Err(InvalidUsername::DisallowedChar(c));
        }

        // Only ASCII remains at this point, so bytes == chars
        if raw.len() > MAX_USERNAME_LEN {
            return Err(InvalidUsername::TooLong);
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_'
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Todo key generation.
//!
//! Two strategies are supported:
//!
//! - [`KeyStrategy::Legacy`]: `todos:<title><n>` with `n` drawn from `0..=9999`.
//!   Existing stores are keyed this way, so it remains the default.
//! - [`KeyStrategy::Uuid`]: `todos:<uuid v7>`, collision-resistant and
//!   independent of the title.

use std::str::FromStr;

use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use super::todo::{KEY_PREFIX, TodoKey};

/// Exclusive upper bound of the legacy random suffix.
pub const LEGACY_SUFFIX_BOUND: u32 = 10_000;

/// How new todo keys are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStrategy {
    /// Title followed by a small random number.
    #[default]
    Legacy,
    /// Time-ordered UUID.
    Uuid,
}

impl KeyStrategy {
    /// Returns true if two generated keys can realistically collide.
    ///
    /// Callers use this to decide whether a key must be checked against the
    /// store before it is used.
    #[must_use]
    pub const fn may_collide(self) -> bool {
        matches!(self, Self::Legacy)
    }

    /// Generates a key for a todo with the given title.
    ///
    /// **Note**: impure; draws from `rng` (legacy) or the clock (uuid).
    pub fn generate<R: Rng>(self, title: &str, rng: &mut R) -> TodoKey {
        match self {
            Self::Legacy => {
                let suffix = rng.random_range(0..LEGACY_SUFFIX_BOUND);
                TodoKey::new(format!("{KEY_PREFIX}{title}{suffix}"))
            }
            Self::Uuid => TodoKey::new(format!("{KEY_PREFIX}{}", Uuid::now_v7())),
        }
    }
}

/// Error returned when a key strategy name is not recognized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid key strategy: '{0}'. Expected 'legacy' or 'uuid'")]
pub struct InvalidKeyStrategy(pub String);

impl FromStr for KeyStrategy {
    type Err = InvalidKeyStrategy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "legacy" | "title" => Ok(Self::Legacy),
            "uuid" | "uuid_v7" => Ok(Self::Uuid),
            _ => Err(InvalidKeyStrategy(value.to_string())),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

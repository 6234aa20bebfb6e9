// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pool capacity configuration and parsing.
//!
//! A [`PoolCapacity`] is the fixed number of elements a [`MemoryPool`]
//! reserves at creation. It supports human-readable string parsing for
//! configuration files and the CLI.
//!
//! [`MemoryPool`]: crate::MemoryPool

use crate::MemoryError;
use std::fmt;

const THOUSAND: usize = 1_000;
const MILLION: usize = 1_000_000;
const BILLION: usize = 1_000_000_000;

/// The fixed element capacity of a pool.
///
/// # Parsing
/// Capacities count elements, not bytes, so suffixes are decimal:
/// - `"64K"` → 64 000 elements
/// - `"100M"` → 100 000 000 elements
/// - `"2G"` → 2 000 000 000 elements
/// - `"4096"` → 4096 elements
///
/// Underscores are accepted as digit separators (`"1_000_000"`).
///
/// # Examples
/// ```
/// use memory_pool::PoolCapacity;
///
/// let c = PoolCapacity::parse("100M").unwrap();
/// assert_eq!(c.elements(), 100_000_000);
///
/// let c = PoolCapacity::from_bytes::<u32>(4096).unwrap();
/// assert_eq!(c.elements(), 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PoolCapacity {
    elements: usize,
}

impl PoolCapacity {
    /// The capacity used when nothing else is configured.
    pub const DEFAULT: Self = Self {
        elements: 100 * MILLION,
    };

    /// Creates a capacity of `elements` elements.
    pub fn new(elements: usize) -> Result<Self, MemoryError> {
        if elements == 0 {
            return Err(MemoryError::ZeroCapacity);
        }
        Ok(Self { elements })
    }

    /// Creates the largest capacity of `T` elements that fits in `bytes`.
    pub fn from_bytes<T>(bytes: usize) -> Result<Self, MemoryError> {
        let size = std::mem::size_of::<T>();
        if size == 0 {
            return Err(MemoryError::ZeroSizedElement);
        }
        Self::new(bytes / size)
    }

    /// Returns the capacity in elements.
    pub fn elements(&self) -> usize {
        self.elements
    }

    /// Returns the number of bytes the backing region for `T` occupies.
    pub fn bytes_for<T>(&self) -> usize {
        self.elements.saturating_mul(std::mem::size_of::<T>())
    }

    /// Parses a human-readable capacity string.
    ///
    /// Accepted formats: `"64K"`, `"100M"`, `"2G"`, or a plain count.
    /// Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MemoryError::InvalidCapacity("empty capacity string".into()));
        }

        let (num_str, multiplier) = match s.chars().last().map(|c| c.to_ascii_uppercase()) {
            Some('G') => (&s[..s.len() - 1], BILLION),
            Some('M') => (&s[..s.len() - 1], MILLION),
            Some('K') => (&s[..s.len() - 1], THOUSAND),
            _ => (s, 1),
        };

        let digits: String = num_str.trim().chars().filter(|&c| c != '_').collect();
        let value: usize = digits.parse().map_err(|_| {
            MemoryError::InvalidCapacity(format!(
                "'{s}': expected an element count followed by an optional suffix (K, M, G)"
            ))
        })?;

        let elements = value
            .checked_mul(multiplier)
            .ok_or_else(|| MemoryError::InvalidCapacity(format!("'{s}' overflows usize")))?;

        Self::new(elements)
    }
}

impl Default for PoolCapacity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for PoolCapacity {
    type Error = MemoryError;

    fn try_from(elements: usize) -> Result<Self, Self::Error> {
        Self::new(elements)
    }
}

impl From<PoolCapacity> for usize {
    fn from(c: PoolCapacity) -> Self {
        c.elements
    }
}

impl std::str::FromStr for PoolCapacity {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PoolCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.elements;
        if n >= BILLION && n % BILLION == 0 {
            write!(f, "{}G elements", n / BILLION)
        } else if n >= MILLION && n % MILLION == 0 {
            write!(f, "{}M elements", n / MILLION)
        } else if n >= THOUSAND && n % THOUSAND == 0 {
            write!(f, "{}K elements", n / THOUSAND)
        } else {
            write!(f, "{n} elements")
        }
    }
}

// Copyright 2026 the Marquee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction-time configuration errors.

use core::fmt;

/// Rejected configuration.
///
/// Runtime paths in this crate never fail; everything that could go wrong is
/// caught when a config is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// A typewriter needs at least one string to cycle through.
    EmptyStrings,
    /// Reveal item counts cannot be negative.
    NegativeItemCount(i64),
    /// Visibility thresholds must be finite and within `0.0..=1.0`.
    InvalidThreshold(f64),
    /// A root margin did not follow the 1–4 value `px`/`%` shorthand.
    InvalidMargin,
    /// An interval that drives an endless timer chain was zero.
    ZeroInterval {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStrings => write!(f, "typewriter requires at least one string"),
            Self::NegativeItemCount(n) => write!(f, "item count must not be negative ({n})"),
            Self::InvalidThreshold(t) => {
                write!(f, "visibility threshold must be within 0..=1 ({t})")
            }
            Self::InvalidMargin => write!(f, "root margin must be 1-4 `px` or `%` values"),
            Self::ZeroInterval { field } => write!(f, "`{field}` must be non-zero"),
        }
    }
}

impl core::error::Error for ConfigError {}

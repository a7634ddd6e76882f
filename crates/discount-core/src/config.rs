//! # Calculator Configuration
//!
//! Behaviour switches for [`crate::calculator::DiscountCalculator`].
//!
//! This module only holds values. Reading them from the environment is done
//! by the process that embeds the calculator (see `discount-db`'s
//! `AppConfig::load`), keeping this crate free of I/O.

use serde::{Deserialize, Serialize};

/// Default cap on codes submitted in one request.
pub const DEFAULT_MAX_CODES_PER_REQUEST: usize = 10;

/// Maximum length of a submitted code string.
pub const MAX_CODE_LENGTH: usize = 64;

/// Calculator configuration.
///
/// ## Example
/// ```rust
/// use discount_core::config::CalculatorConfig;
///
/// let config = CalculatorConfig::default()
///     .reject_unknown_codes(false)
///     .max_codes_per_request(3);
/// assert!(!config.reject_unknown_codes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Fail the calculation with "was not found" when a submitted code has
    /// no stored record. When false, unknown codes are dropped silently.
    /// Default: true
    pub reject_unknown_codes: bool,

    /// Run the combination guard before the pipeline when more than one
    /// candidate is present.
    /// Default: false (the guard stays an optional caller pre-check)
    pub enforce_combination_rules: bool,

    /// Structural limit on submitted codes.
    /// Default: 10
    pub max_codes_per_request: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        CalculatorConfig {
            reject_unknown_codes: true,
            enforce_combination_rules: false,
            max_codes_per_request: DEFAULT_MAX_CODES_PER_REQUEST,
        }
    }
}

impl CalculatorConfig {
    /// Sets whether unknown codes fail the calculation.
    pub fn reject_unknown_codes(mut self, reject: bool) -> Self {
        self.reject_unknown_codes = reject;
        self
    }

    /// Sets whether combination rules are enforced inside `calculate`.
    pub fn enforce_combination_rules(mut self, enforce: bool) -> Self {
        self.enforce_combination_rules = enforce;
        self
    }

    /// Sets the maximum number of codes per request.
    pub fn max_codes_per_request(mut self, max: usize) -> Self {
        self.max_codes_per_request = max;
        self
    }
}

//! Display rounding for percentages.
//!
//! Engine math stays in `f64` at full precision; values are rounded only
//! when they leave the process.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used for APY figures.
pub const APY_DP: u32 = 2;
/// Decimal places used for risk figures.
pub const RISK_DP: u32 = 1;

/// A percentage rounded for presentation.
///
/// Serializes to a JSON number (not string).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisplayPercent(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl DisplayPercent {
    /// Round `value` half away from zero to `dp` places.
    ///
    /// Non-finite inputs become zero.
    pub fn round(value: f64, dp: u32) -> Self {
        let decimal = RustDecimal::from_f64_retain(value).unwrap_or(RustDecimal::ZERO);
        DisplayPercent(decimal.round_dp_with_strategy(
            dp,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    pub fn apy(value: f64) -> Self {
        Self::round(value, APY_DP)
    }

    pub fn risk(value: f64) -> Self {
        Self::round(value, RISK_DP)
    }

}

impl fmt::Display for DisplayPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apy_rounding() {
        assert_eq!(DisplayPercent::apy(11.499999).to_string(), "11.5");
        assert_eq!(DisplayPercent::apy(4.2).to_string(), "4.2");
        assert_eq!(DisplayPercent::apy(-5.556).to_string(), "-5.56");
    }

    #[test]
    fn test_risk_rounding() {
        assert_eq!(DisplayPercent::risk(6.48).to_string(), "6.5");
        assert_eq!(DisplayPercent::risk(10.0).to_string(), "10");
    }

    #[test]
    fn test_non_finite_becomes_zero() {
        assert_eq!(DisplayPercent::apy(f64::NAN), DisplayPercent::default());
        assert_eq!(DisplayPercent::apy(f64::INFINITY), DisplayPercent::default());
    }

    #[test]
    fn test_json_number() {
        let json = serde_json::to_value(DisplayPercent::apy(17.5)).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "17.5");
    }
}

//! Leverage loop count.

use serde::{Deserialize, Serialize};

/// Number of deposit-borrow-redeposit iterations, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct LeverageLoops(u32);

impl LeverageLoops {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 5;

    /// Clamp any integer into the valid range.
    pub fn clamped(raw: i64) -> Self {
        LeverageLoops(raw.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }

    /// No leverage.
    pub fn one() -> Self {
        LeverageLoops(Self::MIN)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn is_leveraged(&self) -> bool {
        self.0 > Self::MIN
    }
}

impl Default for LeverageLoops {
    fn default() -> Self {
        Self::one()
    }
}

impl From<LeverageLoops> for u32 {
    fn from(value: LeverageLoops) -> Self {
        value.0
    }
}

impl TryFrom<i64> for LeverageLoops {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&raw) {
            Ok(LeverageLoops(raw as u32))
        } else {
            Err(format!(
                "leverage loops must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                raw
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped() {
        assert_eq!(LeverageLoops::clamped(-3).get(), 1);
        assert_eq!(LeverageLoops::clamped(0).get(), 1);
        assert_eq!(LeverageLoops::clamped(3).get(), 3);
        assert_eq!(LeverageLoops::clamped(99).get(), 5);
    }

    #[test]
    fn test_is_leveraged() {
        assert!(!LeverageLoops::one().is_leveraged());
        assert!(LeverageLoops::clamped(2).is_leveraged());
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<LeverageLoops>("0").is_err());
        assert!(serde_json::from_str::<LeverageLoops>("6").is_err());
        let loops: LeverageLoops = serde_json::from_str("4").unwrap();
        assert_eq!(loops.get(), 4);
        assert_eq!(serde_json::to_string(&loops).unwrap(), "4");
    }
}

//! Tip Adjustment
//!
//! Gratuity is a percentage of the order before any coupon discount, chosen
//! from a closed menu. Any other value coming from a client is rejected.

use super::helpers::round_currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tip of {0}% is not offered; choose 0, 5, 10 or 15")]
pub struct InvalidTip(pub u32);

/// Tip menu, carried over the wire as a whole percent (0, 5, 10, 15)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TipPercentage {
    #[default]
    None,
    Five,
    Ten,
    Fifteen,
}

impl TipPercentage {
    pub const MENU: [TipPercentage; 4] = [Self::None, Self::Five, Self::Ten, Self::Fifteen];

    pub fn percent(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Five => 5,
            Self::Ten => 10,
            Self::Fifteen => 15,
        }
    }

    /// Fraction applied to the amount, e.g. 0.15
    pub fn rate(self) -> Decimal {
        Decimal::new(i64::from(self.percent()), 2)
    }
}

impl TryFrom<u32> for TipPercentage {
    type Error = InvalidTip;

    fn try_from(percent: u32) -> Result<Self, Self::Error> {
        Self::MENU
            .into_iter()
            .find(|tip| tip.percent() == percent)
            .ok_or(InvalidTip(percent))
    }
}

impl From<TipPercentage> for u32 {
    fn from(tip: TipPercentage) -> Self {
        tip.percent()
    }
}

/// `(base_total + delivery_fee) × rate`, rounded to cents.
pub fn compute_tip(base_total: Decimal, delivery_fee: Decimal, percentage: TipPercentage) -> Decimal {
    round_currency((base_total + delivery_fee) * percentage.rate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fifteen_percent_of_thirty_five() {
        assert_eq!(compute_tip(dec!(35.00), dec!(0), TipPercentage::Fifteen), dec!(5.25));
    }

    #[test]
    fn tip_includes_delivery_fee() {
        assert_eq!(compute_tip(dec!(7.00), dec!(5.00), TipPercentage::Ten), dec!(1.20));
        assert_eq!(compute_tip(dec!(7.00), dec!(5.00), TipPercentage::None), dec!(0.00));
    }

    #[test]
    fn only_menu_values_parse() {
        assert_eq!(TipPercentage::try_from(5).unwrap(), TipPercentage::Five);
        assert_eq!(TipPercentage::try_from(12), Err(InvalidTip(12)));

        let parsed: TipPercentage = serde_json::from_str("15").unwrap();
        assert_eq!(parsed, TipPercentage::Fifteen);
        assert!(serde_json::from_str::<TipPercentage>("20").is_err());
        assert_eq!(serde_json::to_string(&TipPercentage::Ten).unwrap(), "10");
    }
}

//! Denomination breakdowns attached to cash-dispensing operations.
//!
//! The counting hardware reports what actually left the cassettes as an
//! ordered sequence of (denomination, count) pairs. The model treats the
//! sequence as an opaque attachment and never second-guesses the counter,
//! but offers a total for reconciliation against the record's cash amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CASH_SCALE;

/// One denomination line of a payout: how many notes of a given face value
/// were dispensed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanknoteCount {
    /// Face value of the note in the record's cash currency.
    pub denomination: Decimal,
    /// Number of notes of this denomination.
    pub count: u32,
}

impl BanknoteCount {
    /// Creates a denomination line.
    pub fn new(denomination: Decimal, count: u32) -> Self {
        Self {
            denomination,
            count,
        }
    }

    /// Value of this line: denomination × count.
    pub fn subtotal(&self) -> Decimal {
        self.denomination * Decimal::from(self.count)
    }
}

impl fmt::Display for BanknoteCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.count, self.denomination)
    }
}

/// Total value of a denomination breakdown, normalized to cash scale.
pub fn banknote_total(notes: &[BanknoteCount]) -> Decimal {
    notes
        .iter()
        .map(BanknoteCount::subtotal)
        .sum::<Decimal>()
        .round_dp(CASH_SCALE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn subtotal_is_denomination_times_count() {
        let line = BanknoteCount::new(dec!(100), 3);
        assert_eq!(line.subtotal(), dec!(300));
    }

    #[test]
    fn total_sums_all_lines() {
        let notes = vec![
            BanknoteCount::new(dec!(100), 2),
            BanknoteCount::new(dec!(50), 1),
            BanknoteCount::new(dec!(20), 4),
        ];
        assert_eq!(banknote_total(&notes), dec!(330.00));
    }

    #[test]
    fn empty_breakdown_totals_zero() {
        assert_eq!(banknote_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn display_format() {
        let line = BanknoteCount::new(dec!(200), 5);
        assert_eq!(line.to_string(), "5x200");
    }

    #[test]
    fn breakdown_serde_roundtrip() {
        let notes = vec![
            BanknoteCount::new(dec!(500), 1),
            BanknoteCount::new(dec!(100), 7),
        ];
        let json = serde_json::to_string(&notes).unwrap();
        let recovered: Vec<BanknoteCount> = serde_json::from_str(&json).unwrap();
        assert_eq!(notes, recovered);
    }
}

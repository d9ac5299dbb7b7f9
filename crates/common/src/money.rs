//! Money represented in integer cents to avoid floating point drift.

use serde::{Deserialize, Serialize};

/// A currency amount in cents (e.g. 4500 = 45.00).
///
/// Order totals are computed and stored in this representation, and the
/// amount sent to the payment provider is derived from the same cents via
/// [`Money::to_major_string`], so the stored amount and the charged amount
/// can never diverge through rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates an amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates an amount from major units (e.g. dollars), rounding
    /// half-away-from-zero to the nearest cent.
    pub fn from_major_units(major: f64) -> Self {
        Self {
            // f64::round rounds half-way cases away from zero
            cents: (major * 100.0).round() as i64,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the major-unit portion (whole number).
    pub fn major(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents remainder after major units.
    pub fn minor(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }

    /// Renders the amount as a major-unit decimal string, e.g. `"45.00"`.
    ///
    /// This is the wire format for the payment provider. Round-trip
    /// invariant: `Money::from_major_units(s.parse().unwrap()) == self`.
    pub fn to_major_string(&self) -> String {
        if self.cents < 0 {
            format!("-{}.{:02}", self.major().abs(), self.minor())
        } else {
            format!("{}.{:02}", self.major(), self.minor())
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_major_string())
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents -= rhs.cents;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_cents_splits_major_minor() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.major(), 12);
        assert_eq!(money.minor(), 34);
    }

    #[test]
    fn major_string_formatting() {
        assert_eq!(Money::from_cents(4500).to_major_string(), "45.00");
        assert_eq!(Money::from_cents(5).to_major_string(), "0.05");
        assert_eq!(Money::from_cents(100).to_major_string(), "1.00");
        assert_eq!(Money::from_cents(-1234).to_major_string(), "-12.34");
    }

    #[test]
    fn from_major_units_rounds_half_away_from_zero() {
        assert_eq!(Money::from_major_units(10.005).cents(), 1001);
        assert_eq!(Money::from_major_units(10.004).cents(), 1000);
        assert_eq!(Money::from_major_units(-10.005).cents(), -1001);
    }

    #[test]
    fn arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);

        let mut c = a;
        c += b;
        assert_eq!(c.cents(), 1500);
        c -= b;
        assert_eq!(c.cents(), 1000);
    }

    #[test]
    fn serialization_roundtrip() {
        let money = Money::from_cents(999);
        let json = serde_json::to_string(&money).unwrap();
        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(money, deserialized);
    }

    proptest! {
        // The amount stored on an order and the amount charged via the
        // provider's major-unit wire format must be the same number of
        // cents for any cart of 1-10 items priced 0.01..=10000.00.
        #[test]
        fn provider_amount_roundtrip(lines in prop::collection::vec((1i64..=1_000_000, 1u32..=10), 1..=10)) {
            let mut total = Money::zero();
            for (price_cents, qty) in lines {
                total += Money::from_cents(price_cents).multiply(qty);
            }
            let wire = total.to_major_string();
            let parsed = Money::from_major_units(wire.parse::<f64>().unwrap());
            prop_assert_eq!(parsed, total);
        }
    }
}

//! Value objects for the budget domain.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Money amount represented in cents to avoid floating point issues.
///
/// Budget amounts are never negative, so the amount is unsigned.
///
/// `+`, `+=`, `Sum` and `multiply` saturate at `u64::MAX` cents. Use the
/// `checked_*` forms where a clamped amount must not pass for a real one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money {
    cents: u64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from whole currency units.
    pub fn from_units(units: u64) -> Self {
        Self {
            cents: units.saturating_mul(100),
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> u64 {
        self.cents
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents.saturating_mul(u64::from(quantity)),
        }
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.cents.checked_add(rhs.cents).map(Money::from_cents)
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(u64::from(quantity))
            .map(Money::from_cents)
    }

    /// Renders the amount as a plain decimal string, e.g. `"100.00"`.
    ///
    /// This is the form carried in event payloads.
    pub fn to_decimal_string(&self) -> String {
        format!("{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_add(rhs.cents);
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error returned when a decimal amount cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid money amount: '{0}'")]
pub struct ParseMoneyError(String);

impl std::str::FromStr for Money {
    type Err = ParseMoneyError;

    /// Parses `"12"`, `"12.3"` or `"12.34"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseMoneyError(s.to_string());
        let trimmed = s.trim();
        let (units, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

        if units.is_empty() || !units.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: u64 = units.parse().map_err(|_| invalid())?;
        let fraction_cents: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        units
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .map(Money::from_cents)
            .ok_or_else(invalid)
    }
}

/// How a budget is delivered to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMethod {
    Email,
    WhatsApp,
    InPerson,
}

/// A priced line of a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetItem {
    /// What is being charged for (part, labour, ...).
    pub description: String,

    /// Quantity charged.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

impl BudgetItem {
    /// Creates a new budget item.
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this item (quantity * unit_price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// Same as `total_price`, returning `None` on overflow.
    pub fn checked_total_price(&self) -> Option<Money> {
        self.unit_price.checked_multiply(self.quantity)
    }
}

//! Prices in minor currency units.
//!
//! Amounts are stored and computed as integers (`i64`) so order totals are
//! exact. Formatting for display is a property of the store's
//! [`CurrencyCode`], which decides the number of fractional digits and the
//! grouping separators.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors from price parsing and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price cannot be negative")]
    Negative,
    /// The input is not a whole number.
    #[error("price must be a whole number of minor units")]
    Invalid,
    /// The computation does not fit in 64 bits.
    #[error("price overflow")]
    Overflow,
}

/// A non-negative amount in the store currency's minor unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a price from minor units.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for negative amounts.
    pub const fn from_minor(amount: i64) -> Result<Self, PriceError> {
        if amount < 0 {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Multiply by a quantity (a line total).
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for negative quantities and
    /// `PriceError::Overflow` when the result does not fit.
    pub fn checked_mul(self, quantity: i32) -> Result<Self, PriceError> {
        if quantity < 0 {
            return Err(PriceError::Negative);
        }
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Multiply by a quantity for display, clamping at the bounds.
    ///
    /// Negative quantities yield zero.
    #[must_use]
    pub fn saturating_mul(self, quantity: i32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity.max(0))))
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` when the result does not fit.
    pub fn checked_add(self, other: Self) -> Result<Self, PriceError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Sum `(unit price, quantity)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if any line or the running total overflows.
    pub fn total<I>(lines: I) -> Result<Self, PriceError>
    where
        I: IntoIterator<Item = (Self, i32)>,
    {
        lines.into_iter().try_fold(Self::ZERO, |acc, (unit, qty)| {
            acc.checked_add(unit.checked_mul(qty)?)
        })
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount: i64 = s.trim().parse().map_err(|_| PriceError::Invalid)?;
        Self::from_minor(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::from_minor(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// ISO 4217 currency codes the store can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Colombian peso. Retail prices carry no centavos, so the minor unit
    /// used for storage is the peso itself.
    #[default]
    COP,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Currency symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::COP | Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// Number of fractional digits in a stored amount.
    #[must_use]
    pub const fn exponent(self) -> u32 {
        match self {
            Self::COP => 0,
            Self::USD | Self::EUR => 2,
        }
    }

    const fn separators(self) -> (char, char) {
        match self {
            Self::COP | Self::EUR => ('.', ','),
            Self::USD => (',', '.'),
        }
    }

    /// Format a price for display, e.g. `$299.000` (COP) or `$19.99` (USD).
    #[must_use]
    pub fn format(self, price: Price) -> String {
        let (group_sep, decimal_sep) = self.separators();
        let divisor = 10_i64.pow(self.exponent());
        let amount = price.minor_units();
        let whole = amount / divisor;
        let fraction = amount % divisor;

        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(group_sep);
            }
            grouped.push(c);
        }

        if self.exponent() == 0 {
            format!("{}{grouped}", self.symbol())
        } else {
            format!(
                "{}{grouped}{decimal_sep}{fraction:0width$}",
                self.symbol(),
                width = self.exponent() as usize
            )
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::COP => "COP",
            Self::USD => "USD",
            Self::EUR => "EUR",
        };
        f.write_str(code)
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COP" => Ok(Self::COP),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

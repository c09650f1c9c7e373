use anyhow::{Context, Error, Result};
use num_traits::Zero;
use rust_decimal::prelude::*;
use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Decimal amount in the ledger currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(pub Decimal);

impl Money {
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounded to cents, always carrying two decimal places.
    pub fn to_cents(&self) -> Decimal {
        let mut d = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        d.rescale(2);
        if d.is_zero() {
            d.set_sign_positive(true);
        }
        d
    }
}

impl TryFrom<f64> for Money {
    type Error = Error;

    fn try_from(f: f64) -> Result<Self> {
        let d = Decimal::from_f64(f).context(format!("Failed to convert {} to Money", f))?;
        Ok(Self(d))
    }
}

impl From<i64> for Money {
    fn from(n: i64) -> Self {
        Money(Decimal::from(n))
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let d = Decimal::from_str(s.trim()).context(format!("Failed to parse Money from {s:?}"))?;
        Ok(Self(d))
    }
}

/// Lenient parse of an exported numeric field.
///
/// Strips whitespace, thousands separators and currency symbols or codes,
/// reads `(12.50)` as a negative and falls back to zero on anything that is
/// still not a number or is beyond any real order amount. Never fails.
pub fn parse_amount(raw: &str) -> Money {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("nan") {
        return Money::zero();
    }
    let (negated, inner) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };
    let cleaned: String = inner
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    // currency symbols and codes sit at either end of the number
    let cleaned = cleaned
        .trim_start_matches(is_currency_char)
        .trim_end_matches(|c: char| !(c.is_ascii_digit() || c == '.'));
    let cleaned = match cleaned.strip_prefix('-') {
        Some(rest) => format!("-{}", rest.trim_start_matches(is_currency_char)),
        None => cleaned.to_owned(),
    };

    let value = Decimal::from_str(&cleaned)
        .ok()
        .or_else(|| Decimal::from_scientific(&cleaned).ok())
        .or_else(|| {
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(Decimal::from_f64)
        })
        .filter(|d| d.abs() <= amount_limit())
        .unwrap_or_default();
    if negated {
        Money(-value)
    } else {
        Money(value)
    }
}

/// Largest magnitude read from an export. Sums of any number of such amounts
/// stay far inside `Decimal`'s range.
fn amount_limit() -> Decimal {
    Decimal::new(1_000_000_000_000_000, 0)
}

fn is_currency_char(c: char) -> bool {
    !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cents())
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl Zero for Money {
    fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod money_tests {
    use super::*;

    #[test]
    fn display_two_places() -> Result<()> {
        let m: Money = 1f64.try_into()?;
        assert_eq!(m.to_string(), "1.00");
        let m: Money = 1.1f64.try_into()?;
        assert_eq!(m.to_string(), "1.10");
        let m: Money = "1.125".parse()?;
        assert_eq!(m.to_string(), "1.13");
        assert_eq!(Money::from(-0).to_string(), "0.00");
        Ok(())
    }

    #[test]
    fn test_add() -> Result<()> {
        let add = Money::try_from(100.00f64)? + Money::try_from(100.00f64)?;
        assert_eq!(add.to_string(), "200.00");
        let total: Money = ["1.10", "2.20", "3.30"]
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<Money>>>()?
            .into_iter()
            .sum();
        assert_eq!(total, "6.60".parse()?);
        Ok(())
    }

    #[test]
    fn parse_amount_plain() -> Result<()> {
        assert_eq!(parse_amount("130"), Money::from(130));
        assert_eq!(parse_amount(" 12.50 "), "12.50".parse()?);
        assert_eq!(parse_amount("-3.25"), "-3.25".parse()?);
        assert_eq!(parse_amount("+7"), Money::from(7));
        assert_eq!(parse_amount("1e3"), Money::from(1000));
        assert_eq!(parse_amount("1000000000000000"), Money::from(1_000_000_000_000_000));
        Ok(())
    }

    #[test]
    fn parse_amount_decorated() -> Result<()> {
        assert_eq!(parse_amount("1,234.56"), "1234.56".parse()?);
        assert_eq!(parse_amount("$1,000"), Money::from(1000));
        assert_eq!(parse_amount("AED 45.00"), "45.00".parse()?);
        assert_eq!(parse_amount("45.00 AED"), "45.00".parse()?);
        assert_eq!(parse_amount("€ 9.99"), "9.99".parse()?);
        assert_eq!(parse_amount("(12.50)"), "-12.50".parse()?);
        assert_eq!(parse_amount("-$5"), Money::from(-5));
        Ok(())
    }

    #[test]
    fn parse_amount_falls_back_to_zero() {
        for raw in [
            "",
            "   ",
            "-",
            "nan",
            "NaN",
            "abc",
            "12abc34",
            "1.2.3",
            "--5",
            "inf",
            "()",
            "$",
            "99999999999999999999999999999999999",
            "79228162514264337593543950335",
            "1000000000000000.01",
            "1e20",
        ] {
            assert_eq!(parse_amount(raw), Money::zero(), "input {raw:?}");
        }
    }
}

use self::JournalAmount::*;
use crate::money::Money;
use chrono::NaiveDate;
use num_traits::Zero;
use rust_decimal::Decimal;
use serde::Serialize;
use std::ops::AddAssign;

pub type JournalAccount = String;

/// Largest debit/credit difference still reported as balanced.
pub fn balance_tolerance() -> Money {
    Money(Decimal::new(1, 2))
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum JournalAmount {
    Debit(Money),
    Credit(Money),
}

impl Default for JournalAmount {
    fn default() -> Self {
        JournalAmount::Debit(Money::default())
    }
}

impl JournalAmount {
    /// Positive amounts are debits, negative amounts credits.
    pub fn from_signed(amount: Money) -> Self {
        if amount.is_negative() {
            Credit(-amount)
        } else {
            Debit(amount)
        }
    }

    pub fn as_debit(&self) -> Option<Money> {
        match self {
            Debit(money) => Some(*money),
            Credit(_) => None,
        }
    }
    pub fn as_credit(&self) -> Option<Money> {
        match self {
            Debit(_) => None,
            Credit(money) => Some(*money),
        }
    }
    /// Debit positive, credit negative
    pub fn signed(&self) -> Money {
        match self {
            Debit(money) => *money,
            Credit(money) => -*money,
        }
    }

    pub fn to_row_string(&self, pad: usize) -> String {
        match self {
            Debit(money) => format!("{:>pad$} | {:>pad$}", money.to_string(), ""),
            Credit(money) => format!("{:>pad$} | {:>pad$}", "", money.to_string()),
        }
    }
}

impl AddAssign for JournalAmount {
    fn add_assign(&mut self, other: Self) {
        *self = Self::from_signed(self.signed() + other.signed());
    }
}

/// One debit or credit row against a ledger account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalLine {
    pub date: NaiveDate,
    pub account: JournalAccount,
    pub description: String,
    pub tax_rate: String,
    pub amount: JournalAmount,
}

impl JournalLine {
    /// Line for a signed amount, or `None` when the amount is zero.
    pub fn signed(
        date: NaiveDate,
        account: &str,
        description: &str,
        tax_rate: &str,
        amount: Money,
    ) -> Option<Self> {
        if amount.is_zero() {
            return None;
        }
        Some(JournalLine {
            date,
            account: account.to_owned(),
            description: description.to_owned(),
            tax_rate: tax_rate.to_owned(),
            amount: JournalAmount::from_signed(amount),
        })
    }

    pub fn debit(
        date: NaiveDate,
        account: &str,
        description: &str,
        tax_rate: &str,
        amount: Money,
    ) -> Option<Self> {
        Self::signed(date, account, description, tax_rate, amount)
    }

    pub fn credit(
        date: NaiveDate,
        account: &str,
        description: &str,
        tax_rate: &str,
        amount: Money,
    ) -> Option<Self> {
        Self::signed(date, account, description, tax_rate, -amount)
    }
}

/// Debit and credit totals of a set of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BalanceCheck {
    pub debits: Money,
    pub credits: Money,
}

impl BalanceCheck {
    pub fn of(lines: &[JournalLine]) -> Self {
        Self {
            debits: lines.iter().filter_map(|line| line.amount.as_debit()).sum(),
            credits: lines.iter().filter_map(|line| line.amount.as_credit()).sum(),
        }
    }

    /// Debits minus credits.
    pub fn variance(&self) -> Money {
        self.debits - self.credits
    }

    pub fn is_balanced(&self) -> bool {
        self.variance().abs() < balance_tolerance()
    }
}

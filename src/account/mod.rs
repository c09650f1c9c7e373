pub mod raw;

use crate::journal::JournalAccount;
use anyhow::{bail, Error, Result};
use std::cmp::Reverse;
use std::convert::TryFrom;

/// Account used when a payment method matches nothing in the table.
pub const SUSPENSE_ACCOUNT: &str = "199 - Payment Suspense";

/// Partial matches prefer the longest overlapping label, then table order.
const BUILTIN_MAPPINGS: &[(&str, &str)] = &[
    ("Stripe", "102 - Stripe Account"),
    ("Cash on Delivery (COD)", "110 - Cash on Delivery"),
    ("Cash on Delivery (COD) + custom", "110 - Cash on Delivery"),
    ("Cash on Delivery (COD) + Bank Deposit", "110 - Cash on Delivery"),
    ("Tamara Split Payments", "111 - Tamara"),
    ("Tamara", "111 - Tamara"),
    ("Tabby", "112 - Tabby"),
    ("Custom (POS)", "113 - POS Account"),
    ("Manual", "114 - Bank Transfer"),
    ("Bank Deposit", "114 - Bank Transfer"),
    ("Gift Card", "115 - Gift Card Clearing"),
    ("Card", "102 - Card Account"),
    ("Cash", "101 - Cash Account"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentMapping {
    pub label: String,
    pub account: JournalAccount,
    key: String,
}

impl PaymentMapping {
    pub fn new(label: &str, account: &str) -> Result<Self> {
        let key = normalize(label);
        if key.is_empty() {
            bail!("Payment mapping label cannot be empty (account {:?})", account);
        }
        if account.trim().is_empty() {
            bail!("Payment mapping for {:?} has no account", label);
        }
        Ok(Self {
            label: label.to_owned(),
            account: account.trim().to_owned(),
            key,
        })
    }
}

/// How a payment method label was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mapping<'a> {
    Exact(&'a PaymentMapping),
    Partial(&'a PaymentMapping),
    /// Fell through to the default account
    Unmapped(&'a str),
}

impl<'a> Mapping<'a> {
    pub fn account(&self) -> &'a str {
        match self {
            Mapping::Exact(mapping) | Mapping::Partial(mapping) => mapping.account.as_str(),
            Mapping::Unmapped(account) => account,
        }
    }
}

/// Immutable table from payment method label to ledger account.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAccounts {
    mappings: Vec<PaymentMapping>,
    default: JournalAccount,
}

impl PaymentAccounts {
    pub fn new(mappings: Vec<PaymentMapping>, default: &str) -> Result<Self> {
        if default.trim().is_empty() {
            bail!("Default payment account cannot be empty");
        }
        Ok(Self {
            mappings,
            default: default.trim().to_owned(),
        })
    }

    pub fn default_account(&self) -> &str {
        &self.default
    }

    pub fn mappings(&self) -> &[PaymentMapping] {
        &self.mappings
    }

    /// Exact match ignoring case, spacing, `_` and `-`. Otherwise the table
    /// label with the longest overlap: contained in the method, or containing
    /// a method of at least three characters. Otherwise the default account.
    pub fn lookup(&self, method: &str) -> Mapping<'_> {
        let key = normalize(method);
        if key.is_empty() {
            return Mapping::Unmapped(&self.default);
        }
        if let Some(mapping) = self.mappings.iter().find(|m| m.key == key) {
            return Mapping::Exact(mapping);
        }
        let partial = self
            .mappings
            .iter()
            .filter_map(|m| {
                if key.contains(m.key.as_str()) {
                    Some((m, m.key.len()))
                } else if key.len() >= 3 && m.key.contains(key.as_str()) {
                    Some((m, key.len()))
                } else {
                    None
                }
            })
            .min_by_key(|(_, overlap)| Reverse(*overlap));
        match partial {
            Some((mapping, _)) => Mapping::Partial(mapping),
            None => Mapping::Unmapped(&self.default),
        }
    }
}

impl Default for PaymentAccounts {
    fn default() -> Self {
        Self {
            mappings: BUILTIN_MAPPINGS
                .iter()
                .map(|(label, account)| PaymentMapping {
                    label: label.to_string(),
                    account: account.to_string(),
                    key: normalize(label),
                })
                .collect(),
            default: SUSPENSE_ACCOUNT.to_owned(),
        }
    }
}

impl TryFrom<raw::PaymentAccounts> for PaymentAccounts {
    type Error = Error;

    fn try_from(raw: raw::PaymentAccounts) -> Result<Self> {
        let builtin = Self::default();
        let mappings = match raw.mappings {
            Some(mappings) => mappings
                .iter()
                .map(|m| PaymentMapping::new(&m.label, &m.account))
                .collect::<Result<Vec<_>>>()?,
            None => builtin.mappings,
        };
        Self::new(mappings, raw.default.as_deref().unwrap_or(&builtin.default))
    }
}

fn normalize(label: &str) -> String {
    label
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

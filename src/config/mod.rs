mod raw;

use crate::account::PaymentAccounts;
use crate::journal::JournalAccount;
use anyhow::{bail, Context, Error, Result};
use async_std::fs;
use std::{
    convert::{TryFrom, TryInto},
    str::FromStr,
};

/// How order discounts reach the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscountTreatment {
    /// Sales credited gross with a separate discount debit
    #[default]
    Explicit,
    /// Sales credited net of discount
    Contra,
}

impl FromStr for DiscountTreatment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "explicit" => Ok(Self::Explicit),
            "contra" => Ok(Self::Contra),
            other => bail!("Invalid discount treatment {:?}, expected explicit or contra", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerAccounts {
    pub sales: JournalAccount,
    pub zero_rated_sales: JournalAccount,
    pub shipping: JournalAccount,
    pub discount: JournalAccount,
    pub tax: JournalAccount,
}

impl Default for LedgerAccounts {
    fn default() -> Self {
        Self {
            sales: "208 - Revenue - Shopify".to_string(),
            zero_rated_sales: "208 - Revenue - Shopify".to_string(),
            shipping: "203 - Revenue - Shipping Retail".to_string(),
            discount: "205B - Sales Discount [Shopify]".to_string(),
            tax: "820 - VAT Payable".to_string(),
        }
    }
}

/// Tax rate labels carried on each line for the ledger import.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxRates {
    pub standard: String,
    pub zero_rated: String,
    pub exempt: String,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            standard: "Output VAT 5% (5%)".to_string(),
            zero_rated: "Zero Rated Output VAT (0%)".to_string(),
            exempt: "Tax Exempt (0%)".to_string(),
        }
    }
}

/// Rules for turning a day of orders into journal lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Orders billed outside this country are zero-rated
    pub home_country: String,
    /// Prefix of each day's description
    pub narration: String,
    pub delimiter: u8,
    pub discount_treatment: DiscountTreatment,
    pub accounts: LedgerAccounts,
    pub tax_rates: TaxRates,
    pub payment_accounts: PaymentAccounts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_country: "AE".to_string(),
            narration: "Shopify Sales".to_string(),
            delimiter: b',',
            discount_treatment: DiscountTreatment::default(),
            accounts: LedgerAccounts::default(),
            tax_rates: TaxRates::default(),
            payment_accounts: PaymentAccounts::default(),
        }
    }
}

impl Config {
    pub async fn from_file(file: &str) -> Result<Self> {
        let doc = fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read config file {}", file))?;
        doc.parse()
            .with_context(|| format!("Invalid config file {}", file))
    }
}

fn non_empty(field: &str, value: Option<String>, default: String) -> Result<String> {
    match value {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => bail!("Config field {} cannot be empty", field),
        Some(value) => Ok(value.trim().to_owned()),
    }
}

impl TryFrom<raw::Config> for Config {
    type Error = Error;

    fn try_from(raw: raw::Config) -> Result<Self> {
        let defaults = Config::default();
        let delimiter = match raw.delimiter {
            None => defaults.delimiter,
            Some(delimiter) => match delimiter.as_bytes() {
                [byte] => *byte,
                _ => bail!("Delimiter must be a single byte, got {:?}", delimiter),
            },
        };
        let raw_accounts = raw.accounts.unwrap_or_default();
        let accounts = LedgerAccounts {
            sales: non_empty("accounts.sales", raw_accounts.sales, defaults.accounts.sales)?,
            zero_rated_sales: non_empty(
                "accounts.zero_rated_sales",
                raw_accounts.zero_rated_sales,
                defaults.accounts.zero_rated_sales,
            )?,
            shipping: non_empty(
                "accounts.shipping",
                raw_accounts.shipping,
                defaults.accounts.shipping,
            )?,
            discount: non_empty(
                "accounts.discount",
                raw_accounts.discount,
                defaults.accounts.discount,
            )?,
            tax: non_empty("accounts.tax", raw_accounts.tax, defaults.accounts.tax)?,
        };
        let raw_rates = raw.tax_rates.unwrap_or_default();
        let tax_rates = TaxRates {
            standard: raw_rates.standard.unwrap_or(defaults.tax_rates.standard),
            zero_rated: raw_rates.zero_rated.unwrap_or(defaults.tax_rates.zero_rated),
            exempt: raw_rates.exempt.unwrap_or(defaults.tax_rates.exempt),
        };
        Ok(Config {
            home_country: non_empty("home_country", raw.home_country, defaults.home_country)?,
            narration: non_empty("narration", raw.narration, defaults.narration)?,
            delimiter,
            discount_treatment: raw
                .discount_treatment
                .map(|s| s.parse::<DiscountTreatment>())
                .transpose()?
                .unwrap_or(defaults.discount_treatment),
            accounts,
            tax_rates,
            payment_accounts: raw
                .payment_accounts
                .map(PaymentAccounts::try_from)
                .transpose()
                .context("Invalid payment_accounts")?
                .unwrap_or(defaults.payment_accounts),
        })
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(doc: &str) -> Result<Self, Self::Err> {
        if doc.trim().is_empty() {
            return Ok(Config::default());
        }
        let raw_config: raw::Config = serde_yaml::from_str(doc)
            .with_context(|| format!("Failed to deserialize Config:\n{}", doc))?;
        let config: Config = raw_config
            .try_into()
            .context("Failed to convert Config")?;
        Ok(config)
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn empty_doc_is_default() -> Result<()> {
        let config: Config = "".parse()?;
        assert_eq!(config, Config::default());
        let config: Config = "home_country: AE\n".parse()?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn full_doc() -> Result<()> {
        let config: Config = indoc! {"
            home_country: GB
            narration: Web Sales
            delimiter: ;
            discount_treatment: contra
            accounts:
              sales: 4000 - Sales
              zero_rated_sales: 4010 - Export Sales
              tax: 2200 - VAT
            tax_rates:
              standard: 20% (VAT on Income)
            payment_accounts:
              default: 1299 - Suspense
              mappings:
                - label: PayPal
                  account: 1210 - PayPal
        "}
        .parse()?;
        dbg!(&config);
        assert_eq!(config.home_country, "GB");
        assert_eq!(config.narration, "Web Sales");
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.discount_treatment, DiscountTreatment::Contra);
        assert_eq!(config.accounts.sales, "4000 - Sales");
        assert_eq!(config.accounts.zero_rated_sales, "4010 - Export Sales");
        assert_eq!(config.accounts.shipping, LedgerAccounts::default().shipping);
        assert_eq!(config.accounts.tax, "2200 - VAT");
        assert_eq!(config.tax_rates.standard, "20% (VAT on Income)");
        assert_eq!(config.tax_rates.exempt, TaxRates::default().exempt);
        assert_eq!(config.payment_accounts.default_account(), "1299 - Suspense");
        assert_eq!(
            config.payment_accounts.lookup("paypal").account(),
            "1210 - PayPal"
        );
        Ok(())
    }

    #[test]
    fn invalid_docs() {
        for (doc, expected) in [
            ("currency: AED\n", "Failed to deserialize Config"),
            ("discount_treatment: half\n", "Failed to convert Config"),
            ("delimiter: '||'\n", "Failed to convert Config"),
            ("accounts:\n  sales: ''\n", "Failed to convert Config"),
        ] {
            let result: Result<Config> = doc.parse();
            assert!(
                matches!(&result, Err(e) if e.to_string().contains(expected)),
                "{doc:?} gave {result:?}"
            );
        }
    }
}

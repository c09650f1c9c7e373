use crate::account::raw::PaymentAccounts;
use serde::{Deserialize, Serialize};

/// Raw struct deserilized from yaml
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub home_country: Option<String>,
    pub narration: Option<String>,
    pub delimiter: Option<String>,
    pub discount_treatment: Option<String>,
    pub accounts: Option<Accounts>,
    pub tax_rates: Option<TaxRates>,
    pub payment_accounts: Option<PaymentAccounts>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Accounts {
    pub sales: Option<String>,
    pub zero_rated_sales: Option<String>,
    pub shipping: Option<String>,
    pub discount: Option<String>,
    pub tax: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TaxRates {
    pub standard: Option<String>,
    pub zero_rated: Option<String>,
    pub exempt: Option<String>,
}

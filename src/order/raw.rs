use serde::Deserialize;

/// Raw order row deserialized from the export, headers trimmed and lowercased
#[derive(Debug, PartialEq, Clone, Deserialize, Default)]
pub struct Order {
    /// Line of the export the row was read from
    #[serde(skip)]
    pub line: u64,
    #[serde(rename = "created at")]
    pub created_at: String,
    pub subtotal: String,
    pub shipping: String,
    #[serde(rename = "discount amount")]
    pub discount_amount: String,
    pub taxes: String,
    pub total: String,
    #[serde(rename = "payment method")]
    pub payment_method: String,
    #[serde(rename = "billing country", default)]
    pub billing_country: Option<String>,
}

use serde::{Deserialize, Serialize};

/// Raw struct deserilized from yaml
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PaymentAccounts {
    pub default: Option<String>,
    pub mappings: Option<Vec<PaymentMapping>>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentMapping {
    pub label: String,
    pub account: String,
}

//! Merchant context data model

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Lifecycle stage given to a merchant seen for the first time
pub const STAGE_LEAD: &str = "Lead";

/// Lifecycle stage given when a stored context could not be read
pub const STAGE_UNKNOWN: &str = "Desconocido";

/// Read `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Contacts map with `null` entries dropped
fn contacts_without_nulls<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let contacts: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(contacts
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(role, contact)| contact.map(|contact| (role, contact)))
        .collect())
}

/// Everything known about one merchant
///
/// Every field defaults, whether the key is missing or `null`, so partial
/// model output still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantContext {
    #[serde(deserialize_with = "null_as_default")]
    pub merchant_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lifecycle_stage: String,
    #[serde(deserialize_with = "null_as_default")]
    pub commercial_commitments: String,
    #[serde(deserialize_with = "contacts_without_nulls")]
    pub key_contacts: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub technical_restrictions: Vec<TechnicalRestriction>,
    #[serde(deserialize_with = "null_as_default")]
    pub geographies_mops: Vec<GeographyMops>,
    #[serde(deserialize_with = "null_as_default")]
    pub pending_tasks: Vec<String>,
}

impl MerchantContext {
    /// Base context for `merchant_name` at `stage`
    pub fn base(merchant_name: impl Into<String>, stage: &str) -> Self {
        Self {
            merchant_name: merchant_name.into(),
            lifecycle_stage: stage.to_string(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalRestriction {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub detail: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source_reference: String,
}

/// Methods of payment enabled in one country
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeographyMops {
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mops: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub fraud_risk_level: String,
}

/// Answer to a business question plus a dashboard filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryAnswer {
    #[serde(deserialize_with = "null_as_default")]
    pub business_answer: String,
    pub visualization_filter: Option<VisualizationFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationFilter {
    #[serde(deserialize_with = "null_as_default")]
    pub field: String,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

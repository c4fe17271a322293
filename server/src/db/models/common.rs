//! Shared value types embedded in several documents

use serde::{Deserialize, Serialize};

/// Bilingual display text (the shop serves English and Spanish)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocalizedText {
    pub en: String,
    pub es: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, es: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            es: es.into(),
        }
    }
}

/// Postal address snapshot
///
/// Orders snapshot the shipping/billing address at checkout time; users
/// keep a list of saved mailing addresses in the same shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub country: String,
}

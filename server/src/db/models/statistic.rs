//! Statistics Models
//!
//! Derived, rebuildable views over orders and view events. Never treated
//! as authoritative: the nightly rebuild regenerates them wholesale from
//! the primary data.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;
use crate::utils::time;

/// One daily or monthly bucket
///
/// `period_key` is `YYYY-MM-DD` (for months: the first day of the month);
/// `period_key_ms` is the UTC-midnight millisecond value used for sorting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStat {
    pub orders: i64,
    pub views: i64,
    /// Euros sold in the period
    pub sells: f64,
    pub period_key: String,
    pub period_key_ms: i64,
}

impl PeriodStat {
    pub fn empty(period_key: String) -> Self {
        let period_key_ms = time::parse_date(&period_key)
            .map(time::key_millis)
            .unwrap_or(0);
        Self {
            orders: 0,
            views: 0,
            sells: 0.0,
            period_key,
            period_key_ms,
        }
    }
}

/// Find the entry for `key`, appending an empty one if missing.
///
/// Keeps the at-most-one-entry-per-period invariant: callers bump counters
/// through this accessor instead of pushing entries themselves.
pub fn entry_for<'a>(entries: &'a mut Vec<PeriodStat>, key: &str) -> &'a mut PeriodStat {
    if let Some(pos) = entries.iter().position(|e| e.period_key == key) {
        return &mut entries[pos];
    }
    entries.push(PeriodStat::empty(key.to_string()));
    entries.last_mut().expect("just pushed")
}

/// Per-product time series, one document per product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatistic {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    #[serde(default)]
    pub daily_statistics: Vec<PeriodStat>,
    #[serde(default)]
    pub monthly_statistics: Vec<PeriodStat>,
}

impl ProductStatistic {
    pub fn empty(product_id: RecordId) -> Self {
        Self {
            id: None,
            product_id,
            daily_statistics: Vec::new(),
            monthly_statistics: Vec::new(),
        }
    }
}

/// Store-wide rolling snapshot - a singleton at a fixed record id,
/// deleted and recreated on every nightly rebuild
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStatistic {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub total_sells: f64,
    pub total_views: i64,
    pub total_orders: i64,
    pub total_users: i64,
    pub total_products: i64,
    pub total_active_products: i64,
    pub total_categories: i64,
    #[serde(default)]
    pub daily_statistics: Vec<PeriodStat>,
    #[serde(default)]
    pub monthly_statistics: Vec<PeriodStat>,
}

/// Raw product view event, append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub user_id: Option<RecordId>,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_for_creates_once() {
        let mut entries = Vec::new();
        entry_for(&mut entries, "2023-05-01").views += 1;
        entry_for(&mut entries, "2023-05-01").views += 1;
        entry_for(&mut entries, "2023-05-02").views += 1;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].views, 2);
        assert_eq!(entries[1].views, 1);
    }

    #[test]
    fn empty_entry_numeric_key() {
        let entry = PeriodStat::empty("2023-01-01".to_string());
        assert_eq!(entry.period_key_ms, 1_672_531_200_000);
        assert_eq!(entry.orders, 0);
        assert_eq!(entry.sells, 0.0);
    }
}

//! Error audit log model
//!
//! Every error response is persisted here before it is sent, whether the
//! condition was transient or permanent.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLog {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub message: String,
    /// Raw response body the message was extracted from
    #[serde(default)]
    pub detail: String,
    pub error_code: u16,
    pub method: String,
    pub url: String,
    pub created_at: i64,
}

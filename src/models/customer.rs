use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer record. Managed elsewhere; the scheduler only checks
/// existence before appending history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One entry in a customer's append-only history trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerHistoryEntry {
    pub id: Uuid,
    pub customer_id: String,
    /// Entry category, e.g. `appointment`.
    pub category: String,
    pub note: String,
    /// Id of the event that produced the entry (the appointment id here).
    pub event_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

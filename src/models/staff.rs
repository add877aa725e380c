use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A staff member. Managed elsewhere; the scheduler only checks existence
/// and reads the display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

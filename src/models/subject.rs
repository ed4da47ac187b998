use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient identity. Created once at registration; the identifier is
/// immutable and every other resource references it by id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub display_name: String,
    /// Contact identifiers (email addresses, phone numbers) as opaque strings.
    pub contact: Vec<String>,
    pub registered_at: DateTime<Utc>,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A diagnostic event grouping the observations extracted from one
/// document. Immutable after creation; corrections are new Reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub document_id: Uuid,
    /// Clinical date of the underlying diagnostic event.
    pub effective_date: NaiveDate,
    /// Upload timestamp, used to break effective-date ties (later wins).
    pub issued: DateTime<Utc>,
    /// Ordered references to this report's observations. Always non-empty.
    pub observation_ids: Vec<Uuid>,
}

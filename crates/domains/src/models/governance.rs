use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::labelled_enum;

/// Progress of a farmer's pest/disease treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GovernanceStatus {
    #[default]
    InProgress,
    Completed,
    Cancelled,
}

labelled_enum!(GovernanceStatus, "governance status", {
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

/// A farmer-owned report of a pest/disease occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceRecord {
    pub id: i64,
    /// Owner; only this user or an admin may mutate the record.
    pub user_id: i64,
    pub pest_type: String,
    pub found_time: DateTime<Utc>,
    pub location: Option<String>,
    pub status: GovernanceStatus,
    pub description: Option<String>,
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGovernanceRecord {
    pub pest_type: String,
    pub found_time: DateTime<Utc>,
    pub location: Option<String>,
    pub status: GovernanceStatus,
    pub description: Option<String>,
    pub photos: Vec<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GovernanceRecordPatch {
    pub pest_type: Option<String>,
    pub found_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub status: Option<GovernanceStatus>,
    pub description: Option<String>,
    pub photos: Option<Vec<String>>,
}

impl GovernanceRecordPatch {
    pub fn apply_to(self, record: &mut GovernanceRecord) {
        if let Some(v) = self.pest_type {
            record.pest_type = v;
        }
        if let Some(v) = self.found_time {
            record.found_time = v;
        }
        if let Some(v) = self.location {
            record.location = Some(v);
        }
        if let Some(v) = self.status {
            record.status = v;
        }
        if let Some(v) = self.description {
            record.description = Some(v);
        }
        if let Some(v) = self.photos {
            record.photos = v;
        }
    }
}

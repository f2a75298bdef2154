use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::labelled_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningLevel {
    #[default]
    Normal,
    Urgent,
}

labelled_enum!(WarningLevel, "warning level", {
    Normal => "NORMAL",
    Urgent => "URGENT",
});

/// A broadcast pest warning with an explicit expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningMessage {
    pub id: i64,
    pub level: WarningLevel,
    pub affected_scope: String,
    pub prevention_measures: String,
    pub publish_time: DateTime<Utc>,
    pub expire_time: DateTime<Utc>,
}

impl WarningMessage {
    /// A warning is active strictly before its expiry instant.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_time > now
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWarning {
    pub level: WarningLevel,
    pub affected_scope: String,
    pub prevention_measures: String,
    pub expire_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_instant_itself_is_inactive() {
        let now = Utc::now();
        let warning = WarningMessage {
            id: 1,
            level: WarningLevel::Urgent,
            affected_scope: "orchard A".into(),
            prevention_measures: "spray".into(),
            publish_time: now - Duration::hours(1),
            expire_time: now,
        };
        assert!(!warning.is_active_at(now));
        assert!(warning.is_active_at(now - Duration::seconds(1)));
    }
}

use serde::{Deserialize, Serialize};

use super::labelled_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PestCategory {
    Disease,
    Pest,
}

labelled_enum!(PestCategory, "pest category", {
    Disease => "DISEASE",
    Pest => "PEST",
});

/// A knowledge-base entry describing one pest or disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PestInfo {
    pub id: i64,
    pub name: String,
    pub category: PestCategory,
    pub affected_part: Option<String>,
    pub symptom_description: Option<String>,
    pub peak_season: Option<String>,
    pub typical_image: Option<String>,
    /// Ordered by scheme id.
    pub prevention_schemes: Vec<PreventionScheme>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPestInfo {
    pub name: String,
    pub category: PestCategory,
    pub affected_part: Option<String>,
    pub symptom_description: Option<String>,
    pub peak_season: Option<String>,
    pub typical_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PestInfoPatch {
    pub name: Option<String>,
    pub category: Option<PestCategory>,
    pub affected_part: Option<String>,
    pub symptom_description: Option<String>,
    pub peak_season: Option<String>,
    pub typical_image: Option<String>,
}

impl PestInfoPatch {
    pub fn apply_to(self, pest: &mut PestInfo) {
        if let Some(v) = self.name {
            pest.name = v;
        }
        if let Some(v) = self.category {
            pest.category = v;
        }
        if let Some(v) = self.affected_part {
            pest.affected_part = Some(v);
        }
        if let Some(v) = self.symptom_description {
            pest.symptom_description = Some(v);
        }
        if let Some(v) = self.peak_season {
            pest.peak_season = Some(v);
        }
        if let Some(v) = self.typical_image {
            pest.typical_image = Some(v);
        }
    }
}

/// A recommended treatment for a pest entry; deleted with its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreventionScheme {
    pub id: i64,
    pub pest_id: i64,
    pub pesticide_name: String,
    pub recommended_dosage: Option<String>,
    pub application_time: Option<String>,
    pub operation_spec: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPreventionScheme {
    pub pesticide_name: String,
    pub recommended_dosage: Option<String>,
    pub application_time: Option<String>,
    pub operation_spec: Option<String>,
}

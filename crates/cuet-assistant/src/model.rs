use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One course offered by one university, as listed in the CUET participating
/// universities dataset.
///
/// Fields that are missing or `null` in the source document read as empty
/// strings. Anything else the document carries (seats, eligibility, fees...)
/// is kept in `extra` and written back out when the record is serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniversityCourseRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub university_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub university_short: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub course_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub course_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_course_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UniversityCourseRecord {
    /// Lower-cased haystack the relevance filter matches query terms against.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.university_name,
            self.university_short,
            self.location,
            self.course_name,
            self.course_category,
            self.standard_course_name.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// One institution in a NIRF ranking list. Rank is the record's position in
/// its category list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RankingRecord {
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.city, self.state).to_lowercase()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UniversityDataset {
    #[serde(default)]
    pub universities: Vec<UniversityCourseRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingCategory {
    #[serde(default)]
    pub rankings: Vec<RankingRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingDataset {
    #[serde(default)]
    pub categories: HashMap<String, RankingCategory>,
}

impl RankingDataset {
    pub const OVERALL: &'static str = "overall";

    pub fn category(&self, key: &str) -> &[RankingRecord] {
        self.categories
            .get(key)
            .map(|c| c.rankings.as_slice())
            .unwrap_or_default()
    }

    pub fn overall(&self) -> &[RankingRecord] {
        self.category(Self::OVERALL)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::error::AppError;
use crate::model::{RankingDataset, RankingRecord, UniversityCourseRecord, UniversityDataset};

/// Reference collections shared read-only by every request.
#[derive(Debug, Default)]
pub struct ReferenceData {
    pub universities: Vec<UniversityCourseRecord>,
    /// The NIRF "overall" category, in rank order.
    pub rankings: Vec<RankingRecord>,
}

impl ReferenceData {
    pub fn load(config: &Config) -> Result<Arc<Self>, AppError> {
        let universities = load_universities(&config.cuet_data_path)?;
        let rankings = load_rankings(&config.nirf_data_path)?;
        if rankings.overall().is_empty() {
            warn!(
                path = %config.nirf_data_path.display(),
                "ranking dataset has no overall category, ranking answers will be empty"
            );
        }
        Ok(Arc::new(Self {
            universities,
            rankings: rankings.overall().to_vec(),
        }))
    }
}

pub fn load_universities(path: &Path) -> Result<Vec<UniversityCourseRecord>, AppError> {
    let dataset: UniversityDataset = cuet_common::fs::read_json(path)?;
    if dataset.universities.is_empty() {
        warn!(path = %path.display(), "university dataset is empty");
    }
    Ok(dataset.universities)
}

pub fn load_rankings(path: &Path) -> Result<RankingDataset, AppError> {
    Ok(cuet_common::fs::read_json(path)?)
}

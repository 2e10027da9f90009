// FeatureCache - JSON persistence of an extracted dataset
//
// Extraction is by far the slowest step, so the CLI writes the extracted
// dataset once and evaluates from the cache afterwards.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ClassLabelMap, LabeledDataset};
use crate::error::DatasetError;

/// Current on-disk format version
pub const CACHE_VERSION: u32 = 1;

/// Serialized form of a labeled dataset plus its class map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCache {
    pub version: u32,
    pub class_names: ClassLabelMap,
    pub feature_count: usize,
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
}

impl FeatureCache {
    pub fn from_dataset(dataset: &LabeledDataset, classes: &ClassLabelMap) -> Self {
        Self {
            version: CACHE_VERSION,
            class_names: classes.clone(),
            feature_count: dataset.dimension().unwrap_or(0),
            features: dataset.rows().to_vec(),
            labels: dataset.labels().to_vec(),
        }
    }

    /// Rebuild the dataset, re-checking every invariant
    pub fn into_dataset(self) -> Result<(LabeledDataset, ClassLabelMap), DatasetError> {
        if self.version != CACHE_VERSION {
            return Err(DatasetError::CacheFailed {
                reason: format!(
                    "unsupported cache version {} (expected {})",
                    self.version, CACHE_VERSION
                ),
            });
        }
        if let Some(row) = self.features.iter().find(|r| r.len() != self.feature_count) {
            return Err(DatasetError::InconsistentDimension {
                expected: self.feature_count,
                actual: row.len(),
            });
        }

        let dataset =
            LabeledDataset::from_parts(self.features, self.labels, self.class_names.len())?;
        Ok((dataset, self.class_names))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DatasetError> {
        let path = path.as_ref();
        let json = serde_json::to_string(self).map_err(|err| DatasetError::CacheFailed {
            reason: err.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| DatasetError::CacheFailed {
                reason: format!("creating {}: {}", parent.display(), err),
            })?;
        }
        fs::write(path, json).map_err(|err| DatasetError::CacheFailed {
            reason: format!("writing {}: {}", path.display(), err),
        })?;

        log::info!(
            "[FeatureCache] Saved {} samples x {} features to {}",
            self.features.len(),
            self.feature_count,
            path.display()
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| DatasetError::CacheFailed {
            reason: format!("reading {}: {}", path.display(), err),
        })?;
        serde_json::from_str(&json).map_err(|err| DatasetError::CacheFailed {
            reason: format!("parsing {}: {}", path.display(), err),
        })
    }
}

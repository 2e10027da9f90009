// Types module - Data structures for audio features
//
// This module defines the fixed-layout feature vector produced by the
// extraction pipeline and consumed (as a plain row) by the classifier.

use serde::{Deserialize, Serialize};

/// Number of cepstral coefficients per frame
pub const N_MFCC: usize = 13;

/// Total feature count: 13 MFCC means + 13 MFCC stds + 4 temporal + 6 spectral
pub const FEATURE_COUNT: usize = 2 * N_MFCC + 4 + 6;

/// Index of the first temporal statistic (ZCR mean)
pub const TEMPORAL_OFFSET: usize = 2 * N_MFCC;

/// Index of the first spectral statistic (centroid mean)
pub const SPECTRAL_OFFSET: usize = TEMPORAL_OFFSET + 4;

/// Names of every feature in vector order
pub fn feature_names() -> Vec<String> {
    let mut names = Vec::with_capacity(FEATURE_COUNT);
    names.extend((0..N_MFCC).map(|i| format!("mfcc{}_mean", i)));
    names.extend((0..N_MFCC).map(|i| format!("mfcc{}_std", i)));
    for stat in [
        "zcr_mean",
        "zcr_std",
        "rms_mean",
        "rms_std",
        "centroid_mean",
        "centroid_std",
        "bandwidth_mean",
        "bandwidth_std",
        "rolloff_mean",
        "rolloff_std",
    ] {
        names.push(stat.to_string());
    }
    names
}

/// Features extracted from one normalized clip
///
/// Layout (36 values):
/// `[mfcc_mean×13, mfcc_std×13, zcr_mean, zcr_std, rms_mean, rms_std,
///   centroid_mean, centroid_std, bandwidth_mean, bandwidth_std,
///   rolloff_mean, rolloff_std]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Assemble the vector from its per-family statistics
    ///
    /// # Arguments
    /// * `mfcc` - Per-coefficient (mean, std) pairs, `N_MFCC` of them
    /// * `temporal` - (mean, std) of ZCR then RMS
    /// * `spectral` - (mean, std) of centroid, bandwidth, roll-off
    pub fn from_stats(
        mfcc: &[(f64, f64); N_MFCC],
        temporal: [(f64, f64); 2],
        spectral: [(f64, f64); 3],
    ) -> Self {
        let mut values = Vec::with_capacity(FEATURE_COUNT);
        values.extend(mfcc.iter().map(|(mean, _)| *mean));
        values.extend(mfcc.iter().map(|(_, std)| *std));
        for (mean, std) in temporal.into_iter().chain(spectral) {
            values.push(mean);
            values.push(std);
        }
        Self { values }
    }

    /// Wrap an existing row, checking its length
    pub fn from_vec(values: Vec<f64>) -> Option<Self> {
        (values.len() == FEATURE_COUNT).then_some(Self { values })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mfcc_means(&self) -> &[f64] {
        &self.values[..N_MFCC]
    }

    pub fn mfcc_stds(&self) -> &[f64] {
        &self.values[N_MFCC..TEMPORAL_OFFSET]
    }

    /// `[zcr_mean, zcr_std, rms_mean, rms_std]`
    pub fn temporal(&self) -> &[f64] {
        &self.values[TEMPORAL_OFFSET..SPECTRAL_OFFSET]
    }

    /// `[centroid_mean, centroid_std, bandwidth_mean, bandwidth_std, rolloff_mean, rolloff_std]`
    pub fn spectral(&self) -> &[f64] {
        &self.values[SPECTRAL_OFFSET..]
    }

    /// True when every value is finite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(FEATURE_COUNT, 36);
        assert_eq!(TEMPORAL_OFFSET, 26);
        assert_eq!(SPECTRAL_OFFSET, 30);
        assert_eq!(feature_names().len(), FEATURE_COUNT);
        assert_eq!(feature_names()[26], "zcr_mean");
        assert_eq!(feature_names()[35], "rolloff_std");
    }

    #[test]
    fn test_from_stats_order() {
        let mut mfcc = [(0.0, 0.0); N_MFCC];
        for (i, pair) in mfcc.iter_mut().enumerate() {
            *pair = (i as f64, 100.0 + i as f64);
        }
        let vector = FeatureVector::from_stats(
            &mfcc,
            [(1.0, 2.0), (3.0, 4.0)],
            [(5.0, 6.0), (7.0, 8.0), (9.0, 10.0)],
        );

        assert_eq!(vector.len(), FEATURE_COUNT);
        assert_eq!(vector.mfcc_means()[12], 12.0);
        assert_eq!(vector.mfcc_stds()[0], 100.0);
        assert_eq!(vector.temporal(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(vector.spectral(), &[5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(FeatureVector::from_vec(vec![0.0; FEATURE_COUNT]).is_some());
        assert!(FeatureVector::from_vec(vec![0.0; 35]).is_none());
    }
}

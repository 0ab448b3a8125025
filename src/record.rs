//! The flat feature vector handed to downstream classifiers.
//!
//! Analyzers report frequencies in Hz. [`FeatureRecord::from_raw`] is the only
//! place units change: every frequency-valued feature is divided by 1000, and
//! so is the mean spectral flatness even though it is a ratio. Classifiers
//! trained on earlier extractions expect that scaling.

use serde::Serialize;

use crate::error::{AnalysisError, Result};

/// Label stored until a classifier or ground truth supplies one.
pub const PLACEHOLDER_LABEL: i64 = 1;

const HZ_PER_KHZ: f64 = 1000.0;

/// Record keys in output order, `label` excluded.
pub const FEATURE_KEYS: [&str; 21] = [
    "meanfreq", "sd", "median", "Q25", "Q75", "IQR", "skew", "kurt", "sp.ent", "sfm", "mode",
    "centroid", "peakf", "meanfun", "minfun", "maxfun", "meandom", "mindom", "maxdom", "dfrange",
    "modindx",
];

/// Analyzer outputs before unit conversion. Frequencies are in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFeatures {
    pub mean_frequency: f64,
    pub standard_deviation: f64,
    pub median_frequency: f64,
    pub q25: f64,
    pub q75: f64,
    pub iqr: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub entropy: f64,
    pub mean_flatness: f64,
    pub mode_frequency: f64,
    pub mean_centroid: f64,
    pub peak_frequency: f64,
    pub mean_fundamental: f64,
    pub min_fundamental: f64,
    pub max_fundamental: f64,
    pub mean_dominant: f64,
    pub min_dominant: f64,
    pub max_dominant: f64,
    pub dominant_range: f64,
    pub modulation_index: f64,
}

/// Serialize-only: degenerate features are NaN, which JSON writes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub meanfreq: f64,
    pub sd: f64,
    pub median: f64,
    #[serde(rename = "Q25")]
    pub q25: f64,
    #[serde(rename = "Q75")]
    pub q75: f64,
    #[serde(rename = "IQR")]
    pub iqr: f64,
    pub skew: f64,
    pub kurt: f64,
    #[serde(rename = "sp.ent")]
    pub sp_ent: f64,
    pub sfm: f64,
    pub mode: f64,
    pub centroid: f64,
    pub peakf: f64,
    pub meanfun: f64,
    pub minfun: f64,
    pub maxfun: f64,
    pub meandom: f64,
    pub mindom: f64,
    pub maxdom: f64,
    pub dfrange: f64,
    pub modindx: f64,
    pub label: i64,
}

impl FeatureRecord {
    /// Convert analyzer outputs into the record, rejecting infinities.
    /// NaN passes through as the degenerate value of an empty track.
    pub fn from_raw(raw: &RawFeatures) -> Result<Self> {
        let khz = |hz: f64| hz / HZ_PER_KHZ;
        let (q25, q75) = (khz(raw.q25), khz(raw.q75));
        let (mindom, maxdom) = (khz(raw.min_dominant), khz(raw.max_dominant));
        // ranges are taken after scaling so they match the reported bounds exactly
        let record = Self {
            meanfreq: khz(raw.mean_frequency),
            sd: khz(raw.standard_deviation),
            median: khz(raw.median_frequency),
            q25,
            q75,
            iqr: q75 - q25,
            skew: raw.skewness,
            kurt: raw.kurtosis,
            sp_ent: raw.entropy,
            sfm: raw.mean_flatness / HZ_PER_KHZ,
            mode: khz(raw.mode_frequency),
            centroid: khz(raw.mean_centroid),
            peakf: khz(raw.peak_frequency),
            meanfun: khz(raw.mean_fundamental),
            minfun: khz(raw.min_fundamental),
            maxfun: khz(raw.max_fundamental),
            meandom: khz(raw.mean_dominant),
            mindom,
            maxdom,
            dfrange: maxdom - mindom,
            modindx: raw.modulation_index,
            label: PLACEHOLDER_LABEL,
        };
        for (key, value) in record.entries() {
            if value.is_infinite() {
                return Err(AnalysisError::NonFinite { key, value });
            }
        }
        Ok(record)
    }

    pub fn with_label(mut self, label: i64) -> Self {
        self.label = label;
        self
    }

    /// Feature values in [`FEATURE_KEYS`] order.
    pub fn entries(&self) -> [(&'static str, f64); 21] {
        let values = [
            self.meanfreq,
            self.sd,
            self.median,
            self.q25,
            self.q75,
            self.iqr,
            self.skew,
            self.kurt,
            self.sp_ent,
            self.sfm,
            self.mode,
            self.centroid,
            self.peakf,
            self.meanfun,
            self.minfun,
            self.maxfun,
            self.meandom,
            self.mindom,
            self.maxdom,
            self.dfrange,
            self.modindx,
        ];
        let mut entries = [("", 0.0); 21];
        for (slot, (key, value)) in entries.iter_mut().zip(FEATURE_KEYS.iter().zip(values)) {
            *slot = (*key, value);
        }
        entries
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find_map(|(name, value)| (name == key).then_some(value))
    }
}

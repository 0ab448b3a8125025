use super::statistics::mean;

/// Frame-to-frame variability of the dominant frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationIndex {
    /// max - min of the track in Hz; NaN for an empty track
    pub dfrange: f64,
    /// Mean absolute consecutive difference over `dfrange`, 0 when flat
    pub index: f64,
}

impl ModulationIndex {
    pub fn compute(dominant: &[f64]) -> Self {
        if dominant.is_empty() {
            return Self {
                dfrange: f64::NAN,
                index: 0.0,
            };
        }

        let min = dominant.iter().copied().fold(f64::INFINITY, f64::min);
        let max = dominant.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let dfrange = max - min;
        if dfrange == 0.0 {
            return Self { dfrange, index: 0.0 };
        }

        let changes: Vec<f64> = dominant
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).abs())
            .collect();
        Self {
            dfrange,
            index: mean(&changes) / dfrange,
        }
    }
}

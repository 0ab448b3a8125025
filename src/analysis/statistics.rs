use ndarray::Array1;

/// Population central moments of a sample, `None` for an empty sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Moments {
    pub mean: f64,
    pub m2: f64,
    pub m3: f64,
    pub m4: f64,
}

impl Moments {
    pub(crate) fn of(values: &Array1<f64>) -> Option<Self> {
        let mean = values.mean()?;
        let n = values.len() as f64;
        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &value in values {
            let d = value - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        Some(Self {
            mean,
            m2: m2 / n,
            m3: m3 / n,
            m4: m4 / n,
        })
    }

    pub(crate) fn std_dev(&self) -> f64 {
        self.m2.sqrt()
    }

    /// Biased sample skewness, NaN for a constant sample.
    pub(crate) fn skewness(&self) -> f64 {
        if self.m2 == 0.0 {
            return f64::NAN;
        }
        self.m3 / self.m2.powf(1.5)
    }

    /// Biased excess (Fisher) kurtosis, NaN for a constant sample.
    pub(crate) fn kurtosis(&self) -> f64 {
        if self.m2 == 0.0 {
            return f64::NAN;
        }
        self.m4 / (self.m2 * self.m2) - 3.0
    }
}

/// Natural-log Shannon entropy of a probability mass function.
pub(crate) fn shannon_entropy(pmf: &Array1<f64>) -> f64 {
    pmf.iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.ln())
        .sum()
}

/// Frequency one bin past the last cumulative mass at or below `threshold`.
/// The index is clamped to the final bin.
pub(crate) fn cumulative_crossing(
    frequencies: &Array1<f64>,
    cumulative: &Array1<f64>,
    threshold: f64,
) -> f64 {
    let Some(last) = frequencies.len().checked_sub(1) else {
        return 0.0;
    };
    let below = cumulative.iter().filter(|&&mass| mass <= threshold).count();
    frequencies[(below + 1).min(last)]
}

/// Running sum, preserving length.
pub(crate) fn cumulative_sum(values: &Array1<f64>) -> Array1<f64> {
    let mut total = 0.0;
    values.mapv(|value| {
        total += value;
        total
    })
}

/// Index of the first maximum, `None` for an empty slice.
pub(crate) fn argmax<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.into_iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

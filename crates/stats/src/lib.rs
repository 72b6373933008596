//! Statistical helper functions for the Nebula point-cloud toolkit.
//!
//! Slice helpers ([`mean`], [`sd`], [`median`], [`robust_scale`]) operate on
//! materialised data. The accumulators ([`RunningSummary`], [`Deviations`])
//! support single-pass and two-pass aggregation over values that are produced
//! on the fly, e.g. while walking neighbor lists.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sample variance with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / (n as f64 - 1.0)
}

/// Sample standard deviation with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn sd(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Quantile with linear interpolation between order statistics (Hyndman & Fan type 7).
///
/// **Expects pre-sorted input** (caller's responsibility).
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    assert!(
        !sorted.is_empty(),
        "quantile_type7: input must not be empty"
    );
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo])
}

/// Median of pre-sorted data. For even length, averages the middle two values.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn median(sorted: &[f64]) -> f64 {
    assert!(!sorted.is_empty(), "median: input must not be empty");
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Cascade measure of spread:
///
/// 1. IQR (Q75 - Q25). If IQR > 1e-10, return IQR.
/// 2. MAD with constant=1 (median of |x - median(x)|). If MAD > 1e-10, return MAD.
/// 3. SD. If SD > 1e-10, return SD.
/// 4. Fallback: 1.0.
///
/// Empty input falls straight through to 1.0.
pub fn robust_scale(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 1.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    // 1. IQR
    let q25 = quantile_type7(&sorted, 0.25);
    let q75 = quantile_type7(&sorted, 0.75);
    let iqr = q75 - q25;
    if iqr > 1e-10 {
        return iqr;
    }

    // 2. MAD (constant = 1)
    let med = median(&sorted);
    let mut abs_devs: Vec<f64> = data.iter().map(|&x| (x - med).abs()).collect();
    abs_devs.sort_by(f64::total_cmp);
    let mad = median(&abs_devs);
    if mad > 1e-10 {
        return mad;
    }

    // 3. SD
    let s = sd(data);
    if s > 1e-10 {
        return s;
    }

    // 4. Fallback
    1.0
}

/// Smallest and largest finite value of a slice, or `None` if there is none.
pub fn extent(data: &[f64]) -> Option<(f64, f64)> {
    data.iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Single-pass count / min / max / running mean accumulator.
///
/// An empty summary reports `min = +inf`, `max = -inf` and a `NaN` mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningSummary {
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
}

impl RunningSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: f64::NAN,
        }
    }

    /// Adds one observation.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        if self.count == 1 {
            self.mean = value;
        } else {
            self.mean += (value - self.mean) / self.count as f64;
        }
    }

    /// Number of observations.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Smallest observation, `+inf` when empty.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest observation, `-inf` when empty.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Running mean, `NaN` when empty.
    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl Default for RunningSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<f64> for RunningSummary {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for v in iter {
            self.push(v);
        }
    }
}

/// Second-pass accumulator of deviations about a known centre.
///
/// Produces the population standard deviation `sqrt(mean((x - c)^2))` and the
/// mean absolute deviation `mean(|x - c|)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviations {
    centre: f64,
    count: usize,
    sum_sq: f64,
    sum_abs: f64,
}

impl Deviations {
    /// Creates an empty accumulator around `centre`.
    pub fn about(centre: f64) -> Self {
        Self {
            centre,
            count: 0,
            sum_sq: 0.0,
            sum_abs: 0.0,
        }
    }

    /// Adds one observation.
    pub fn push(&mut self, value: f64) {
        let d = value - self.centre;
        self.count += 1;
        self.sum_sq += d * d;
        self.sum_abs += d.abs();
    }

    /// Number of observations.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Root mean squared deviation about the centre. `NaN` when empty.
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        (self.sum_sq / self.count as f64).sqrt()
    }

    /// Mean absolute deviation about the centre. `NaN` when empty.
    pub fn mean_abs_deviation(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.sum_abs / self.count as f64
    }
}

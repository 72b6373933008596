//! Euclidean distance kernels and per-axis normalization.

use std::cmp::Ordering;

/// Total ascending order on distances with every NaN ranked last,
/// whatever its sign bit.
pub(crate) fn ascending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

/// Squared Euclidean distance between two equally long coordinate slices.
///
/// Dispatches to a specialised implementation for the 2D case.
pub(crate) fn sq_euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    match a.len() {
        2 => sq_euclidean_2d(a, b),
        _ => a
            .iter()
            .zip(b)
            .map(|(&x, &y)| {
                let d = x - y;
                d * d
            })
            .sum(),
    }
}

#[inline]
fn sq_euclidean_2d(a: &[f64], b: &[f64]) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    d0 * d0 + d1 * d1
}

/// Squared Euclidean distance with each component difference divided by its
/// length scale:
///
/// ```text
/// Σⱼ ((a[j] − b[j]) / scales[j])²
/// ```
pub(crate) fn weighted_sq_euclidean(a: &[f64], b: &[f64], scales: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len(), scales.len());
    let mut acc = 0.0;
    for j in 0..a.len() {
        let d = (a[j] - b[j]) / scales[j];
        acc += d * d;
    }
    acc
}

/// Maps `coord` into the unit box spanned by `min` and `max`.
///
/// A zero-width axis is treated as having width 1, so its relative
/// coordinate is `coord[j] - min[j]`.
pub(crate) fn relative(coord: &[f64], min: &[f64], max: &[f64]) -> Vec<f64> {
    debug_assert_eq!(coord.len(), min.len());
    debug_assert_eq!(coord.len(), max.len());
    coord
        .iter()
        .zip(min.iter().zip(max))
        .map(|(&c, (&lo, &hi))| {
            let width = hi - lo;
            let width = if width == 0.0 { 1.0 } else { width };
            (c - lo) / width
        })
        .collect()
}

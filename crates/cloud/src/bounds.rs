//! Axis-aligned bounds and data-driven length scales.

use serde::{Deserialize, Serialize};

use crate::error::{CloudError, check_dimension};
use crate::point::PointAdapter;

/// Per-axis lower and upper bounds.
///
/// Used both as the sampling box for random points and as the `min`/`max`
/// pair of a [`DistanceMetric`](crate::DistanceMetric).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from per-axis minima and maxima.
    ///
    /// # Errors
    ///
    /// [`CloudError::DimensionMismatch`] if `min` and `max` differ in length.
    pub fn new(min: impl Into<Vec<f64>>, max: impl Into<Vec<f64>>) -> Result<Self, CloudError> {
        let min = min.into();
        let max = max.into();
        check_dimension("max", min.len(), max.len())?;
        Ok(Self { min, max })
    }

    /// The unit hypercube `[0, 1]^dimension`.
    pub fn unit(dimension: usize) -> Self {
        Self::uniform(dimension, 0.0, 1.0)
    }

    /// The hypercube `[min, max]^dimension`.
    pub fn uniform(dimension: usize, min: f64, max: f64) -> Self {
        Self {
            min: vec![min; dimension],
            max: vec![max; dimension],
        }
    }

    /// Smallest bounding box of `points`.
    ///
    /// Returns `Ok(None)` for an empty input.
    ///
    /// # Errors
    ///
    /// [`CloudError::DimensionMismatch`] if points disagree in dimension,
    /// [`CloudError::UndefinedBound`] if an axis has no finite value.
    pub fn enclosing<'a, P, I>(points: I) -> Result<Option<Self>, CloudError>
    where
        P: PointAdapter + 'a,
        I: IntoIterator<Item = &'a P>,
    {
        let columns = match columns(points)? {
            Some(c) => c,
            None => return Ok(None),
        };
        let mut min = Vec::with_capacity(columns.len());
        let mut max = Vec::with_capacity(columns.len());
        for (axis, column) in columns.iter().enumerate() {
            let (lo, hi) =
                nebula_stats::extent(column).ok_or(CloudError::UndefinedBound { axis })?;
            min.push(lo);
            max.push(hi);
        }
        Ok(Some(Self { min, max }))
    }

    /// Per-axis minima.
    pub fn min(&self) -> &[f64] {
        &self.min
    }

    /// Per-axis maxima.
    pub fn max(&self) -> &[f64] {
        &self.max
    }

    /// Number of axes.
    pub fn dimension(&self) -> usize {
        self.min.len()
    }

    /// Checks that every bound and every axis width is finite and no axis is
    /// inverted.
    ///
    /// # Errors
    ///
    /// [`CloudError::UndefinedBound`] for a NaN or infinite bound, or an axis
    /// whose width `max[i] - min[i]` overflows;
    /// [`CloudError::InvertedBounds`] when `min[i] > max[i]`.
    pub fn validate(&self) -> Result<(), CloudError> {
        for (axis, (&min, &max)) in self.min.iter().zip(&self.max).enumerate() {
            if !min.is_finite() || !max.is_finite() {
                return Err(CloudError::UndefinedBound { axis });
            }
            if min > max {
                return Err(CloudError::InvertedBounds { axis, min, max });
            }
            if !(max - min).is_finite() {
                return Err(CloudError::UndefinedBound { axis });
            }
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.min, self.max)
    }
}

/// Estimates one length scale per axis from the spread of `points`.
///
/// Each axis uses [`nebula_stats::robust_scale`] (IQR, then MAD, then SD,
/// then 1.0), so the result is always strictly positive. Returns an empty
/// vector for an empty input.
///
/// # Errors
///
/// [`CloudError::DimensionMismatch`] if points disagree in dimension.
pub fn estimate_length_scales<'a, P, I>(points: I) -> Result<Vec<f64>, CloudError>
where
    P: PointAdapter + 'a,
    I: IntoIterator<Item = &'a P>,
{
    Ok(columns(points)?
        .unwrap_or_default()
        .iter()
        .map(|column| nebula_stats::robust_scale(column))
        .collect())
}

/// Transposes point coordinates into one vector per axis.
fn columns<'a, P, I>(points: I) -> Result<Option<Vec<Vec<f64>>>, CloudError>
where
    P: PointAdapter + 'a,
    I: IntoIterator<Item = &'a P>,
{
    let mut columns: Option<Vec<Vec<f64>>> = None;
    for point in points {
        let coords = point.coordinates();
        let cols = columns.get_or_insert_with(|| vec![Vec::new(); coords.len()]);
        check_dimension("point", cols.len(), coords.len())?;
        for (col, &c) in cols.iter_mut().zip(coords.iter()) {
            col.push(c);
        }
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::VectorPoint;
    use approx::assert_abs_diff_eq;

    #[test]
    fn new_rejects_ragged_bounds() {
        assert!(matches!(
            Bounds::new(vec![0.0, 0.0], vec![1.0]),
            Err(CloudError::DimensionMismatch {
                what: "max",
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn unit_bounds() {
        let b = Bounds::unit(3);
        assert_eq!(b.dimension(), 3);
        assert_eq!(b.min(), &[0.0; 3]);
        assert_eq!(b.max(), &[1.0; 3]);
        assert!(b.validate().is_ok());
    }

    #[test]
    fn validate_undefined_and_inverted() {
        let b = Bounds::new(vec![0.0, f64::NAN], vec![1.0, 1.0]).unwrap();
        assert!(matches!(
            b.validate(),
            Err(CloudError::UndefinedBound { axis: 1 })
        ));

        let b = Bounds::new(vec![2.0], vec![1.0]).unwrap();
        assert!(matches!(
            b.validate(),
            Err(CloudError::InvertedBounds { axis: 0, .. })
        ));

        let b = Bounds::new(vec![0.0, -f64::MAX], vec![1.0, f64::MAX]).unwrap();
        assert!(matches!(
            b.validate(),
            Err(CloudError::UndefinedBound { axis: 1 })
        ));

        // zero-width axes are allowed
        let b = Bounds::new(vec![1.0], vec![1.0]).unwrap();
        assert!(b.validate().is_ok());
    }

    #[test]
    fn enclosing_box() {
        let pts = vec![
            VectorPoint::from([0.0, 5.0]),
            VectorPoint::from([-1.0, 2.0]),
            VectorPoint::from([3.0, 4.0]),
        ];
        let b = Bounds::enclosing(&pts).unwrap().unwrap();
        assert_eq!(b.min(), &[-1.0, 2.0]);
        assert_eq!(b.max(), &[3.0, 5.0]);
    }

    #[test]
    fn enclosing_empty_is_none() {
        let pts: Vec<VectorPoint> = Vec::new();
        assert_eq!(Bounds::enclosing(&pts).unwrap(), None);
    }

    #[test]
    fn enclosing_rejects_mixed_dimensions() {
        let pts = vec![VectorPoint::from([0.0, 5.0]), VectorPoint::from([1.0])];
        assert!(matches!(
            Bounds::enclosing(&pts),
            Err(CloudError::DimensionMismatch { what: "point", .. })
        ));
    }

    #[test]
    fn length_scales_per_axis() {
        let pts: Vec<VectorPoint> = (1..=10)
            .map(|i| VectorPoint::from([i as f64, 7.0]))
            .collect();
        let scales = estimate_length_scales(&pts).unwrap();
        assert_eq!(scales.len(), 2);
        // IQR of 1..=10 is 4.5; the constant axis falls back to 1.0
        assert_abs_diff_eq!(scales[0], 4.5, epsilon = 1e-12);
        assert_abs_diff_eq!(scales[1], 1.0, epsilon = 1e-12);
    }
}

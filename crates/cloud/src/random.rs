//! Uniform random points inside axis-aligned bounds.

use rand::Rng;
use rand::distr::{Distribution, Uniform};

use crate::bounds::Bounds;
use crate::error::CloudError;
use crate::point::PointAdapter;

/// Draws one point uniformly from `bounds`, inclusive on both ends.
///
/// # Errors
///
/// [`CloudError::UndefinedBound`] if a bound or an axis width is NaN or
/// infinite,
/// [`CloudError::InvertedBounds`] if an axis has `min > max`.
///
/// # Example
///
/// ```
/// use nebula_cloud::{Bounds, PointAdapter, VectorPoint, random_point};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let bounds = Bounds::new(vec![0.0, 10.0], vec![1.0, 20.0]).unwrap();
/// let mut rng = StdRng::seed_from_u64(3);
/// let p: VectorPoint = random_point(&bounds, &mut rng).unwrap();
/// assert!((10.0..=20.0).contains(&p.coordinates()[1]));
/// ```
pub fn random_point<P: PointAdapter>(
    bounds: &Bounds,
    rng: &mut impl Rng,
) -> Result<P, CloudError> {
    bounds.validate()?;
    let coords = bounds
        .min()
        .iter()
        .zip(bounds.max())
        .enumerate()
        .map(|(axis, (&lo, &hi))| -> Result<f64, CloudError> {
            let axis_dist = Uniform::<f64>::new_inclusive(lo, hi)
                .map_err(|_| CloudError::UndefinedBound { axis })?;
            Ok(axis_dist.sample(&mut *rng))
        })
        .collect::<Result<Vec<f64>, _>>()?;
    Ok(P::from_coordinates(coords))
}

/// Draws one point from the hypercube `[min, max]^dimension`.
pub fn random_point_in<P: PointAdapter>(
    dimension: usize,
    min: f64,
    max: f64,
    rng: &mut impl Rng,
) -> Result<P, CloudError> {
    random_point(&Bounds::uniform(dimension, min, max), rng)
}

/// Draws one point from the unit hypercube.
pub fn random_unit_point<P: PointAdapter>(
    dimension: usize,
    rng: &mut impl Rng,
) -> Result<P, CloudError> {
    random_point(&Bounds::unit(dimension), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::VectorPoint;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn unit_point_in_unit_cube() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let p: VectorPoint = random_unit_point(4, &mut rng).unwrap();
            assert_eq!(p.dimension(), 4);
            assert!(p.coordinates().iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn point_in_hypercube() {
        let mut rng = StdRng::seed_from_u64(2);
        let p: VectorPoint = random_point_in(3, -5.0, -4.0, &mut rng).unwrap();
        assert!(p.coordinates().iter().all(|c| (-5.0..=-4.0).contains(c)));
    }

    #[test]
    fn degenerate_axis_returns_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = Bounds::new(vec![2.0, 0.0], vec![2.0, 1.0]).unwrap();
        let p: VectorPoint = random_point(&bounds, &mut rng).unwrap();
        assert_eq!(p.coordinates()[0], 2.0);
    }

    #[test]
    fn undefined_bound_rejected() {
        let mut rng = StdRng::seed_from_u64(4);
        let r: Result<VectorPoint, _> = random_point_in(2, f64::NAN, 1.0, &mut rng);
        assert!(matches!(r, Err(CloudError::UndefinedBound { axis: 0 })));
    }

    #[test]
    fn overflowing_width_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = Bounds::new(vec![-f64::MAX], vec![f64::MAX]).unwrap();
        let r: Result<VectorPoint, _> = random_point(&bounds, &mut rng);
        assert!(matches!(r, Err(CloudError::UndefinedBound { axis: 0 })));

        let bounds = Bounds::new(vec![0.0, 0.0], vec![1.0, f64::MAX]).unwrap();
        let r: Result<VectorPoint, _> = random_point(&bounds, &mut rng);
        assert!(r.is_err());
    }

    #[test]
    fn inverted_bound_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let r: Result<VectorPoint, _> = random_point_in(1, 1.0, 0.0, &mut rng);
        assert!(matches!(r, Err(CloudError::InvertedBounds { axis: 0, .. })));
    }

    #[test]
    fn zero_dimension_is_empty_point() {
        let mut rng = StdRng::seed_from_u64(6);
        let p: VectorPoint = random_unit_point(0, &mut rng).unwrap();
        assert_eq!(p.dimension(), 0);
    }
}

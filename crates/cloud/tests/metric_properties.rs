//! Property checks of DistanceMetric over random points.

use approx::assert_abs_diff_eq;
use nebula_cloud::{
    Bounds, DistanceMetric, PointAdapter, PointContainer, PointHandle, VectorPoint, random_point,
    random_unit_point,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn rng() -> StdRng {
    StdRng::seed_from_u64(1234)
}

fn random_points(n: usize, dim: usize, rng: &mut StdRng) -> Vec<VectorPoint> {
    (0..n)
        .map(|_| random_unit_point(dim, &mut *rng).unwrap())
        .collect()
}

#[test]
fn distance_is_symmetric() {
    let mut rng = rng();
    let pts = random_points(40, 3, &mut rng);
    let scaled = DistanceMetric::new().with_length_scales(vec![0.5, 2.0, 1.0]);
    for metric in [DistanceMetric::new(), scaled] {
        for a in &pts {
            for b in &pts {
                assert_abs_diff_eq!(
                    metric.distance(a, b).unwrap(),
                    metric.distance(b, a).unwrap(),
                    epsilon = 1e-12
                );
            }
        }
    }
}

#[test]
fn self_distance_is_zero() {
    let mut rng = rng();
    let metric = DistanceMetric::new().with_length_scales(vec![0.1, 3.0]);
    for p in random_points(50, 2, &mut rng) {
        assert_eq!(metric.distance(&p, &p).unwrap(), 0.0);
    }
}

#[test]
fn unit_length_scales_are_neutral() {
    let mut rng = rng();
    let plain = DistanceMetric::new();
    let unit = DistanceMetric::new().with_length_scales(vec![1.0; 5]);
    let pts = random_points(30, 5, &mut rng);
    for pair in pts.windows(2) {
        assert_abs_diff_eq!(
            plain.distance(&pair[0], &pair[1]).unwrap(),
            unit.distance(&pair[0], &pair[1]).unwrap(),
            epsilon = 1e-12
        );
    }
}

#[test]
fn uniform_scaling_divides_distance() {
    let mut rng = rng();
    let plain = DistanceMetric::new();
    let pts = random_points(20, 4, &mut rng);
    for _ in 0..10 {
        let s: f64 = rng.random_range(0.1..10.0);
        let scaled = DistanceMetric::new().with_length_scales(vec![s; 4]);
        for pair in pts.windows(2) {
            assert_abs_diff_eq!(
                scaled.distance(&pair[0], &pair[1]).unwrap() * s,
                plain.distance(&pair[0], &pair[1]).unwrap(),
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn relative_coordinates_stay_in_unit_box() {
    let mut rng = rng();
    let bounds = Bounds::new(vec![-3.0, 10.0, 0.0], vec![5.0, 12.0, 0.001]).unwrap();
    let metric: DistanceMetric<VectorPoint> = DistanceMetric::new().with_bounds(bounds.clone());
    for _ in 0..200 {
        let p: VectorPoint = random_point(&bounds, &mut rng).unwrap();
        let rel = metric.relative_coordinates(&p.coordinates()).unwrap();
        assert!(rel.iter().all(|r| (0.0..=1.0).contains(r)), "{rel:?}");
    }
}

#[test]
fn relative_coordinates_degenerate_axis() {
    let bounds = Bounds::new(vec![2.0, 0.0], vec![2.0, 4.0]).unwrap();
    let metric: DistanceMetric<VectorPoint> = DistanceMetric::new().with_bounds(bounds);
    let rel = metric.relative_coordinates(&[2.0, 1.0]).unwrap();
    assert_eq!(rel, vec![0.0, 0.25]);
    let rel = metric.relative_coordinates(&[2.5, 4.0]).unwrap();
    assert_eq!(rel, vec![0.5, 1.0]);
}

#[test]
fn cached_sort_matches_compare_sort() {
    let mut rng = rng();
    let mut arena: Vec<PointContainer<VectorPoint>> = random_points(50, 3, &mut rng)
        .into_iter()
        .enumerate()
        .map(|(i, p)| PointContainer::new(p, i))
        .collect();
    let mut metric = DistanceMetric::new().with_length_scales(vec![1.0, 0.5, 2.0]);

    for origin in [0, 17, 49] {
        metric.set_reference_point(&arena[origin]);
        let mut by_compare: Vec<PointHandle> = (0..arena.len()).map(PointHandle::new).collect();
        let mut by_cache = by_compare.clone();
        metric.sort(&arena, &mut by_compare).unwrap();
        metric
            .sort_using_cached_distance(&mut arena, &mut by_cache)
            .unwrap();

        assert_eq!(by_cache[0], PointHandle::new(origin));
        let d = |h: &PointHandle| metric.distance_to_reference(&arena[h.index()]).unwrap();
        let a: Vec<f64> = by_compare.iter().map(d).collect();
        let b: Vec<f64> = by_cache.iter().map(d).collect();
        assert_eq!(a, b);
        assert!(b.windows(2).all(|w| w[0] <= w[1]));
        for h in &by_cache {
            assert_eq!(
                arena[h.index()].cached_distance(metric.stamp()),
                Some(d(h))
            );
        }
    }
}

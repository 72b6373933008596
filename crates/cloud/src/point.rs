//! Point adapters: the capability interface a value needs to live in a cloud.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Capability interface for the substantive content of a point.
///
/// Implementors expose their coordinates (and optionally an output vector)
/// and can be rebuilt from a coordinate vector, which is how random clouds are
/// generated. Dispatch is static: [`PointCloud`](crate::PointCloud) and
/// [`DistanceMetric`](crate::DistanceMetric) are generic over the adapter.
///
/// # Example
///
/// ```
/// use std::borrow::Cow;
/// use nebula_cloud::PointAdapter;
///
/// #[derive(Clone, Debug)]
/// struct Station {
///     lon: f64,
///     lat: f64,
/// }
///
/// impl PointAdapter for Station {
///     fn coordinates(&self) -> Cow<'_, [f64]> {
///         Cow::Owned(vec![self.lon, self.lat])
///     }
///
///     fn from_coordinates(coords: Vec<f64>) -> Self {
///         Station { lon: coords[0], lat: coords[1] }
///     }
/// }
///
/// let s = Station { lon: 8.5, lat: 47.4 };
/// assert_eq!(s.dimension(), 2);
/// ```
pub trait PointAdapter: Clone {
    /// Coordinate vector of the point. Callers only ever get a read-only view.
    fn coordinates(&self) -> Cow<'_, [f64]>;

    /// Output-space vector, for point types that carry one.
    fn output_vector(&self) -> Option<Cow<'_, [f64]>> {
        None
    }

    /// Builds a point from a coordinate vector.
    fn from_coordinates(coords: Vec<f64>) -> Self;

    /// Number of coordinate components.
    fn dimension(&self) -> usize {
        self.coordinates().len()
    }
}

/// A plain coordinate vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPoint {
    coords: Vec<f64>,
}

impl VectorPoint {
    /// Creates a point from its coordinates.
    pub fn new(coords: impl Into<Vec<f64>>) -> Self {
        Self {
            coords: coords.into(),
        }
    }
}

impl From<Vec<f64>> for VectorPoint {
    fn from(coords: Vec<f64>) -> Self {
        Self::new(coords)
    }
}

impl<const N: usize> From<[f64; N]> for VectorPoint {
    fn from(coords: [f64; N]) -> Self {
        Self::new(coords.to_vec())
    }
}

impl PointAdapter for VectorPoint {
    fn coordinates(&self) -> Cow<'_, [f64]> {
        Cow::Borrowed(&self.coords)
    }

    fn from_coordinates(coords: Vec<f64>) -> Self {
        Self::new(coords)
    }
}

/// A sample of an approximated function: input coordinates plus the output
/// vector observed there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    input: Vec<f64>,
    output: Vec<f64>,
}

impl SamplePoint {
    /// Creates a sample from its input coordinates and output vector.
    pub fn new(input: impl Into<Vec<f64>>, output: impl Into<Vec<f64>>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

impl PointAdapter for SamplePoint {
    fn coordinates(&self) -> Cow<'_, [f64]> {
        Cow::Borrowed(&self.input)
    }

    fn output_vector(&self) -> Option<Cow<'_, [f64]>> {
        Some(Cow::Borrowed(&self.output))
    }

    /// Builds a sample with an empty output vector.
    fn from_coordinates(coords: Vec<f64>) -> Self {
        Self::new(coords, Vec::new())
    }
}

//! Dense point storage shared by trees, rules and estimators.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An ordered, fixed-dimensional collection of points.
///
/// Points are stored point-major in one flat buffer: the `dim` coordinates of
/// point `i` occupy `data[i * dim..(i + 1) * dim]`. This is the layout of the
/// columns of a column-major matrix, so a `D × N` matrix maps onto a
/// `PointSet` without copying.
///
/// # Examples
///
/// ```
/// use dualtree_kde::PointSet;
///
/// let points = PointSet::from_points(vec![vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
/// assert_eq!(points.len(), 2);
/// assert_eq!(points.dim(), 2);
/// assert_eq!(points.point(1), &[2.0, 3.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointSet {
    dim: usize,
    data: Vec<f64>,
}

impl PointSet {
    /// Creates a point set from flat point-major data.
    ///
    /// # Errors
    ///
    /// Returns `Error::ZeroDimensions` if `dim` is zero.
    /// Returns `Error::MalformedPointData` if `data.len()` is not a multiple of `dim`.
    pub fn new(dim: usize, data: Vec<f64>) -> Result<Self> {
        if dim == 0 {
            return Err(Error::ZeroDimensions);
        }
        if data.len() % dim != 0 {
            return Err(Error::MalformedPointData {
                len: data.len(),
                dim,
            });
        }
        Ok(Self { dim, data })
    }

    /// Creates a point set from one `Vec` per point.
    ///
    /// # Errors
    ///
    /// Returns `Error::ZeroDimensions` if `points` is empty or its points have no coordinates.
    /// Returns `Error::RaggedPoints` if the points disagree on dimensionality.
    pub fn from_points(points: Vec<Vec<f64>>) -> Result<Self> {
        let dim = points.first().map_or(0, Vec::len);
        if dim == 0 {
            return Err(Error::ZeroDimensions);
        }

        let mut data = Vec::with_capacity(points.len() * dim);
        for (i, point) in points.into_iter().enumerate() {
            if point.len() != dim {
                return Err(Error::RaggedPoints {
                    expected: dim,
                    got: point.len(),
                    point_index: i,
                });
            }
            data.extend(point);
        }

        Ok(Self { dim, data })
    }

    /// Creates a point set of the given dimensionality holding no points.
    #[must_use]
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// Returns `true` if the set holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the dimensionality of every point.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the coordinates of point `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn point(&self, index: usize) -> &[f64] {
        &self.data[index * self.dim..(index + 1) * self.dim]
    }

    /// Iterates over the points in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.dim.max(1))
    }

    /// Returns the flat point-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns a copy whose point `i` is point `order[i]` of `self`.
    ///
    /// # Panics
    ///
    /// Panics if `order` refers to a point that does not exist.
    #[must_use]
    pub fn permuted(&self, order: &[usize]) -> Self {
        let mut data = Vec::with_capacity(order.len() * self.dim);
        for &old in order {
            data.extend_from_slice(self.point(old));
        }
        Self {
            dim: self.dim,
            data,
        }
    }
}

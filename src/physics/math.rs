//! Scalar and vector primitives for physics calculations.

use crate::error::{Error, Result};
use std::ops::{Index, IndexMut};

/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// Euclidean vector with a dimension fixed at construction.
///
/// Positions, velocities, and accelerations are all `Vector`s of the
/// simulation's dimension. Binary operations require equal dimensions on
/// both operands and fail with [`Error::DimensionMismatch`] otherwise.
/// Every operation returns a new value; components are only written through
/// [`IndexMut`] during construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    components: Vec<Scalar>,
}

impl Vector {
    pub fn new(components: Vec<Scalar>) -> Self {
        Self { components }
    }

    /// Zero vector of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        Self {
            components: vec![0.0; dim],
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn components(&self) -> &[Scalar] {
        &self.components
    }

    fn check_dim(&self, other: &Vector) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(Error::DimensionMismatch {
                left: self.dim(),
                right: other.dim(),
            });
        }
        Ok(())
    }

    /// Elementwise sum.
    pub fn add(&self, other: &Vector) -> Result<Vector> {
        self.check_dim(other)?;
        Ok(Vector::new(
            self.components
                .iter()
                .zip(&other.components)
                .map(|(a, b)| a + b)
                .collect(),
        ))
    }

    /// Elementwise difference.
    pub fn sub(&self, other: &Vector) -> Result<Vector> {
        self.check_dim(other)?;
        Ok(Vector::new(
            self.components
                .iter()
                .zip(&other.components)
                .map(|(a, b)| a - b)
                .collect(),
        ))
    }

    /// Elementwise scaling by a scalar. Never fails.
    pub fn scale(&self, factor: Scalar) -> Vector {
        self.map(|x| x * factor)
    }

    /// Apply a unary function to every component. Never fails.
    pub fn map(&self, f: impl Fn(Scalar) -> Scalar) -> Vector {
        Vector::new(self.components.iter().copied().map(f).collect())
    }

    /// Euclidean norm.
    pub fn norm(&self) -> Scalar {
        libm::sqrt(self.norm_squared())
    }

    /// Sum of squared components.
    pub fn norm_squared(&self) -> Scalar {
        self.components.iter().map(|x| x * x).sum()
    }
}

impl From<Vec<Scalar>> for Vector {
    fn from(components: Vec<Scalar>) -> Self {
        Self::new(components)
    }
}

impl<const N: usize> From<[Scalar; N]> for Vector {
    fn from(components: [Scalar; N]) -> Self {
        Self::new(components.to_vec())
    }
}

impl Index<usize> for Vector {
    type Output = Scalar;

    fn index(&self, index: usize) -> &Scalar {
        &self.components[index]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, index: usize) -> &mut Scalar {
        &mut self.components[index]
    }
}

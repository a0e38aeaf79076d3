/*!
 * Resource Vector
 * Fixed-length vector of whole resource quantities
 */

use crate::core::types::{Quantity, ResourceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// One quantity per resource type
///
/// The length is the resource-type count `R` of the state the vector
/// belongs to. Element-wise comparisons between vectors of different
/// lengths are never meaningful; callers check shape first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVector(Vec<Quantity>);

impl ResourceVector {
    pub fn new(values: Vec<Quantity>) -> Self {
        Self(values)
    }

    /// All-zero vector of the given length
    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    /// Convert signed boundary input, rejecting the first negative entry
    ///
    /// Returns the offending value on failure.
    pub fn try_from_signed(values: &[i64]) -> Result<Self, i64> {
        values
            .iter()
            .map(|&v| Quantity::try_from(v).map_err(|_| v))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Quantity] {
        &self.0
    }

    #[inline]
    pub fn get(&self, resource: ResourceId) -> Option<Quantity> {
        self.0.get(resource).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.0.iter().copied()
    }

    /// True when every element is `<=` the matching element of `other`
    #[inline]
    pub fn fits_within(&self, other: &ResourceVector) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a <= b)
    }

    /// First resource where `self` exceeds `other`, as `(resource, self, other)`
    pub fn first_exceeding(&self, other: &ResourceVector) -> Option<(ResourceId, Quantity, Quantity)> {
        self.0
            .iter()
            .zip(other.0.iter())
            .enumerate()
            .find(|(_, (a, b))| a > b)
            .map(|(j, (&a, &b))| (j, a, b))
    }

    pub fn checked_add(&self, other: &ResourceVector) -> Option<ResourceVector> {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a.checked_add(*b))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    pub fn checked_sub(&self, other: &ResourceVector) -> Option<ResourceVector> {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a.checked_sub(*b))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Add `other` in place
    ///
    /// Callers only accumulate quantities bounded by a validated total, so
    /// saturation is never reached in practice.
    #[inline]
    pub fn accumulate(&mut self, other: &ResourceVector) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a = a.saturating_add(*b);
        }
    }

    pub fn into_inner(self) -> Vec<Quantity> {
        self.0
    }
}

impl From<Vec<Quantity>> for ResourceVector {
    fn from(values: Vec<Quantity>) -> Self {
        Self(values)
    }
}

impl Index<ResourceId> for ResourceVector {
    type Output = Quantity;

    fn index(&self, resource: ResourceId) -> &Quantity {
        &self.0[resource]
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

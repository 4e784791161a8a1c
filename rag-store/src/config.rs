//! Collection vector-space configuration.

use serde::Serialize;

/// Distance function of a collection, fixed at creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum DistanceKind {
    #[default]
    Cosine,
}

/// Describes the vector space of a collection.
///
/// Serializes to Qdrant's `{"size": N, "distance": "Cosine"}` shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

impl VectorSpace {
    pub fn cosine(size: usize) -> Self {
        Self {
            size,
            distance: DistanceKind::Cosine,
        }
    }
}

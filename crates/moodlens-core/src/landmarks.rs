//! Normalized face-mesh landmarks as delivered by the external detector.
//!
//! Points follow the MediaPipe face-mesh topology: 468 points, or 478 when
//! iris refinement is enabled. Coordinates are normalized to the frame, with
//! `y` growing downward.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MediaPipe face-mesh indices read by the pipeline.
pub mod mesh {
    pub const LEFT_EYE_TOP: usize = 159;
    pub const LEFT_EYE_BOTTOM: usize = 145;
    pub const LEFT_EYE_OUTER: usize = 33;
    pub const LEFT_EYE_INNER: usize = 133;

    pub const RIGHT_EYE_TOP: usize = 386;
    pub const RIGHT_EYE_BOTTOM: usize = 374;
    pub const RIGHT_EYE_INNER: usize = 362;
    pub const RIGHT_EYE_OUTER: usize = 263;

    pub const MOUTH_LEFT: usize = 61;
    pub const MOUTH_RIGHT: usize = 291;
    pub const UPPER_LIP: usize = 13;

    pub const NOSE_TIP: usize = 1;
    pub const FOREHEAD: usize = 10;
    pub const CHIN: usize = 152;

    /// Points in a face mesh without iris refinement.
    pub const FACE_MESH_POINTS: usize = 468;

    /// Smallest landmark count that covers every index above.
    pub const REQUIRED_POINTS: usize = RIGHT_EYE_TOP + 1;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("landmark set has {got} points, need at least {need}")]
    TooFewPoints { got: usize, need: usize },
    #[error("landmark {index} is not finite")]
    NonFinite { index: usize },
}

/// A single normalized 2-D landmark.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Landmarks for one detected face in one frame.
///
/// Validated on construction, so indexing with the [`mesh`] constants
/// never goes out of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Result<Self, LandmarkError> {
        if points.len() < mesh::REQUIRED_POINTS {
            return Err(LandmarkError::TooFewPoints {
                got: points.len(),
                need: mesh::REQUIRED_POINTS,
            });
        }
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(Self { points })
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    /// Distance between two landmarks.
    pub fn span(&self, a: usize, b: usize) -> f64 {
        self.points[a].distance(&self.points[b])
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<Vec<(f64, f64)>> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(raw: Vec<(f64, f64)>) -> Result<Self, Self::Error> {
        Self::new(raw.into_iter().map(Point::from).collect())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A neutral-looking face: every unused point at the frame centre, eyes
    /// 0.3 open relative to their width, mouth corners level with the lip.
    pub fn face() -> Vec<Point> {
        let mut pts = vec![Point::new(0.5, 0.5); mesh::FACE_MESH_POINTS];
        // left eye: width 0.1, height 0.03
        pts[mesh::LEFT_EYE_OUTER] = Point::new(0.30, 0.40);
        pts[mesh::LEFT_EYE_INNER] = Point::new(0.40, 0.40);
        pts[mesh::LEFT_EYE_TOP] = Point::new(0.35, 0.385);
        pts[mesh::LEFT_EYE_BOTTOM] = Point::new(0.35, 0.415);
        // right eye mirrored
        pts[mesh::RIGHT_EYE_INNER] = Point::new(0.60, 0.40);
        pts[mesh::RIGHT_EYE_OUTER] = Point::new(0.70, 0.40);
        pts[mesh::RIGHT_EYE_TOP] = Point::new(0.65, 0.385);
        pts[mesh::RIGHT_EYE_BOTTOM] = Point::new(0.65, 0.415);
        // mouth
        pts[mesh::MOUTH_LEFT] = Point::new(0.42, 0.70);
        pts[mesh::MOUTH_RIGHT] = Point::new(0.58, 0.70);
        pts[mesh::UPPER_LIP] = Point::new(0.50, 0.70);
        // vertical spans
        pts[mesh::NOSE_TIP] = Point::new(0.50, 0.55);
        pts[mesh::FOREHEAD] = Point::new(0.50, 0.15);
        pts[mesh::CHIN] = Point::new(0.50, 0.90);
        pts
    }

    pub fn face_set() -> LandmarkSet {
        LandmarkSet::new(face()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_set() {
        let err = LandmarkSet::new(vec![Point::default(); 10]).unwrap_err();
        assert_eq!(
            err,
            LandmarkError::TooFewPoints {
                got: 10,
                need: mesh::REQUIRED_POINTS
            }
        );
    }

    #[test]
    fn test_rejects_nan() {
        let mut pts = fixtures::face();
        pts[7].y = f64::NAN;
        assert_eq!(
            LandmarkSet::new(pts).unwrap_err(),
            LandmarkError::NonFinite { index: 7 }
        );
    }

    #[test]
    fn test_accepts_full_mesh() {
        let set = fixtures::face_set();
        assert_eq!(set.len(), mesh::FACE_MESH_POINTS);
        assert!((set.span(mesh::LEFT_EYE_OUTER, mesh::LEFT_EYE_INNER) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.3, 0.4);
        assert!((a.distance(&b) - 0.5).abs() < 1e-12);
    }
}

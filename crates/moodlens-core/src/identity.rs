//! Single-user face identity check against a session baseline.
//!
//! The embedding is five landmark-pair distances, not a learned descriptor.
//! It is only good enough to notice that a different face (or a very
//! different pose) entered the frame.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::landmarks::{mesh, LandmarkSet};

/// Default cosine similarity above which a face counts as recognized.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.995;

pub const EMBEDDING_DIM: usize = 5;

/// Geometric face embedding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceEmbedding(pub [f64; EMBEDDING_DIM]);

impl FaceEmbedding {
    /// Eye-corner span, nose-to-chin span, mouth width, forehead-to-chin
    /// span and inner eye-corner span.
    pub fn from_landmarks(lm: &LandmarkSet) -> Self {
        Self([
            lm.span(mesh::LEFT_EYE_OUTER, mesh::RIGHT_EYE_OUTER),
            lm.span(mesh::NOSE_TIP, mesh::CHIN),
            lm.span(mesh::MOUTH_LEFT, mesh::MOUTH_RIGHT),
            lm.span(mesh::FOREHEAD, mesh::CHIN),
            lm.span(mesh::LEFT_EYE_INNER, mesh::RIGHT_EYE_INNER),
        ])
    }

    pub fn values(&self) -> &[f64; EMBEDDING_DIM] {
        &self.0
    }
}

/// Cosine similarity; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    dot / denom
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdentityStatus {
    /// This frame became the session baseline.
    Registered,
    Recognized { similarity: f64 },
    Unknown { similarity: f64 },
}

impl IdentityStatus {
    pub fn is_recognized(&self) -> bool {
        matches!(self, IdentityStatus::Registered | IdentityStatus::Recognized { .. })
    }
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityStatus::Registered => f.write_str("User #1 (registered)"),
            IdentityStatus::Recognized { .. } => f.write_str("User #1 recognized"),
            IdentityStatus::Unknown { .. } => f.write_str("Unknown face pattern"),
        }
    }
}

/// Holds the baseline embedding for one session.
///
/// The first observed face is stored unconditionally and never replaced
/// for the lifetime of the check.
#[derive(Debug, Clone)]
pub struct IdentityCheck {
    baseline: Option<FaceEmbedding>,
    threshold: f64,
}

impl IdentityCheck {
    pub fn new(threshold: f64) -> Self {
        Self {
            baseline: None,
            threshold,
        }
    }

    pub fn observe(&mut self, lm: &LandmarkSet) -> IdentityStatus {
        self.compare(FaceEmbedding::from_landmarks(lm))
    }

    pub fn compare(&mut self, embedding: FaceEmbedding) -> IdentityStatus {
        let Some(baseline) = self.baseline else {
            tracing::info!(embedding = ?embedding.0, "identity baseline registered");
            self.baseline = Some(embedding);
            return IdentityStatus::Registered;
        };

        let similarity = cosine_similarity(&baseline.0, &embedding.0);
        if similarity > self.threshold {
            IdentityStatus::Recognized { similarity }
        } else {
            tracing::debug!(similarity, threshold = self.threshold, "face does not match baseline");
            IdentityStatus::Unknown { similarity }
        }
    }

    pub fn baseline(&self) -> Option<&FaceEmbedding> {
        self.baseline.as_ref()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for IdentityCheck {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

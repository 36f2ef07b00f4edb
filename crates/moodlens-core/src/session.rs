//! Per-user scanning session: the state the frame callback mutates.
//!
//! A [`Session`] owns the rolling sample window, the identity baseline, the
//! latest mood and the scanning flag. Frames are fed one at a time through
//! [`Session::process`]; there is no shared state outside the session.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::classifier::MoodClassifier;
use crate::features::{FeatureConfig, FeatureExtractor, FeatureVector};
use crate::identity::{IdentityCheck, IdentityStatus, DEFAULT_SIMILARITY_THRESHOLD};
use crate::landmarks::LandmarkSet;
use crate::mood::Mood;

/// One detector callback.
#[derive(Debug, Clone)]
pub enum FrameEvent {
    Face { landmarks: LandmarkSet, at: Duration },
    NoFace { at: Duration },
}

impl FrameEvent {
    pub fn at(&self) -> Duration {
        match self {
            FrameEvent::Face { at, .. } | FrameEvent::NoFace { at } => *at,
        }
    }
}

/// Everything the display shows for an analysed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Readout {
    pub features: FeatureVector,
    pub mood: Mood,
    pub identity: IdentityStatus,
}

impl Readout {
    pub fn description(&self) -> &'static str {
        self.mood.description()
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "amplitude {:.4} | wavelength {:.2} | curvature {:.4} | mood {} | {}",
            self.features.eye_amplitude,
            self.features.eye_wavelength,
            self.features.mouth_curvature,
            self.mood,
            self.identity,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameReport {
    /// No face in the frame; the classifier was not run.
    NotFound,
    Analyzed(Readout),
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameReport::NotFound => f.write_str("Face not found | mood Unknown"),
            FrameReport::Analyzed(r) => r.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub features: FeatureConfig,
    pub identity_threshold: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            identity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

pub struct Session {
    id: Uuid,
    extractor: FeatureExtractor,
    identity: IdentityCheck,
    classifier: Box<dyn MoodClassifier>,
    current_mood: Mood,
    scanning: bool,
}

impl Session {
    pub fn new(config: SessionConfig, classifier: Box<dyn MoodClassifier>) -> Self {
        Self {
            id: Uuid::new_v4(),
            extractor: FeatureExtractor::new(config.features),
            identity: IdentityCheck::new(config.identity_threshold),
            classifier,
            current_mood: Mood::Neutral,
            scanning: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Begin scanning with an empty sample window. The identity baseline
    /// survives restarts.
    pub fn start(&mut self) {
        self.extractor.reset();
        self.scanning = true;
        tracing::info!(session = %self.id, classifier = self.classifier.name(), "scanning started");
    }

    pub fn stop(&mut self) {
        self.scanning = false;
        tracing::info!(session = %self.id, "scanning stopped");
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Most recent classified mood; `Neutral` before any face was seen.
    pub fn current_mood(&self) -> Mood {
        self.current_mood
    }

    pub fn identity(&self) -> &IdentityCheck {
        &self.identity
    }

    pub fn sample_count(&self) -> usize {
        self.extractor.window().len()
    }

    /// Run one frame through the pipeline. Returns `None` when the session is
    /// not scanning, which drops callbacks that arrive after a stop.
    pub fn process(&mut self, event: FrameEvent) -> Option<FrameReport> {
        if !self.scanning {
            tracing::debug!(session = %self.id, "discarding frame, not scanning");
            return None;
        }

        let (landmarks, at) = match event {
            FrameEvent::NoFace { .. } => return Some(FrameReport::NotFound),
            FrameEvent::Face { landmarks, at } => (landmarks, at),
        };

        let features = self.extractor.extract(&landmarks, at);
        let identity = self.identity.observe(&landmarks);
        let mood = self.classifier.classify(&features);
        self.current_mood = mood;

        tracing::debug!(
            session = %self.id,
            at_ms = at.as_millis() as u64,
            eye_amplitude = features.eye_amplitude,
            eye_wavelength = features.eye_wavelength,
            mouth_curvature = features.mouth_curvature,
            mood = %mood,
            "frame analysed"
        );

        Some(FrameReport::Analyzed(Readout {
            features,
            mood,
            identity,
        }))
    }
}

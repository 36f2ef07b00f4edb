//! Moodlens core: turns face-mesh landmarks into mood readouts.
//!
//! Pipeline per frame:
//!
//! ```text
//! LandmarkSet ─▶ FeatureExtractor ─▶ MoodClassifier ─▶ Mood
//!      │          (rolling window)
//!      └────────▶ IdentityCheck ─▶ IdentityStatus
//! ```
//!
//! [`Session`] bundles the stateful pieces and is the unit callers drive.

pub mod classifier;
pub mod features;
pub mod identity;
pub mod landmarks;
pub mod mood;
pub mod session;

pub use classifier::{build_classifier, ClassifierKind, MoodClassifier, NetworkConfig, RuleSet};
pub use features::{FeatureConfig, FeatureExtractor, FeatureVector, SampleWindow};
pub use identity::{FaceEmbedding, IdentityCheck, IdentityStatus};
pub use landmarks::{LandmarkError, LandmarkSet, Point};
pub use mood::Mood;
pub use session::{FrameEvent, FrameReport, Readout, Session, SessionConfig};

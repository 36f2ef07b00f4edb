//! Mood classification from a [`FeatureVector`].
//!
//! Two interchangeable strategies sit behind [`MoodClassifier`]:
//! an ordered threshold cascade ([`RuleSet`]) and a small feed-forward
//! network trained at startup on jittered prototypes ([`PrototypeNetwork`]).
//! Both are total: every input maps to a member of [`Mood::ALL`].

pub mod network;
pub mod rules;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::mood::Mood;

pub use network::{NetworkConfig, PrototypeNetwork, TrainingReport};
pub use rules::{Bound, Rule, RuleSet};

/// Maps one frame's signals to a mood.
pub trait MoodClassifier: Send {
    fn classify(&self, features: &FeatureVector) -> Mood;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Rules,
    Network,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Rules => f.write_str("rules"),
            ClassifierKind::Network => f.write_str("network"),
        }
    }
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" | "rule" => Ok(ClassifierKind::Rules),
            "network" | "ai" | "nn" => Ok(ClassifierKind::Network),
            other => Err(format!("unknown classifier: {other}")),
        }
    }
}

/// Build the configured classifier. Network training happens here.
pub fn build_classifier(
    kind: ClassifierKind,
    rules: RuleSet,
    network: &NetworkConfig,
) -> Box<dyn MoodClassifier> {
    match kind {
        ClassifierKind::Rules => {
            tracing::info!(rules = rules.len(), "using rule-based classifier");
            Box::new(rules)
        }
        ClassifierKind::Network => {
            let (net, report) = PrototypeNetwork::train(network);
            tracing::info!(
                iterations = report.iterations,
                error = report.final_error,
                seeded = network.seed.is_some(),
                "prototype network trained"
            );
            Box::new(net)
        }
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// Affine-clamp each raw signal into `[0, 1]`.
///
/// | signal          | mapping               |
/// |-----------------|-----------------------|
/// | eye amplitude   | `(v - 0.12) / 0.32`   |
/// | eye wavelength  | `v / 3.0`             |
/// | mouth curvature | `(v + 0.04) / 0.08`   |
///
/// NaN maps to 0.
pub fn normalize(features: &FeatureVector) -> [f64; 3] {
    [
        clamp_unit((features.eye_amplitude - 0.12) / 0.32),
        clamp_unit(features.eye_wavelength / 3.0),
        clamp_unit((features.mouth_curvature + 0.04) / 0.08),
    ]
}

//! Ordered threshold cascade over raw (unnormalized) signals.
//!
//! The thresholds are empirical. They are plain data so a deployment can
//! replace the whole cascade from configuration.

use serde::{Deserialize, Serialize};

use super::MoodClassifier;
use crate::features::FeatureVector;
use crate::mood::Mood;

/// Half-open interval `[min, max)`; a missing end is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bound {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bound {
    pub const ANY: Bound = Bound {
        min: None,
        max: None,
    };

    pub const fn below(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// NaN only satisfies an unbounded interval.
    pub fn contains(&self, v: f64) -> bool {
        self.min.map_or(true, |m| v >= m) && self.max.map_or(true, |m| v < m)
    }
}

/// One predicate of the cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub mood: Mood,
    #[serde(default)]
    pub eye_amplitude: Bound,
    #[serde(default)]
    pub eye_wavelength: Bound,
    #[serde(default)]
    pub mouth_curvature: Bound,
}

impl Rule {
    pub fn matches(&self, f: &FeatureVector) -> bool {
        self.eye_amplitude.contains(f.eye_amplitude)
            && self.eye_wavelength.contains(f.eye_wavelength)
            && self.mouth_curvature.contains(f.mouth_curvature)
    }
}

/// First matching rule wins; no match yields [`Mood::Neutral`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

fn rule(mood: Mood, eye_amplitude: Bound, eye_wavelength: Bound, mouth_curvature: Bound) -> Rule {
    Rule {
        mood,
        eye_amplitude,
        eye_wavelength,
        mouth_curvature,
    }
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule that decided `f`, if any.
    pub fn first_match(&self, f: &FeatureVector) -> Option<&Rule> {
        self.rules.iter().find(|r| r.matches(f))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        use Bound as B;
        Self::new(vec![
            rule(Mood::Sleepy, B::below(0.18), B::below(0.6), B::ANY),
            rule(Mood::Surprised, B::at_least(0.38), B::at_least(1.2), B::at_least(-0.01)),
            rule(Mood::Excited, B::at_least(0.33), B::at_least(1.5), B::below(-0.015)),
            rule(Mood::Happy, B::ANY, B::ANY, B::below(-0.015)),
            rule(Mood::Angry, B::ANY, B::at_least(2.4), B::at_least(0.015)),
            rule(Mood::Anxious, B::ANY, B::at_least(2.2), B::ANY),
            rule(Mood::Fearful, B::at_least(0.34), B::at_least(1.8), B::ANY),
            rule(Mood::Stressed, B::ANY, B::at_least(1.8), B::at_least(0.008)),
            rule(Mood::Depressed, B::below(0.2), B::ANY, B::at_least(0.018)),
            rule(Mood::Sad, B::below(0.28), B::ANY, B::at_least(0.012)),
            rule(Mood::Disgusted, B::ANY, B::at_least(1.5), B::at_least(0.018)),
            rule(Mood::Frustrated, B::ANY, B::at_least(1.6), B::at_least(0.0)),
            rule(Mood::Guilty, B::below(0.3), B::at_least(1.5), B::at_least(0.004)),
            rule(Mood::Lonely, B::below(0.22), B::below(0.7), B::at_least(0.008)),
            rule(Mood::Bored, B::below(0.22), B::below(0.9), B::ANY),
            rule(Mood::Calm, B::below(0.3), B::below(0.6), B::ANY),
            rule(Mood::Confused, B::ANY, B::at_least(1.4), B::between(-0.005, 0.008)),
        ])
    }
}

impl MoodClassifier for RuleSet {
    fn classify(&self, features: &FeatureVector) -> Mood {
        self.first_match(features)
            .map(|r| r.mood)
            .unwrap_or(Mood::Neutral)
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(eye_amplitude: f64, eye_wavelength: f64, mouth_curvature: f64) -> FeatureVector {
        FeatureVector {
            eye_amplitude,
            eye_wavelength,
            mouth_curvature,
        }
    }

    #[test]
    fn test_low_slow_eyes_are_sleepy() {
        let rules = RuleSet::default();
        assert_eq!(rules.classify(&fv(0.15, 0.3, 0.0)), Mood::Sleepy);
    }

    #[test]
    fn test_balanced_face_is_neutral() {
        let rules = RuleSet::default();
        assert_eq!(rules.classify(&fv(0.3, 1.0, 0.0)), Mood::Neutral);
        assert!(rules.first_match(&fv(0.3, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_cascade_order_wins() {
        let rules = RuleSet::default();
        // qualifies for both excited and happy; excited is listed first
        assert_eq!(rules.classify(&fv(0.36, 1.8, -0.02)), Mood::Excited);
        assert_eq!(rules.classify(&fv(0.28, 1.0, -0.02)), Mood::Happy);
    }

    #[test]
    fn test_representative_moods() {
        let rules = RuleSet::default();
        assert_eq!(rules.classify(&fv(0.42, 1.4, 0.0)), Mood::Surprised);
        assert_eq!(rules.classify(&fv(0.3, 2.6, 0.02)), Mood::Angry);
        assert_eq!(rules.classify(&fv(0.3, 2.3, 0.0)), Mood::Anxious);
        assert_eq!(rules.classify(&fv(0.19, 1.0, 0.02)), Mood::Depressed);
        assert_eq!(rules.classify(&fv(0.25, 1.0, 0.013)), Mood::Sad);
        assert_eq!(rules.classify(&fv(0.2, 0.8, 0.0)), Mood::Bored);
        assert_eq!(rules.classify(&fv(0.26, 0.4, 0.0)), Mood::Calm);
    }

    #[test]
    fn test_classification_is_total() {
        let rules = RuleSet::default();
        let samples = [-1.0, 0.0, 0.05, 0.2, 0.35, 1.0, 3.0, f64::NAN, f64::INFINITY];
        for a in samples {
            for w in samples {
                for m in samples {
                    let mood = rules.classify(&fv(a, w, m));
                    assert!(Mood::ALL.contains(&mood));
                }
            }
        }
    }

    #[test]
    fn test_empty_cascade_falls_through_to_neutral() {
        let rules = RuleSet::new(Vec::new());
        assert!(rules.is_empty());
        assert_eq!(rules.classify(&fv(0.1, 0.1, 0.1)), Mood::Neutral);
    }

    #[test]
    fn test_bound_is_half_open() {
        let b = Bound::between(0.1, 0.2);
        assert!(b.contains(0.1));
        assert!(!b.contains(0.2));
        assert!(!b.contains(f64::NAN));
        assert!(Bound::ANY.contains(f64::NAN));
    }
}

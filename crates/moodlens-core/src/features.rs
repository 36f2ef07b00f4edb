//! Heuristic facial signals derived from one landmark set per frame.
//!
//! Three scalars come out of every frame:
//!
//! - **eye amplitude** — mean eye-aspect ratio of both eyes, a proxy for how
//!   open the eyes are;
//! - **eye wavelength** — despite the name, an estimated oscillation
//!   frequency (Hz) of the eye amplitude over a rolling window;
//! - **mouth curvature** — vertical offset of the upper lip from the mean
//!   height of the mouth corners. Image `y` grows downward; the classifiers
//!   read negative values as smile-like.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::landmarks::{mesh, LandmarkSet};

/// Default number of samples kept in the rolling window.
pub const DEFAULT_WINDOW_CAPACITY: usize = 90;
/// Default minimum number of samples before a frequency is reported.
pub const DEFAULT_MIN_SAMPLES: usize = 22;

/// The three signals derived from a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub eye_amplitude: f64,
    pub eye_wavelength: f64,
    pub mouth_curvature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Maximum samples retained; older samples are evicted first.
    pub window_capacity: usize,
    /// Below this many samples the frequency estimate is 0.
    pub min_samples: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

/// Eye-aspect ratio for one eye: vertical lid gap over horizontal corner span.
/// A degenerate eye with zero width reports 0.
fn eye_aspect_ratio(lm: &LandmarkSet, top: usize, bottom: usize, a: usize, b: usize) -> f64 {
    let horizontal = lm.span(a, b);
    if horizontal <= 0.0 {
        return 0.0;
    }
    lm.span(top, bottom) / horizontal
}

/// Mean of the left and right eye-aspect ratios.
pub fn eye_amplitude(lm: &LandmarkSet) -> f64 {
    let left = eye_aspect_ratio(
        lm,
        mesh::LEFT_EYE_TOP,
        mesh::LEFT_EYE_BOTTOM,
        mesh::LEFT_EYE_OUTER,
        mesh::LEFT_EYE_INNER,
    );
    let right = eye_aspect_ratio(
        lm,
        mesh::RIGHT_EYE_TOP,
        mesh::RIGHT_EYE_BOTTOM,
        mesh::RIGHT_EYE_INNER,
        mesh::RIGHT_EYE_OUTER,
    );
    (left + right) / 2.0
}

/// Upper-lip height minus the mean mouth-corner height.
pub fn mouth_curvature(lm: &LandmarkSet) -> f64 {
    let corner_mean_y = (lm.point(mesh::MOUTH_LEFT).y + lm.point(mesh::MOUTH_RIGHT).y) / 2.0;
    lm.point(mesh::UPPER_LIP).y - corner_mean_y
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub at: Duration,
}

/// Bounded FIFO of timestamped samples.
///
/// Invariants: `len() <= capacity` and timestamps never decrease. A sample
/// stamped earlier than the newest one is clamped to the newest timestamp.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64, at: Duration) {
        let at = match self.samples.back() {
            Some(last) if at < last.at => {
                tracing::warn!(
                    got_ms = at.as_secs_f64() * 1000.0,
                    last_ms = last.at.as_secs_f64() * 1000.0,
                    "out-of-order sample timestamp, clamping"
                );
                last.at
            }
            _ => at,
        };
        self.samples.push_back(Sample { value, at });
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.value).sum::<f64>() / self.samples.len() as f64
    }

    /// Number of sign changes of `value - mean` across consecutive samples.
    ///
    /// A pair counts when it goes from strictly negative to non-negative, or
    /// from strictly positive to non-positive, so landing exactly on the mean
    /// still registers.
    pub fn mean_crossings(&self) -> usize {
        let mean = self.mean();
        let deviations: Vec<f64> = self.samples.iter().map(|s| s.value - mean).collect();
        deviations
            .windows(2)
            .filter(|pair| {
                let (a, b) = (pair[0], pair[1]);
                (a < 0.0 && b >= 0.0) || (a > 0.0 && b <= 0.0)
            })
            .count()
    }

    /// Time between the oldest and newest sample.
    pub fn duration(&self) -> Duration {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => last.at.saturating_sub(first.at),
            _ => Duration::ZERO,
        }
    }

    /// Oscillation frequency in Hz: `crossings / (2 * duration)`.
    ///
    /// Two mean crossings make one full cycle. Returns 0 when the window spans
    /// no time or has fewer than two crossings. No minimum-length gate is
    /// applied here; see [`EyeOscillationTracker`].
    pub fn estimate_frequency(&self) -> f64 {
        let secs = self.duration().as_secs_f64();
        let crossings = self.mean_crossings();
        if secs <= 0.0 || crossings < 2 {
            return 0.0;
        }
        crossings as f64 / (2.0 * secs)
    }
}

/// Tracks eye amplitude over time and estimates its oscillation frequency.
#[derive(Debug, Clone)]
pub struct EyeOscillationTracker {
    window: SampleWindow,
    min_samples: usize,
}

impl EyeOscillationTracker {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            window: SampleWindow::new(config.window_capacity),
            min_samples: config.min_samples,
        }
    }

    /// Record one amplitude sample and return the current frequency estimate,
    /// or 0 while the window holds fewer than `min_samples` samples.
    pub fn observe(&mut self, amplitude: f64, at: Duration) -> f64 {
        self.window.push(amplitude, at);
        if self.window.len() < self.min_samples {
            return 0.0;
        }
        self.window.estimate_frequency()
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }
}

/// Turns landmark sets into [`FeatureVector`]s. Owns the rolling window.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    tracker: EyeOscillationTracker,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            tracker: EyeOscillationTracker::new(config),
        }
    }

    pub fn extract(&mut self, lm: &LandmarkSet, at: Duration) -> FeatureVector {
        let eye_amplitude = eye_amplitude(lm);
        let eye_wavelength = self.tracker.observe(eye_amplitude, at);
        FeatureVector {
            eye_amplitude,
            eye_wavelength,
            mouth_curvature: mouth_curvature(lm),
        }
    }

    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    pub fn window(&self) -> &SampleWindow {
        self.tracker.window()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

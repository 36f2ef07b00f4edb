//! Tiny feed-forward mood network trained at startup on synthetic data.
//!
//! Each mood has one hand-authored prototype in normalized feature space.
//! Training expands every prototype into jittered copies, fits a ReLU
//! network with a sigmoid output unit per mood, and keeps the weights in
//! memory for the rest of the process. Nothing is learned from real faces.
//!
//! With `seed` unset the jitter and initial weights come from OS entropy,
//! so two runs learn slightly different weights.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{normalize, MoodClassifier};
use crate::features::FeatureVector;
use crate::mood::Mood;

const INPUTS: usize = 3;

/// Jitter half-widths per normalized input.
const JITTER: [f64; INPUTS] = [0.06, 0.08, 0.07];

/// Prototype (eye amplitude, eye wavelength, mouth curvature), normalized.
pub fn prototype(mood: Mood) -> [f64; INPUTS] {
    match mood {
        Mood::Happy => [0.62, 0.45, 0.12],
        Mood::Sad => [0.32, 0.25, 0.65],
        Mood::Angry => [0.75, 0.88, 0.72],
        Mood::Surprised => [0.92, 0.72, 0.38],
        Mood::Neutral => [0.5, 0.4, 0.5],
        Mood::Sleepy => [0.18, 0.12, 0.52],
        Mood::Excited => [0.88, 0.8, 0.25],
        Mood::Stressed => [0.68, 0.76, 0.62],
        Mood::Calm => [0.4, 0.2, 0.45],
        Mood::Confused => [0.55, 0.55, 0.57],
        Mood::Fearful => [0.8, 0.84, 0.58],
        Mood::Disgusted => [0.48, 0.63, 0.75],
        Mood::Bored => [0.24, 0.18, 0.49],
        Mood::Depressed => [0.18, 0.16, 0.78],
        Mood::Anxious => [0.7, 0.93, 0.6],
        Mood::Frustrated => [0.64, 0.69, 0.68],
        Mood::Lonely => [0.22, 0.22, 0.62],
        Mood::Guilty => [0.34, 0.58, 0.64],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub hidden_layers: Vec<usize>,
    /// Jittered training samples generated per prototype.
    pub samples_per_mood: usize,
    /// Upper bound on training epochs.
    pub iterations: usize,
    pub learning_rate: f64,
    pub momentum: f64,
    /// Training stops once the epoch mean squared error drops below this.
    pub error_threshold: f64,
    /// Fixed seed for reproducible weights.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![12, 10],
            samples_per_mood: 20,
            iterations: 1400,
            learning_rate: 0.03,
            momentum: 0.1,
            error_threshold: 0.012,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    /// Epochs actually run.
    pub iterations: usize,
    /// Mean squared error of the first epoch.
    pub initial_error: f64,
    /// Mean squared error of the last epoch.
    pub final_error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Activation {
    Relu,
    Sigmoid,
}

impl Activation {
    fn apply(&self, z: f64) -> f64 {
        match self {
            Activation::Relu => z.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-z).exp()),
        }
    }

    /// Derivative expressed in terms of the activation output.
    fn derivative(&self, out: f64) -> f64 {
        match self {
            Activation::Relu => {
                if out > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Sigmoid => out * (1.0 - out),
        }
    }
}

#[derive(Debug, Clone)]
struct Layer {
    /// Shape `(outputs, inputs)`.
    weights: Array2<f64>,
    biases: Array1<f64>,
    activation: Activation,
}

impl Layer {
    fn random(inputs: usize, outputs: usize, activation: Activation, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (inputs + outputs) as f64).sqrt();
        Self {
            weights: Array2::from_shape_fn((outputs, inputs), |_| rng.gen_range(-limit..limit)),
            biases: Array1::from_elem(outputs, 0.01),
            activation,
        }
    }

    fn forward(&self, input: &Array1<f64>) -> Array1<f64> {
        let act = self.activation;
        (self.weights.dot(input) + &self.biases).mapv(|z| act.apply(z))
    }
}

/// Feed-forward classifier over normalized features.
#[derive(Debug, Clone)]
pub struct PrototypeNetwork {
    layers: Vec<Layer>,
}

struct Sample {
    input: Array1<f64>,
    target: Array1<f64>,
}

fn training_set(config: &NetworkConfig, rng: &mut StdRng) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(Mood::ALL.len() * config.samples_per_mood);
    for mood in Mood::ALL {
        let p = prototype(mood);
        let mut target = Array1::zeros(Mood::ALL.len());
        target[mood.index()] = 1.0;
        for _ in 0..config.samples_per_mood {
            let input = Array1::from_iter((0..INPUTS).map(|i| {
                let j = JITTER[i];
                (p[i] + rng.gen_range(-j..=j)).clamp(0.0, 1.0)
            }));
            samples.push(Sample {
                input,
                target: target.clone(),
            });
        }
    }
    samples
}

impl PrototypeNetwork {
    /// Train a fresh network on jittered prototypes.
    pub fn train(config: &NetworkConfig) -> (Self, TrainingReport) {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut sizes = vec![INPUTS];
        sizes.extend(config.hidden_layers.iter().copied().filter(|&n| n > 0));
        sizes.push(Mood::ALL.len());

        let last = sizes.len() - 2;
        let layers = sizes
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let act = if i == last {
                    Activation::Sigmoid
                } else {
                    Activation::Relu
                };
                Layer::random(pair[0], pair[1], act, &mut rng)
            })
            .collect();

        let mut net = Self { layers };
        let mut samples = training_set(config, &mut rng);
        let report = net.fit(&mut samples, config, &mut rng);
        (net, report)
    }

    fn fit(
        &mut self,
        samples: &mut [Sample],
        config: &NetworkConfig,
        rng: &mut StdRng,
    ) -> TrainingReport {
        let mut velocity: Vec<(Array2<f64>, Array1<f64>)> = self
            .layers
            .iter()
            .map(|l| (Array2::zeros(l.weights.raw_dim()), Array1::zeros(l.biases.len())))
            .collect();

        let mut report = TrainingReport {
            iterations: 0,
            initial_error: f64::NAN,
            final_error: f64::NAN,
        };
        if samples.is_empty() {
            return report;
        }

        for epoch in 0..config.iterations {
            samples.shuffle(rng);
            let mut total = 0.0;
            for sample in samples.iter() {
                total += self.step(sample, config, &mut velocity);
            }
            let error = total / samples.len() as f64;

            report.iterations = epoch + 1;
            report.final_error = error;
            if epoch == 0 {
                report.initial_error = error;
            }
            if error < config.error_threshold {
                tracing::debug!(epoch, error, "training converged");
                break;
            }
        }
        report
    }

    /// One SGD update with momentum. Returns the sample's mean squared error.
    fn step(
        &mut self,
        sample: &Sample,
        config: &NetworkConfig,
        velocity: &mut [(Array2<f64>, Array1<f64>)],
    ) -> f64 {
        // activations[0] is the input, activations[i + 1] the output of layer i
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(sample.input.clone());
        for layer in &self.layers {
            let next = layer.forward(&activations[activations.len() - 1]);
            activations.push(next);
        }

        let output = &activations[activations.len() - 1];
        let error = &sample.target - output;
        let mse = error.mapv(|e| e * e).mean().unwrap_or(0.0);

        let out_act = self.layers[self.layers.len() - 1].activation;
        let mut delta = &error * &output.mapv(|o| out_act.derivative(o));

        for i in (0..self.layers.len()).rev() {
            let input = &activations[i];
            let prev_delta = if i > 0 {
                let back = self.layers[i].weights.t().dot(&delta);
                let act = self.layers[i - 1].activation;
                Some(&back * &input.mapv(|o| act.derivative(o)))
            } else {
                None
            };

            let grad = delta
                .view()
                .insert_axis(Axis(1))
                .dot(&input.view().insert_axis(Axis(0)));
            let (vw, vb) = &mut velocity[i];
            *vw = grad * config.learning_rate + &*vw * config.momentum;
            *vb = &delta * config.learning_rate + &*vb * config.momentum;

            let layer = &mut self.layers[i];
            layer.weights += &*vw;
            layer.biases += &*vb;

            if let Some(d) = prev_delta {
                delta = d;
            }
        }

        mse
    }

    /// Output activations, one per mood in [`Mood::ALL`] order.
    pub fn run(&self, normalized: &[f64; INPUTS]) -> Array1<f64> {
        let mut x = Array1::from_iter(normalized.iter().copied());
        for layer in &self.layers {
            x = layer.forward(&x);
        }
        x
    }

    /// Index of the strongest output, `None` if every output is NaN.
    fn arg_max(output: &Array1<f64>) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &v) in output.iter().enumerate() {
            if v.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, b)| v > b) {
                best = Some((i, v));
            }
        }
        best.map(|(i, _)| i)
    }
}

impl MoodClassifier for PrototypeNetwork {
    fn classify(&self, features: &FeatureVector) -> Mood {
        let output = self.run(&normalize(features));
        Self::arg_max(&output)
            .map(Mood::from_index)
            .unwrap_or(Mood::Neutral)
    }

    fn name(&self) -> &'static str {
        "network"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(seed: u64) -> NetworkConfig {
        NetworkConfig {
            iterations: 60,
            samples_per_mood: 8,
            seed: Some(seed),
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn test_output_has_one_unit_per_mood() {
        let (net, _) = PrototypeNetwork::train(&quick_config(1));
        let out = net.run(&[0.5, 0.5, 0.5]);
        assert_eq!(out.len(), Mood::ALL.len());
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let (a, ra) = PrototypeNetwork::train(&quick_config(42));
        let (b, rb) = PrototypeNetwork::train(&quick_config(42));
        assert_eq!(ra, rb);
        for input in [[0.1, 0.2, 0.3], [0.9, 0.8, 0.1], [0.5, 0.5, 0.5]] {
            assert_eq!(a.run(&input), b.run(&input));
        }
    }

    #[test]
    fn test_training_reduces_error() {
        let config = NetworkConfig {
            iterations: 150,
            samples_per_mood: 10,
            seed: Some(7),
            ..NetworkConfig::default()
        };
        let (_, report) = PrototypeNetwork::train(&config);
        assert!(report.iterations > 1);
        assert!(report.final_error < report.initial_error);
    }

    #[test]
    fn test_stops_at_error_threshold() {
        let config = NetworkConfig {
            error_threshold: 1.0,
            ..quick_config(3)
        };
        let (_, report) = PrototypeNetwork::train(&config);
        assert_eq!(report.iterations, 1);
    }

    #[test]
    fn test_classification_is_total() {
        let (net, _) = PrototypeNetwork::train(&quick_config(9));
        let values = [-5.0, 0.0, 0.1, 0.3, 1.0, 4.0, f64::NAN, f64::NEG_INFINITY];
        for a in values {
            for w in values {
                for m in values {
                    let mood = net.classify(&FeatureVector {
                        eye_amplitude: a,
                        eye_wavelength: w,
                        mouth_curvature: m,
                    });
                    assert!(Mood::ALL.contains(&mood));
                }
            }
        }
    }

    #[test]
    fn test_arg_max_skips_nan() {
        let out = Array1::from(vec![f64::NAN, 0.2, 0.7, 0.1]);
        assert_eq!(PrototypeNetwork::arg_max(&out), Some(2));
        let all_nan = Array1::from(vec![f64::NAN; 3]);
        assert_eq!(PrototypeNetwork::arg_max(&all_nan), None);
    }

    #[test]
    fn test_trained_network_recognizes_prototypes() {
        let config = NetworkConfig {
            seed: Some(1),
            ..NetworkConfig::default()
        };
        let (net, report) = PrototypeNetwork::train(&config);
        assert!(report.final_error < report.initial_error);

        let hits = Mood::ALL
            .iter()
            .filter(|&&mood| {
                let [a, w, m] = prototype(mood);
                let raw = FeatureVector {
                    eye_amplitude: a * 0.32 + 0.12,
                    eye_wavelength: w * 3.0,
                    mouth_curvature: m * 0.08 - 0.04,
                };
                net.classify(&raw) == mood
            })
            .count();
        assert!(hits >= 15, "only {hits}/18 prototypes classified correctly");
    }

    #[test]
    fn test_prototypes_are_normalized() {
        for mood in Mood::ALL {
            assert!(prototype(mood).iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}

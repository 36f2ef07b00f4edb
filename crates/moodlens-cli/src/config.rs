use std::path::{Path, PathBuf};

use moodlens_core::classifier::Rule;
use moodlens_core::identity::DEFAULT_SIMILARITY_THRESHOLD;
use moodlens_core::{ClassifierKind, FeatureConfig, NetworkConfig, RuleSet, SessionConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime configuration.
///
/// Built from defaults, then an optional TOML file, then `MOODLENS_*`
/// environment variables, each layer overriding the previous one.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which mood classifier to run.
    pub classifier: ClassifierKind,
    /// Rolling window size and minimum history for the frequency estimate.
    pub features: FeatureConfig,
    /// Cosine similarity above which a face matches the session baseline.
    pub identity_threshold: f64,
    /// Language used when picking media.
    pub language: String,
    /// Training parameters for the prototype network.
    pub network: NetworkConfig,
    /// Threshold cascade for the rule-based classifier.
    pub rules: RuleSet,
    /// Optional TOML media catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::default(),
            features: FeatureConfig::default(),
            identity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            language: "english".to_string(),
            network: NetworkConfig::default(),
            rules: RuleSet::default(),
            catalog_path: None,
        }
    }
}

/// Config file layout. Every key is optional.
///
/// ```toml
/// classifier = "network"
/// language = "hindi"
/// catalog = "/etc/moodlens/catalog.toml"
///
/// [features]
/// window_capacity = 90
/// min_samples = 22
///
/// [network]
/// seed = 7
/// iterations = 800
///
/// [[rules]]
/// mood = "sleepy"
/// eye_amplitude = { max = 0.2 }
/// eye_wavelength = { max = 0.6 }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    classifier: Option<ClassifierKind>,
    features: Option<FeatureConfig>,
    identity_threshold: Option<f64>,
    language: Option<String>,
    network: Option<NetworkConfig>,
    rules: Option<Vec<Rule>>,
    catalog: Option<PathBuf>,
}

impl Config {
    /// Load configuration: defaults, then `path` (or `MOODLENS_CONFIG`), then
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let env_path = std::env::var("MOODLENS_CONFIG").ok().map(PathBuf::from);
        if let Some(path) = path.map(Path::to_path_buf).or(env_path) {
            let contents =
                std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
            config.apply_toml(&contents)?;
            tracing::info!(path = %path.display(), "config file loaded");
        }

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that would silently disable part of the pipeline.
    fn validate(&self) -> Result<(), ConfigError> {
        let t = self.identity_threshold;
        if !(-1.0..=1.0).contains(&t) {
            return Err(ConfigError::Invalid {
                key: "identity_threshold",
                reason: format!("{t} is not a cosine similarity in [-1, 1]"),
            });
        }
        let f = self.features;
        if f.window_capacity < f.min_samples {
            return Err(ConfigError::Invalid {
                key: "window_capacity",
                reason: format!(
                    "{} is smaller than min_samples {}, eye wavelength would always be 0",
                    f.window_capacity, f.min_samples
                ),
            });
        }
        Ok(())
    }

    fn apply_toml(&mut self, contents: &str) -> Result<(), ConfigError> {
        let file: FileConfig = toml::from_str(contents)?;
        if let Some(v) = file.classifier {
            self.classifier = v;
        }
        if let Some(v) = file.features {
            self.features = v;
        }
        if let Some(v) = file.identity_threshold {
            self.identity_threshold = v;
        }
        if let Some(v) = file.language {
            self.language = v;
        }
        if let Some(v) = file.network {
            self.network = v;
        }
        if let Some(v) = file.rules {
            self.rules = RuleSet::new(v);
        }
        if let Some(v) = file.catalog {
            self.catalog_path = Some(v);
        }
        Ok(())
    }

    /// Apply `MOODLENS_*` environment overrides. Unparseable values are ignored.
    fn apply_env(&mut self) {
        if let Some(kind) = env_parse::<ClassifierKind>("MOODLENS_CLASSIFIER") {
            self.classifier = kind;
        }
        self.features.window_capacity =
            env_usize("MOODLENS_WINDOW_CAPACITY", self.features.window_capacity);
        self.features.min_samples = env_usize("MOODLENS_MIN_SAMPLES", self.features.min_samples);
        self.identity_threshold = env_f64("MOODLENS_IDENTITY_THRESHOLD", self.identity_threshold);
        if let Ok(language) = std::env::var("MOODLENS_LANGUAGE") {
            self.language = language;
        }
        if let Some(seed) = env_parse::<u64>("MOODLENS_SEED") {
            self.network.seed = Some(seed);
        }
        self.network.iterations = env_usize("MOODLENS_TRAINING_ITERATIONS", self.network.iterations);
        if let Ok(path) = std::env::var("MOODLENS_CATALOG") {
            self.catalog_path = Some(PathBuf::from(path));
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            features: self.features,
            identity_threshold: self.identity_threshold,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_f64(key: &str, default: f64) -> f64 {
    env_parse(key).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_parse(key).unwrap_or(default)
}

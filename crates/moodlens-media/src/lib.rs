//! Static (language, mood) → media lookup.
//!
//! The catalog is built once, either from the built-in video table or from
//! a TOML file, and never changes afterwards. Lookups are total: an unknown
//! language falls back to the default language and a missing mood falls
//! back to that language's neutral entry.

mod builtin;
mod language;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use moodlens_core::Mood;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use language::{Language, UnknownLanguage};

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("entry {language}/{mood} must set exactly one of `video` or `audio`")]
    InvalidLocator { language: Language, mood: Mood },

    #[error("catalog has no neutral entry for default language {0}")]
    MissingFallback(Language),
}

/// Where a clip can be played from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaLocator {
    /// Streaming-video embed id.
    Video { id: String },
    /// Direct audio file URL.
    Audio { url: String },
}

impl MediaLocator {
    /// Playable URL for this locator.
    pub fn url(&self) -> String {
        match self {
            MediaLocator::Video { id } => format!("{EMBED_BASE}{id}"),
            MediaLocator::Audio { url } => url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub title: String,
    pub locator: MediaLocator,
}

/// Result of a lookup, with the language and mood actually used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaSelection<'a> {
    pub language: Language,
    pub mood: Mood,
    pub descriptor: &'a MediaDescriptor,
}

impl MediaSelection<'_> {
    pub fn url(&self) -> String {
        self.descriptor.locator.url()
    }
}

impl fmt::Display for MediaSelection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Now showing: {} ({}) for mood: {}",
            self.descriptor.title, self.language, self.mood
        )
    }
}

#[derive(Debug, Clone)]
pub struct MediaCatalog {
    entries: HashMap<Language, HashMap<Mood, MediaDescriptor>>,
    default_language: Language,
    /// Neutral entry of the default language; the end of every fallback chain.
    fallback: MediaDescriptor,
}

/// On-disk catalog layout.
///
/// ```toml
/// default_language = "english"
///
/// [[entries]]
/// language = "english"
/// mood = "neutral"
/// title = "Lo-fi Focus"
/// video = "jfKfPfyJRdk"
///
/// [[entries]]
/// language = "tamil"
/// mood = "calm"
/// title = "Evening Veena"
/// audio = "https://example.org/veena.mp3"
/// ```
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    default_language: Language,
    #[serde(default)]
    entries: Vec<EntryFile>,
}

#[derive(Debug, Deserialize)]
struct EntryFile {
    language: Language,
    mood: Mood,
    title: String,
    video: Option<String>,
    audio: Option<String>,
}

impl MediaCatalog {
    /// Built-in video catalog covering every language and mood.
    pub fn builtin() -> Self {
        Self {
            entries: builtin::entries(),
            default_language: builtin::DEFAULT_LANGUAGE,
            fallback: builtin::fallback(),
        }
    }

    pub fn from_entries(
        entries: HashMap<Language, HashMap<Mood, MediaDescriptor>>,
        default_language: Language,
    ) -> Result<Self, CatalogError> {
        let fallback = entries
            .get(&default_language)
            .and_then(|by_mood| by_mood.get(&Mood::Neutral))
            .cloned()
            .ok_or(CatalogError::MissingFallback(default_language))?;
        Ok(Self {
            entries,
            default_language,
            fallback,
        })
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(s)?;
        let mut entries: HashMap<Language, HashMap<Mood, MediaDescriptor>> = HashMap::new();
        for e in file.entries {
            let locator = match (e.video, e.audio) {
                (Some(id), None) => MediaLocator::Video { id },
                (None, Some(url)) => MediaLocator::Audio { url },
                _ => {
                    return Err(CatalogError::InvalidLocator {
                        language: e.language,
                        mood: e.mood,
                    })
                }
            };
            entries.entry(e.language).or_default().insert(
                e.mood,
                MediaDescriptor {
                    title: e.title,
                    locator,
                },
            );
        }
        Self::from_entries(entries, file.default_language)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_toml_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            languages = catalog.entries.len(),
            "media catalog loaded"
        );
        Ok(catalog)
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.entries.keys().copied()
    }

    /// Entries for one language, if the catalog has it.
    pub fn entries_for(&self, language: Language) -> Option<&HashMap<Mood, MediaDescriptor>> {
        self.entries.get(&language)
    }

    /// Look up a clip. Never fails. The chain is: requested language and
    /// mood, that language's neutral entry, the default language's entry for
    /// the mood, the default language's neutral entry.
    pub fn select(&self, language: Language, mood: Mood) -> MediaSelection<'_> {
        if !self.entries.contains_key(&language) {
            tracing::debug!(%language, default = %self.default_language, "language not in catalog");
        }

        let candidates = [
            (language, mood),
            (language, Mood::Neutral),
            (self.default_language, mood),
        ];
        let found = candidates.into_iter().find_map(|(language, mood)| {
            self.entries
                .get(&language)
                .and_then(|by_mood| by_mood.get(&mood))
                .map(|descriptor| MediaSelection {
                    language,
                    mood,
                    descriptor,
                })
        });

        found.unwrap_or(MediaSelection {
            language: self.default_language,
            mood: Mood::Neutral,
            descriptor: &self.fallback,
        })
    }

    /// [`MediaCatalog::select`] over free-form labels, as they come from a
    /// user-facing picker.
    pub fn select_by_name(&self, language: &str, mood: &str) -> MediaSelection<'_> {
        let language: Language = language.parse().unwrap_or_else(|_| {
            tracing::debug!(language, "unknown language, using default");
            self.default_language
        });
        self.select(language, Mood::from_label(mood))
    }
}

impl Default for MediaCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_cell() {
        let catalog = MediaCatalog::builtin();
        for language in Language::ALL {
            let by_mood = catalog.entries_for(language).unwrap();
            for mood in Mood::ALL {
                let d = &by_mood[&mood];
                assert!(!d.title.is_empty());
                assert!(!d.locator.url().is_empty());
            }
        }
    }

    #[test]
    fn test_exact_lookup() {
        let catalog = MediaCatalog::builtin();
        let sel = catalog.select(Language::Hindi, Mood::Happy);
        assert_eq!(sel.language, Language::Hindi);
        assert_eq!(sel.mood, Mood::Happy);
        assert_eq!(sel.descriptor.title, "Hindi happy recommendation");
        assert_eq!(sel.url(), "https://www.youtube.com/embed/JGwWNGJdvx8");
    }

    #[test]
    fn test_unknown_language_uses_default() {
        let catalog = MediaCatalog::builtin();
        let sel = catalog.select_by_name("klingon", "happy");
        let expected = catalog.select(Language::English, Mood::Happy);
        assert_eq!(sel, expected);
        assert_eq!(sel.descriptor.title, "English happy recommendation");
    }

    #[test]
    fn test_unknown_mood_uses_neutral() {
        let catalog = MediaCatalog::builtin();
        let sel = catalog.select_by_name("tamil", "euphoric");
        assert_eq!(sel.language, Language::Tamil);
        assert_eq!(sel.mood, Mood::Neutral);
    }

    #[test]
    fn test_lookup_is_total() {
        let catalog = MediaCatalog::from_toml_str(
            r#"
            [[entries]]
            language = "english"
            mood = "neutral"
            title = "Lo-fi Focus"
            video = "jfKfPfyJRdk"
            "#,
        )
        .unwrap();
        for language in ["english", "tamil", "klingon", ""] {
            for mood in Mood::ALL {
                let sel = catalog.select_by_name(language, mood.as_str());
                assert_eq!(sel.descriptor.title, "Lo-fi Focus");
                assert!(!sel.url().is_empty());
            }
        }
    }

    #[test]
    fn test_missing_mood_in_language_uses_its_neutral() {
        let catalog = MediaCatalog::from_toml_str(
            r#"
            [[entries]]
            language = "english"
            mood = "neutral"
            title = "English Neutral"
            video = "aaa"

            [[entries]]
            language = "punjabi"
            mood = "neutral"
            title = "Punjabi Neutral"
            audio = "https://example.org/neutral.mp3"
            "#,
        )
        .unwrap();
        let sel = catalog.select(Language::Punjabi, Mood::Angry);
        assert_eq!(sel.language, Language::Punjabi);
        assert_eq!(sel.mood, Mood::Neutral);
        assert_eq!(sel.url(), "https://example.org/neutral.mp3");
    }

    #[test]
    fn test_language_without_neutral_uses_default_mood() {
        let catalog = MediaCatalog::from_toml_str(
            r#"
            [[entries]]
            language = "english"
            mood = "neutral"
            title = "English Neutral"
            video = "aaa"

            [[entries]]
            language = "english"
            mood = "angry"
            title = "English Angry"
            video = "bbb"

            [[entries]]
            language = "hindi"
            mood = "happy"
            title = "Hindi Happy"
            video = "ccc"
            "#,
        )
        .unwrap();
        let sel = catalog.select(Language::Hindi, Mood::Angry);
        assert_eq!(sel.language, Language::English);
        assert_eq!(sel.mood, Mood::Angry);
        assert_eq!(sel.descriptor.title, "English Angry");

        let sel = catalog.select(Language::Hindi, Mood::Sad);
        assert_eq!(sel.descriptor.title, "English Neutral");
        assert_eq!(sel.mood, Mood::Neutral);
    }

    #[test]
    fn test_toml_requires_default_neutral() {
        let err = MediaCatalog::from_toml_str(
            r#"
            default_language = "hindi"

            [[entries]]
            language = "english"
            mood = "neutral"
            title = "x"
            video = "y"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::MissingFallback(Language::Hindi)));
    }

    #[test]
    fn test_toml_rejects_ambiguous_locator() {
        let err = MediaCatalog::from_toml_str(
            r#"
            [[entries]]
            language = "english"
            mood = "neutral"
            title = "x"
            video = "y"
            audio = "z"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidLocator { .. }));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let path = std::env::temp_dir().join(format!(
            "moodlens-catalog-missing-{}.toml",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let err = MediaCatalog::load(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }

    #[test]
    fn test_now_showing_line() {
        let catalog = MediaCatalog::builtin();
        let sel = catalog.select(Language::Telugu, Mood::Calm);
        assert_eq!(
            sel.to_string(),
            "Now showing: Telugu calm recommendation (telugu) for mood: calm"
        );
    }
}

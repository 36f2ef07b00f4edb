//! Built-in video catalog.
//!
//! One embed id per (language, mood). Columns follow `Mood::ALL`:
//! happy, sad, angry, surprised, neutral, sleepy, excited, stressed, calm,
//! confused, fearful, disgusted, bored, depressed, anxious, frustrated,
//! lonely, guilty.

use std::collections::HashMap;

use moodlens_core::Mood;

use crate::{Language, MediaDescriptor, MediaLocator};

type Row = [&'static str; 18];

pub(crate) const DEFAULT_LANGUAGE: Language = Language::English;

const VIDEO_IDS: [(Language, Row); 8] = [
    (
        Language::English,
        [
            "ZbZSe6N_BXs", "ho9rZjlsyYY", "2OEL4P1Rz04", "fLexgOxsZu0", "jfKfPfyJRdk",
            "09R8_2nJtjg", "kJQP7kiw5Fk", "1ZYbU82GVz4", "UfcAVejslrU", "5qap5aO4i9A",
            "sTANio_2E0Q", "DWcJFNfaw9c", "3AtDnEC4zak", "RgKAFK5djSk", "hLQl3WQQoQ0",
            "CevxZvSJLk8", "YykjpeuMNEk", "nfs8NYg7yQM",
        ],
    ),
    (
        Language::Hindi,
        [
            "JGwWNGJdvx8", "ho9rZjlsyYY", "2OEL4P1Rz04", "fLexgOxsZu0", "jfKfPfyJRdk",
            "09R8_2nJtjg", "3AtDnEC4zak", "1ZYbU82GVz4", "UfcAVejslrU", "5qap5aO4i9A",
            "sTANio_2E0Q", "DWcJFNfaw9c", "ZbZSe6N_BXs", "YykjpeuMNEk", "hLQl3WQQoQ0",
            "nfs8NYg7yQM", "RgKAFK5djSk", "CevxZvSJLk8",
        ],
    ),
    (
        Language::Kannada,
        [
            "6vKucgAeF_Q", "YykjpeuMNEk", "nfs8NYg7yQM", "fLexgOxsZu0", "jfKfPfyJRdk",
            "09R8_2nJtjg", "3AtDnEC4zak", "1ZYbU82GVz4", "UfcAVejslrU", "5qap5aO4i9A",
            "sTANio_2E0Q", "DWcJFNfaw9c", "ZbZSe6N_BXs", "ho9rZjlsyYY", "hLQl3WQQoQ0",
            "CevxZvSJLk8", "RgKAFK5djSk", "2OEL4P1Rz04",
        ],
    ),
    (
        Language::Bhojpuri,
        [
            "wWlYU0P2b4E", "YykjpeuMNEk", "2OEL4P1Rz04", "fLexgOxsZu0", "jfKfPfyJRdk",
            "09R8_2nJtjg", "kJQP7kiw5Fk", "1ZYbU82GVz4", "UfcAVejslrU", "5qap5aO4i9A",
            "sTANio_2E0Q", "DWcJFNfaw9c", "3AtDnEC4zak", "RgKAFK5djSk", "hLQl3WQQoQ0",
            "nfs8NYg7yQM", "ho9rZjlsyYY", "CevxZvSJLk8",
        ],
    ),
    (
        Language::Malayalam,
        [
            "hQ9Q1K0Gx8I", "ho9rZjlsyYY", "2OEL4P1Rz04", "fLexgOxsZu0", "jfKfPfyJRdk",
            "09R8_2nJtjg", "kJQP7kiw5Fk", "1ZYbU82GVz4", "UfcAVejslrU", "5qap5aO4i9A",
            "sTANio_2E0Q", "DWcJFNfaw9c", "3AtDnEC4zak", "YykjpeuMNEk", "hLQl3WQQoQ0",
            "nfs8NYg7yQM", "RgKAFK5djSk", "CevxZvSJLk8",
        ],
    ),
    (
        Language::Telugu,
        [
            "kJQP7kiw5Fk", "ho9rZjlsyYY", "2OEL4P1Rz04", "fLexgOxsZu0", "jfKfPfyJRdk",
            "09R8_2nJtjg", "3AtDnEC4zak", "1ZYbU82GVz4", "UfcAVejslrU", "5qap5aO4i9A",
            "sTANio_2E0Q", "DWcJFNfaw9c", "ZbZSe6N_BXs", "YykjpeuMNEk", "hLQl3WQQoQ0",
            "nfs8NYg7yQM", "RgKAFK5djSk", "CevxZvSJLk8",
        ],
    ),
    (
        Language::Punjabi,
        [
            "i3m8U3jjo0o", "ho9rZjlsyYY", "2OEL4P1Rz04", "fLexgOxsZu0", "jfKfPfyJRdk",
            "09R8_2nJtjg", "kJQP7kiw5Fk", "1ZYbU82GVz4", "UfcAVejslrU", "5qap5aO4i9A",
            "sTANio_2E0Q", "DWcJFNfaw9c", "3AtDnEC4zak", "YykjpeuMNEk", "hLQl3WQQoQ0",
            "nfs8NYg7yQM", "RgKAFK5djSk", "CevxZvSJLk8",
        ],
    ),
    (
        Language::Tamil,
        [
            "YQHsXMglC9A", "ho9rZjlsyYY", "2OEL4P1Rz04", "fLexgOxsZu0", "jfKfPfyJRdk",
            "09R8_2nJtjg", "kJQP7kiw5Fk", "1ZYbU82GVz4", "UfcAVejslrU", "5qap5aO4i9A",
            "sTANio_2E0Q", "DWcJFNfaw9c", "3AtDnEC4zak", "YykjpeuMNEk", "hLQl3WQQoQ0",
            "nfs8NYg7yQM", "RgKAFK5djSk", "CevxZvSJLk8",
        ],
    ),
];

fn descriptor(language: Language, mood: Mood, id: &str) -> MediaDescriptor {
    MediaDescriptor {
        title: format!("{} {} recommendation", language.display_name(), mood),
        locator: MediaLocator::Video { id: id.to_string() },
    }
}

/// Neutral clip of the default language.
pub(crate) fn fallback() -> MediaDescriptor {
    let (language, row) = &VIDEO_IDS[0];
    descriptor(*language, Mood::Neutral, row[Mood::Neutral.index()])
}

pub(crate) fn entries() -> HashMap<Language, HashMap<Mood, MediaDescriptor>> {
    VIDEO_IDS
        .iter()
        .map(|(language, row)| {
            let by_mood = Mood::ALL
                .iter()
                .zip(row.iter())
                .map(|(mood, id)| (*mood, descriptor(*language, *mood, id)))
                .collect();
            (*language, by_mood)
        })
        .collect()
}

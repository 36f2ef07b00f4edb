//! Recorded detector output as a frame source.
//!
//! One JSON object per line:
//!
//! ```text
//! {"ts_ms": 0,  "landmarks": [[0.31, 0.40], [0.52, 0.61], ...]}
//! {"ts_ms": 33, "landmarks": null}
//! {"ts_ms": 66, "landmarks": [{"x": 0.31, "y": 0.40, "z": -0.02}, ...]}
//! ```
//!
//! `landmarks: null` (or a missing key) is a frame with no face. Points may be
//! `[x, y]` pairs, `[x, y, z]` triples or `{x, y, z}` objects; depth is ignored.
//! A missing `ts_ms` falls back to 30 fps pacing from the line number.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::time::Duration;

use moodlens_core::{FrameEvent, LandmarkError, LandmarkSet, Point};
use serde::Deserialize;
use thiserror::Error;

/// Status shown when frames cannot be read at all.
pub const UNAVAILABLE_STATUS: &str = "Camera blocked/unavailable";

const FALLBACK_FRAME_INTERVAL: Duration = Duration::from_micros(33_333);

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Camera blocked/unavailable: {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum FrameParseError {
    #[error("invalid frame json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("point {index} needs at least two coordinates")]
    ShortPoint { index: usize },
    #[error("invalid timestamp {0}")]
    InvalidTimestamp(f64),
    #[error(transparent)]
    Landmarks(#[from] LandmarkError),
}

#[derive(Debug, Deserialize)]
struct FrameLine {
    ts_ms: Option<f64>,
    #[serde(default)]
    landmarks: Option<Vec<RawPoint>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Object { x: f64, y: f64 },
    Seq(Vec<f64>),
}

/// Parse one line. `line_no` (zero-based) paces frames that carry no timestamp.
pub fn parse_frame_line(line: &str, line_no: usize) -> Result<FrameEvent, FrameParseError> {
    let frame: FrameLine = serde_json::from_str(line)?;

    let at = match frame.ts_ms {
        Some(ms) => Duration::try_from_secs_f64(ms / 1000.0)
            .map_err(|_| FrameParseError::InvalidTimestamp(ms))?,
        None => FALLBACK_FRAME_INTERVAL * line_no as u32,
    };

    let Some(raw) = frame.landmarks else {
        return Ok(FrameEvent::NoFace { at });
    };

    let points = raw
        .into_iter()
        .enumerate()
        .map(|(index, p)| match p {
            RawPoint::Object { x, y } => Ok(Point::new(x, y)),
            RawPoint::Seq(v) if v.len() >= 2 => Ok(Point::new(v[0], v[1])),
            RawPoint::Seq(_) => Err(FrameParseError::ShortPoint { index }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FrameEvent::Face {
        landmarks: LandmarkSet::new(points)?,
        at,
    })
}

/// Frames replayed from a JSONL file. Malformed lines are logged and skipped.
pub struct ReplaySource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
    skipped: usize,
}

impl ReplaySource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "frame source opened");
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
            skipped: 0,
        })
    }

    /// Lines dropped so far because they could not be parsed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for ReplaySource {
    type Item = FrameEvent;

    fn next(&mut self) -> Option<FrameEvent> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!(path = %self.path.display(), error = %e, "frame source read failed");
                    return None;
                }
            };
            let line_no = self.line_no;
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }
            match parse_frame_line(&line, line_no) {
                Ok(event) => return Some(event),
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!(line = line_no + 1, error = %e, "skipping malformed frame");
                }
            }
        }
    }
}

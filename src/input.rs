//! Box and reference supply.
//!
//! This module plays the upstream-collaborator role: it reads detection
//! JSON and reference text from disk and enforces the supply contracts the
//! core relies on (quads of four points, confidence filtering, punctuation
//! merged into the preceding token). Pages that violate the contract
//! produce `MalformedInput` so a batch can skip them and continue.

use std::path::Path;

use serde::Deserialize;

use crate::error::AlignError;
use crate::types::{DetectedBox, Point};

#[derive(Debug, Deserialize)]
struct RawPage {
    boxes: Vec<RawBox>,
}

#[derive(Debug, Deserialize)]
struct RawBox {
    #[serde(default)]
    points: Vec<[f64; 2]>,
    transcription: Option<String>,
    confidence: Option<f64>,
}

/// Read one page of detected boxes from JSON, dropping boxes below the
/// confidence threshold.
pub fn read_page_boxes(
    path: &Path,
    page_name: &str,
    confidence_threshold: f64,
) -> Result<Vec<DetectedBox>, AlignError> {
    let data = std::fs::read_to_string(path).map_err(|e| AlignError::io("read page boxes", e))?;
    let raw: RawPage =
        serde_json::from_str(&data).map_err(|e| AlignError::json("parse page boxes", e))?;

    let mut boxes = Vec::with_capacity(raw.boxes.len());
    for (index, raw_box) in raw.boxes.into_iter().enumerate() {
        if raw_box.points.len() < 4 {
            return Err(AlignError::malformed(
                page_name,
                format!(
                    "box {index} has {} points, expected 4",
                    raw_box.points.len()
                ),
            ));
        }
        let Some(transcription) = raw_box.transcription else {
            return Err(AlignError::malformed(
                page_name,
                format!("box {index} is missing its transcription"),
            ));
        };
        let Some(confidence) = raw_box.confidence else {
            return Err(AlignError::malformed(
                page_name,
                format!("box {index} is missing its confidence"),
            ));
        };
        if confidence < confidence_threshold {
            continue;
        }

        let mut points = [Point::new(0.0, 0.0); 4];
        for (target, [x, y]) in points.iter_mut().zip(raw_box.points) {
            *target = Point::new(x, y);
        }
        boxes.push(DetectedBox::new(
            points,
            transcription.trim(),
            confidence,
        ));
    }

    tracing::debug!(page = page_name, box_count = boxes.len(), "page boxes loaded");
    Ok(boxes)
}

/// Read the reference transcription as a whitespace-separated word stream.
pub fn read_reference_words(path: &Path) -> Result<Vec<String>, AlignError> {
    let data =
        std::fs::read_to_string(path).map_err(|e| AlignError::io("read reference text", e))?;
    Ok(data.split_whitespace().map(str::to_string).collect())
}

/// Merge tokens consisting solely of punctuation into the preceding token.
///
/// The comparison stream never contains bare punctuation; this produces
/// the display stream whose indices stay parallel to the comparison
/// stream's. Leading punctuation with no predecessor is dropped.
pub fn merge_punctuation(tokens: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let only_punctuation =
            !token.is_empty() && token.chars().all(|c| c.is_ascii_punctuation());
        if only_punctuation {
            if let Some(last) = merged.last_mut() {
                last.push_str(token);
            }
        } else {
            merged.push(token.clone());
        }
    }
    merged
}

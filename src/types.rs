use serde::{Deserialize, Serialize};

/// Planar coordinate of a box corner or midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A spatially-detected text box with its recognized transcription.
///
/// Boxes arrive already confidence-filtered by the upstream supplier; the
/// engine never re-filters. The quad keeps the detector's corner order,
/// which is not necessarily canonical: corner 0 to 1 spans the horizontal
/// edge and corner 0 to 3 the vertical edge, as emitted by the detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedBox {
    pub points: [Point; 4],
    pub transcription: String,
    pub confidence: f64,
}

impl DetectedBox {
    pub fn new(points: [Point; 4], transcription: impl Into<String>, confidence: f64) -> Self {
        Self {
            points,
            transcription: transcription.into(),
            confidence,
        }
    }

    /// Mean of the four corners.
    pub fn midpoint(&self) -> Point {
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }

    pub fn glyph_count(&self) -> usize {
        self.transcription.chars().count()
    }
}

/// One item of the flattened OCR stream: a recognized glyph tagged with the
/// index of the box it came from (after reading-order sorting).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrGlyph {
    pub glyph: char,
    pub box_index: usize,
}

/// A page ready for alignment: boxes in reading order plus the reference
/// word stream they are compared against.
#[derive(Debug, Clone)]
pub struct Page {
    pub name: String,
    pub boxes: Vec<DetectedBox>,
    pub reference_words: Vec<String>,
}

/// Classification of a non-gap alignment edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchClass {
    Exact,
    Similar,
    Wrong,
}

/// One step of the alignment. Gap edges carry an index on exactly one side
/// by construction, so the invariant needs no runtime check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AlignmentEdge {
    Match {
        ocr: usize,
        reference: usize,
        class: MatchClass,
    },
    /// A reference item with no recognized counterpart.
    Insertion { reference: usize },
    /// A recognized item with no reference counterpart.
    Deletion { ocr: usize },
}

impl AlignmentEdge {
    pub fn ocr_index(&self) -> Option<usize> {
        match self {
            Self::Match { ocr, .. } | Self::Deletion { ocr } => Some(*ocr),
            Self::Insertion { .. } => None,
        }
    }

    pub fn reference_index(&self) -> Option<usize> {
        match self {
            Self::Match { reference, .. } | Self::Insertion { reference } => Some(*reference),
            Self::Deletion { .. } => None,
        }
    }

    pub fn is_gap(&self) -> bool {
        !matches!(self, Self::Match { .. })
    }
}

/// Total edit cost plus the full edge list in left-to-right order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentResult {
    pub cost: u32,
    pub edges: Vec<AlignmentEdge>,
}

/// Display classification for one visual unit on one side of the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderClass {
    Match,
    Wrong,
    Similar,
    Gap,
}

/// The slice of the alignment belonging to a single detected box.
#[derive(Debug, Clone, Serialize)]
pub struct BoxAlignment {
    pub box_index: usize,
    pub edges: Vec<AlignmentEdge>,
    /// True when nothing in the box ever matched the reference; the
    /// renderer may suppress such boxes as likely spurious detections.
    pub spurious: bool,
}

/// Result of aligning one page: boxes in reading order, the flat alignment,
/// and its projection onto the boxes.
#[derive(Debug, Clone)]
pub struct PageAlignment {
    pub boxes: Vec<DetectedBox>,
    pub result: AlignmentResult,
    pub box_alignments: Vec<BoxAlignment>,
}

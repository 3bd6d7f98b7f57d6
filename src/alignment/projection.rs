//! Projection of the flat alignment back onto detected boxes.
//!
//! The engine aligns one flattened glyph stream per page, but review
//! happens box by box. Each box receives the maximal run of edges whose
//! OCR index originates from it; insertion edges (reference items nothing
//! was recognized for) attach to the box open at that point of the walk.

use crate::types::{
    AlignmentEdge, BoxAlignment, DetectedBox, MatchClass, OcrGlyph, RenderClass,
};

/// Flatten sorted boxes into the page-level OCR stream, tagging every
/// glyph with the index of its box in reading order.
pub fn flatten_boxes(boxes: &[DetectedBox]) -> Vec<OcrGlyph> {
    boxes
        .iter()
        .enumerate()
        .flat_map(|(box_index, b)| {
            b.transcription
                .chars()
                .map(move |glyph| OcrGlyph { glyph, box_index })
        })
        .collect()
}

/// Partition the flat edge list by originating box, preserving edge order.
///
/// OCR indices increase along the alignment, so each box's edges form one
/// contiguous run. A box none of whose edges touches the reference stream
/// is flagged spurious (a box with no glyphs at all is vacuously so).
pub fn project_onto_boxes(
    edges: &[AlignmentEdge],
    ocr: &[OcrGlyph],
    box_count: usize,
) -> Vec<BoxAlignment> {
    let mut assignments = Vec::with_capacity(box_count);
    let mut cursor = 0usize;

    for box_index in 0..box_count {
        let mut run = Vec::new();
        while let Some(edge) = edges.get(cursor) {
            match edge.ocr_index() {
                Some(ocr_index) if ocr[ocr_index].box_index != box_index => break,
                _ => {}
            }
            run.push(*edge);
            cursor += 1;
        }
        let spurious = run.iter().all(|e| e.reference_index().is_none());
        if spurious {
            tracing::debug!(box_index, edge_count = run.len(), "likely spurious detection");
        }
        assignments.push(BoxAlignment {
            box_index,
            edges: run,
            spurious,
        });
    }

    assignments
}

/// Render class of an edge on the OCR side of the diff.
pub fn ocr_render_class(edge: &AlignmentEdge) -> RenderClass {
    match edge {
        AlignmentEdge::Insertion { .. } => RenderClass::Gap,
        AlignmentEdge::Deletion { .. } => RenderClass::Wrong,
        AlignmentEdge::Match { class, .. } => match_render_class(*class),
    }
}

/// Render class of an edge on the reference side of the diff.
pub fn reference_render_class(edge: &AlignmentEdge) -> RenderClass {
    match edge {
        AlignmentEdge::Deletion { .. } => RenderClass::Gap,
        AlignmentEdge::Insertion { .. } => RenderClass::Wrong,
        AlignmentEdge::Match { class, .. } => match_render_class(*class),
    }
}

fn match_render_class(class: MatchClass) -> RenderClass {
    match class {
        MatchClass::Exact => RenderClass::Match,
        MatchClass::Similar => RenderClass::Similar,
        MatchClass::Wrong => RenderClass::Wrong,
    }
}

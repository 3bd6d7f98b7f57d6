use crate::alignment::geometry::sort_reading_order;
use crate::alignment::levenshtein::align_streams;
use crate::alignment::projection::project_onto_boxes;
use crate::dictionary::DictionaryStore;
use crate::pipeline::traits::{AlignmentProjector, BoxSorter, SequenceAligner};
use crate::types::{AlignmentEdge, AlignmentResult, BoxAlignment, DetectedBox, OcrGlyph};

pub struct ReadingOrderSorter;

impl BoxSorter for ReadingOrderSorter {
    fn sort(&self, boxes: &mut [DetectedBox]) {
        sort_reading_order(boxes);
    }
}

pub struct DictionaryLevenshteinAligner;

impl SequenceAligner for DictionaryLevenshteinAligner {
    fn align(
        &self,
        ocr: &[OcrGlyph],
        reference: &[String],
        dictionaries: &DictionaryStore,
    ) -> AlignmentResult {
        align_streams(ocr, reference, dictionaries)
    }
}

pub struct BoxProjector;

impl AlignmentProjector for BoxProjector {
    fn project(
        &self,
        edges: &[AlignmentEdge],
        ocr: &[OcrGlyph],
        box_count: usize,
    ) -> Vec<BoxAlignment> {
        project_onto_boxes(edges, ocr, box_count)
    }
}

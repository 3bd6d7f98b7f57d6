use crate::dictionary::DictionaryStore;
use crate::types::{AlignmentEdge, AlignmentResult, BoxAlignment, DetectedBox, OcrGlyph};

pub trait BoxSorter: Send + Sync {
    /// Reorder boxes into reading order in place.
    fn sort(&self, boxes: &mut [DetectedBox]);
}

pub trait SequenceAligner: Send + Sync {
    fn align(
        &self,
        ocr: &[OcrGlyph],
        reference: &[String],
        dictionaries: &DictionaryStore,
    ) -> AlignmentResult;
}

pub trait AlignmentProjector: Send + Sync {
    fn project(
        &self,
        edges: &[AlignmentEdge],
        ocr: &[OcrGlyph],
        box_count: usize,
    ) -> Vec<BoxAlignment>;
}

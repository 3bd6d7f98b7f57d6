use std::sync::Arc;

use rayon::prelude::*;

use crate::alignment::projection::flatten_boxes;
use crate::dictionary::DictionaryStore;
use crate::error::AlignError;
use crate::pipeline::traits::{AlignmentProjector, BoxSorter, SequenceAligner};
use crate::types::{Page, PageAlignment};

/// Outcome of one page in a batch: the page either aligned or was skipped
/// with a diagnostic.
#[derive(Debug)]
pub struct PageOutcome {
    pub name: String,
    pub result: Result<PageAlignment, AlignError>,
}

/// The assembled alignment pipeline: reading-order sort, dictionary-aware
/// edit distance, projection back onto boxes.
///
/// The dictionary handle is shared and immutable; one `PageAligner` can
/// serve any number of pages, concurrently.
pub struct PageAligner {
    dictionaries: Arc<DictionaryStore>,
    sorter: Box<dyn BoxSorter>,
    aligner: Box<dyn SequenceAligner>,
    projector: Box<dyn AlignmentProjector>,
}

pub(crate) struct PageAlignerParts {
    pub dictionaries: Arc<DictionaryStore>,
    pub sorter: Box<dyn BoxSorter>,
    pub aligner: Box<dyn SequenceAligner>,
    pub projector: Box<dyn AlignmentProjector>,
}

impl PageAligner {
    pub(crate) fn from_parts(parts: PageAlignerParts) -> Self {
        Self {
            dictionaries: parts.dictionaries,
            sorter: parts.sorter,
            aligner: parts.aligner,
            projector: parts.projector,
        }
    }

    pub fn dictionaries(&self) -> &DictionaryStore {
        &self.dictionaries
    }

    /// Align one page: sort its boxes into reading order, align the
    /// flattened glyph stream against the reference words, and project the
    /// result onto the boxes.
    ///
    /// The only error a page computation can surface is `MalformedInput`;
    /// empty streams and degenerate geometry are handled, not raised.
    pub fn align_page(&self, page: Page) -> Result<PageAlignment, AlignError> {
        let Page {
            name,
            mut boxes,
            reference_words,
        } = page;

        for (index, b) in boxes.iter().enumerate() {
            let finite = b.points.iter().all(|p| p.x.is_finite() && p.y.is_finite());
            if !finite || !b.confidence.is_finite() {
                return Err(AlignError::malformed(
                    &name,
                    format!("box {index} has non-finite geometry or confidence"),
                ));
            }
        }

        self.sorter.sort(&mut boxes);
        let ocr = flatten_boxes(&boxes);
        let result = self.aligner.align(&ocr, &reference_words, &self.dictionaries);
        let box_alignments = self.projector.project(&result.edges, &ocr, boxes.len());

        tracing::debug!(
            page = name.as_str(),
            glyphs = ocr.len(),
            reference_words = reference_words.len(),
            cost = result.cost,
            "page aligned"
        );

        Ok(PageAlignment {
            boxes,
            result,
            box_alignments,
        })
    }

    /// Align a batch of pages in parallel. Pages are independent; a page
    /// that fails is reported and skipped, the rest of the batch proceeds.
    pub fn align_pages(&self, pages: Vec<Page>) -> Vec<PageOutcome> {
        pages
            .into_par_iter()
            .map(|page| {
                let name = page.name.clone();
                let result = self.align_page(page);
                if let Err(err) = &result {
                    tracing::warn!(page = name.as_str(), error = %err, "skipping page");
                }
                PageOutcome { name, result }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::builder::PageAlignerBuilder;
    use crate::types::{DetectedBox, MatchClass, Point};
    use std::collections::HashMap;

    fn aligner() -> PageAligner {
        let mut translations = HashMap::new();
        translations.insert("nam".to_string(), vec!['南']);
        translations.insert("sơn".to_string(), vec!['山']);
        PageAlignerBuilder::default()
            .with_dictionaries(DictionaryStore::new(translations, HashMap::new()))
            .build()
            .unwrap()
    }

    fn tall_box(x: f64, text: &str) -> DetectedBox {
        let glyphs = text.chars().count().max(1) as f64;
        DetectedBox::new(
            [
                Point::new(x - 5.0, 0.0),
                Point::new(x + 5.0, 0.0),
                Point::new(x + 5.0, glyphs * 10.0),
                Point::new(x - 5.0, glyphs * 10.0),
            ],
            text,
            0.9,
        )
    }

    #[test]
    fn page_alignment_sorts_then_aligns() {
        // The right column holds the first reference word, so reading
        // order (right to left) must recover a perfect alignment.
        let page = Page {
            name: "p1".to_string(),
            boxes: vec![tall_box(10.0, "山"), tall_box(100.0, "南")],
            reference_words: vec!["nam".to_string(), "sơn".to_string()],
        };
        let aligned = aligner().align_page(page).unwrap();
        assert_eq!(aligned.result.cost, 0);
        assert_eq!(aligned.boxes[0].transcription, "南");
        assert!(aligned.result.edges.iter().all(|e| matches!(
            e,
            crate::types::AlignmentEdge::Match {
                class: MatchClass::Exact,
                ..
            }
        )));
    }

    #[test]
    fn empty_page_aligns_to_pure_insertions() {
        let page = Page {
            name: "p1".to_string(),
            boxes: Vec::new(),
            reference_words: vec!["nam".to_string(), "sơn".to_string()],
        };
        let aligned = aligner().align_page(page).unwrap();
        assert_eq!(aligned.result.cost, 2);
        assert!(aligned.result.edges.iter().all(|e| e.is_gap()));
        assert!(aligned.box_alignments.is_empty());
    }

    #[test]
    fn non_finite_box_is_malformed() {
        let mut bad = tall_box(10.0, "南");
        bad.points[2] = Point::new(f64::NAN, 0.0);
        let page = Page {
            name: "p1".to_string(),
            boxes: vec![bad],
            reference_words: vec!["nam".to_string()],
        };
        let result = aligner().align_page(page);
        assert!(matches!(result, Err(AlignError::MalformedInput { .. })));
    }

    #[test]
    fn batch_skips_malformed_page_and_continues() {
        let mut bad = tall_box(10.0, "南");
        bad.confidence = f64::NAN;
        let pages = vec![
            Page {
                name: "good".to_string(),
                boxes: vec![tall_box(10.0, "南")],
                reference_words: vec!["nam".to_string()],
            },
            Page {
                name: "bad".to_string(),
                boxes: vec![bad],
                reference_words: vec!["nam".to_string()],
            },
        ];
        let outcomes = aligner().align_pages(pages);
        assert_eq!(outcomes.len(), 2);
        let good = outcomes.iter().find(|o| o.name == "good").unwrap();
        let bad = outcomes.iter().find(|o| o.name == "bad").unwrap();
        assert!(good.result.is_ok());
        assert!(matches!(
            bad.result,
            Err(AlignError::MalformedInput { .. })
        ));
    }
}

//! Dictionary-aware edit-distance alignment.
//!
//! A classic Levenshtein DP over the recognized glyph stream and the
//! reference word stream, except that substitution cost is decided by the
//! dictionary classification: an acceptable rendering costs nothing, any
//! other substitution costs 2. Similar and Wrong substitutions cost the
//! same; the distinction only changes how the edge is rendered.

use crate::dictionary::DictionaryStore;
use crate::types::{AlignmentEdge, AlignmentResult, MatchClass, OcrGlyph};

const SUBSTITUTION_COST: u32 = 2;
const GAP_COST: u32 = 1;

const STEP_DIAG: u8 = 0;
const STEP_INSERT: u8 = 1;
const STEP_DELETE: u8 = 2;

/// Align the flattened OCR stream against the reference word stream.
///
/// O(m·n) time and space; the full cost matrix is kept (`u32` cells, `u8`
/// step codes) so the backtrack can recover the edge list. Ties are broken
/// diagonal first, then insertion, then deletion.
pub fn align_streams(
    ocr: &[OcrGlyph],
    reference: &[String],
    dictionaries: &DictionaryStore,
) -> AlignmentResult {
    let m = ocr.len();
    let n = reference.len();
    if m == 0 && n == 0 {
        return AlignmentResult {
            cost: 0,
            edges: Vec::new(),
        };
    }

    let width = n + 1;
    let mut cost = vec![0u32; (m + 1) * width];
    let mut step = vec![STEP_DIAG; (m + 1) * width];
    for (j, cell) in cost[..width].iter_mut().enumerate() {
        *cell = j as u32;
    }
    for i in 0..=m {
        cost[i * width] = i as u32;
    }

    for i in 1..=m {
        for j in 1..=n {
            let class = dictionaries.classify(ocr[i - 1].glyph, &reference[j - 1]);
            let substitution = if class == MatchClass::Exact {
                0
            } else {
                SUBSTITUTION_COST
            };
            let diag = cost[(i - 1) * width + (j - 1)] + substitution;
            let insert = cost[i * width + (j - 1)] + GAP_COST;
            let delete = cost[(i - 1) * width + j] + GAP_COST;

            // Tie-break priority: diagonal, then insertion, then deletion.
            let mut best = diag;
            let mut chosen = STEP_DIAG;
            if insert < best {
                best = insert;
                chosen = STEP_INSERT;
            }
            if delete < best {
                best = delete;
                chosen = STEP_DELETE;
            }
            cost[i * width + j] = best;
            step[i * width + j] = chosen;
        }
    }

    let mut edges = Vec::with_capacity(m.max(n));
    let mut i = m;
    let mut j = n;
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && step[i * width + j] == STEP_DIAG {
            edges.push(AlignmentEdge::Match {
                ocr: i - 1,
                reference: j - 1,
                class: dictionaries.classify(ocr[i - 1].glyph, &reference[j - 1]),
            });
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || step[i * width + j] == STEP_INSERT) {
            edges.push(AlignmentEdge::Insertion { reference: j - 1 });
            j -= 1;
        } else {
            edges.push(AlignmentEdge::Deletion { ocr: i - 1 });
            i -= 1;
        }
    }
    edges.reverse();

    AlignmentResult {
        cost: cost[m * width + n],
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn glyphs(s: &str) -> Vec<OcrGlyph> {
        s.chars()
            .map(|glyph| OcrGlyph {
                glyph,
                box_index: 0,
            })
            .collect()
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|w| w.to_string()).collect()
    }

    /// A store where "a" renders as 'A', "c" as 'C', and 'B' is visually
    /// confusable with 'A'.
    fn store() -> DictionaryStore {
        let mut translations = HashMap::new();
        translations.insert("a".to_string(), vec!['A']);
        translations.insert("c".to_string(), vec!['C']);
        let mut similars = HashMap::new();
        similars.insert('B', vec!['A']);
        DictionaryStore::new(translations, similars)
    }

    /// Every OCR index and reference index appears in exactly one edge, in
    /// increasing order on both sides.
    fn assert_conserved(result: &AlignmentResult, m: usize, n: usize) {
        let ocr_indices: Vec<usize> = result.edges.iter().filter_map(|e| e.ocr_index()).collect();
        let ref_indices: Vec<usize> = result
            .edges
            .iter()
            .filter_map(|e| e.reference_index())
            .collect();
        assert_eq!(ocr_indices, (0..m).collect::<Vec<_>>());
        assert_eq!(ref_indices, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn identity_alignment_costs_nothing() {
        let ocr = glyphs("AC");
        let reference = words(&["a", "c"]);
        let result = align_streams(&ocr, &reference, &store());
        assert_eq!(result.cost, 0);
        assert_eq!(result.edges.len(), 2);
        assert!(result.edges.iter().all(|e| matches!(
            e,
            AlignmentEdge::Match {
                class: MatchClass::Exact,
                ..
            }
        )));
        assert_conserved(&result, 2, 2);
    }

    #[test]
    fn single_substitution_scenario() {
        // OCR "ABC" against reference ["a", "x", "c"]: the middle pair has
        // no dictionary relation and must align as one Wrong substitution.
        let ocr = glyphs("ABC");
        let reference = words(&["a", "x", "c"]);
        let result = align_streams(&ocr, &reference, &store());
        assert_eq!(result.cost, 2);
        assert_eq!(
            result.edges,
            vec![
                AlignmentEdge::Match {
                    ocr: 0,
                    reference: 0,
                    class: MatchClass::Exact,
                },
                AlignmentEdge::Match {
                    ocr: 1,
                    reference: 1,
                    class: MatchClass::Wrong,
                },
                AlignmentEdge::Match {
                    ocr: 2,
                    reference: 2,
                    class: MatchClass::Exact,
                },
            ]
        );
    }

    #[test]
    fn similar_substitution_keeps_cost_but_changes_class() {
        let ocr = glyphs("B");
        let reference = words(&["a"]);
        let result = align_streams(&ocr, &reference, &store());
        assert_eq!(result.cost, 2);
        assert_eq!(
            result.edges,
            vec![AlignmentEdge::Match {
                ocr: 0,
                reference: 0,
                class: MatchClass::Similar,
            }]
        );
    }

    #[test]
    fn tie_prefers_diagonal_over_gap_pair() {
        // A lone wrong substitution (cost 2) ties an insertion+deletion
        // pair (cost 2); the diagonal must win.
        let ocr = glyphs("Z");
        let reference = words(&["x"]);
        let result = align_streams(&ocr, &reference, &store());
        assert_eq!(result.cost, 2);
        assert_eq!(
            result.edges,
            vec![AlignmentEdge::Match {
                ocr: 0,
                reference: 0,
                class: MatchClass::Wrong,
            }]
        );
    }

    #[test]
    fn empty_ocr_is_pure_insertion() {
        let reference = words(&["x", "y"]);
        let result = align_streams(&[], &reference, &store());
        assert_eq!(result.cost, 2);
        assert_eq!(
            result.edges,
            vec![
                AlignmentEdge::Insertion { reference: 0 },
                AlignmentEdge::Insertion { reference: 1 },
            ]
        );
    }

    #[test]
    fn empty_reference_is_pure_deletion() {
        let ocr = glyphs("ABC");
        let result = align_streams(&ocr, &[], &store());
        assert_eq!(result.cost, 3);
        assert_eq!(
            result.edges,
            vec![
                AlignmentEdge::Deletion { ocr: 0 },
                AlignmentEdge::Deletion { ocr: 1 },
                AlignmentEdge::Deletion { ocr: 2 },
            ]
        );
    }

    #[test]
    fn both_empty_is_empty_alignment() {
        let result = align_streams(&[], &[], &store());
        assert_eq!(result.cost, 0);
        assert!(result.edges.is_empty());
    }

    #[test]
    fn cost_stays_within_bounds() {
        let store = store();
        let cases: Vec<(Vec<OcrGlyph>, Vec<String>)> = vec![
            (glyphs("AC"), words(&["a", "c"])),
            (glyphs("AZZC"), words(&["a", "c"])),
            (glyphs("A"), words(&["x", "y", "z"])),
            (glyphs("ZZZZ"), words(&["a"])),
            (glyphs(""), words(&["a", "b"])),
        ];
        for (ocr, reference) in cases {
            let (m, n) = (ocr.len(), reference.len());
            let result = align_streams(&ocr, &reference, &store);
            let lower = (m as i64 - n as i64).unsigned_abs() as u32;
            assert!(result.cost >= lower, "cost below |m-n| for m={m} n={n}");
            assert!(result.cost <= (m + n) as u32, "cost above m+n for m={m} n={n}");
            assert_conserved(&result, m, n);
        }
    }

    #[test]
    fn insertion_preferred_over_deletion_on_ties() {
        // OCR "A" vs ["x", "a"]: the exact match pairs with reference
        // index 1, leaving "x" as an insertion before it.
        let ocr = glyphs("A");
        let reference = words(&["x", "a"]);
        let result = align_streams(&ocr, &reference, &store());
        assert_eq!(result.cost, 1);
        assert_eq!(
            result.edges,
            vec![
                AlignmentEdge::Insertion { reference: 0 },
                AlignmentEdge::Match {
                    ocr: 0,
                    reference: 1,
                    class: MatchClass::Exact,
                },
            ]
        );
    }
}

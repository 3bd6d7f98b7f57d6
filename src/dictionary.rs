//! Lookup tables backing the alignment classification.
//!
//! Two read-only dictionaries are loaded once and shared by reference for
//! the lifetime of a run: the translation dictionary (canonicalized
//! reference word to its acceptable recognized renderings) and the
//! similarity dictionary (recognized glyph to its visually-confusable
//! alternatives). Lookup misses are ordinary outcomes, never errors.

use std::collections::HashMap;
use std::path::Path;

use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

use crate::error::AlignError;
use crate::types::MatchClass;

/// Normalize a reference word into its dictionary key.
///
/// Decomposes to NFD, splits base characters from combining marks, sorts
/// the marks, and joins bases followed by marks. Two spellings that differ
/// only in diacritic-mark ordering therefore share a key, and the function
/// is idempotent.
pub fn canonicalize(word: &str) -> String {
    let mut bases = String::new();
    let mut marks: Vec<char> = Vec::new();
    for c in word.nfd() {
        if canonical_combining_class(c) != 0 {
            marks.push(c);
        } else {
            bases.push(c);
        }
    }
    marks.sort_unstable();
    bases.extend(marks);
    bases
}

/// Outcome of a translation-dictionary lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationLookup<'a> {
    Known(&'a [char]),
    Unknown,
}

impl<'a> TranslationLookup<'a> {
    /// The acceptable renderings, empty when the word is unknown.
    pub fn renderings(&self) -> &'a [char] {
        match *self {
            Self::Known(glyphs) => glyphs,
            Self::Unknown => &[],
        }
    }
}

/// Outcome of a similarity-dictionary lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarLookup<'a> {
    Known(&'a [char]),
    Unknown,
}

impl<'a> SimilarLookup<'a> {
    /// Visually-confusable alternatives, most similar first; empty when the
    /// glyph is unknown.
    pub fn alternatives(&self) -> &'a [char] {
        match *self {
            Self::Known(glyphs) => glyphs,
            Self::Unknown => &[],
        }
    }
}

/// Immutable dictionary handle injected into every alignment run.
#[derive(Debug, Clone, Default)]
pub struct DictionaryStore {
    translations: HashMap<String, Vec<char>>,
    similars: HashMap<char, Vec<char>>,
}

impl DictionaryStore {
    /// Build a store from in-memory tables. Translation keys are
    /// canonicalized; duplicate keys merge their rendering lists.
    pub fn new(
        translations: HashMap<String, Vec<char>>,
        similars: HashMap<char, Vec<char>>,
    ) -> Self {
        let mut canonical: HashMap<String, Vec<char>> = HashMap::new();
        for (word, renderings) in translations {
            canonical
                .entry(canonicalize(&word))
                .or_default()
                .extend(renderings);
        }
        Self {
            translations: canonical,
            similars,
        }
    }

    /// Load both dictionaries from JSON files.
    ///
    /// The translation file maps reference words to arrays of renderings,
    /// the similarity file maps glyphs to arrays of alternatives. Entries
    /// whose glyph field is not a single character are skipped with a
    /// warning rather than failing the load.
    pub fn load(translation_path: &Path, similarity_path: &Path) -> Result<Self, AlignError> {
        let translations = load_glyph_lists(translation_path, "read translation dictionary")?;
        let raw_similars = load_glyph_lists(similarity_path, "read similarity dictionary")?;

        let mut similars = HashMap::with_capacity(raw_similars.len());
        for (key, glyphs) in raw_similars {
            match single_char(&key) {
                Some(c) => {
                    similars.insert(c, glyphs);
                }
                None => {
                    tracing::warn!(key = key.as_str(), "similarity entry key is not one glyph");
                }
            }
        }

        tracing::info!(
            translation_entries = translations.len(),
            similarity_entries = similars.len(),
            "dictionaries loaded"
        );
        Ok(Self::new(translations, similars))
    }

    pub fn translations_for(&self, canonical_key: &str) -> TranslationLookup<'_> {
        match self.translations.get(canonical_key) {
            Some(glyphs) => TranslationLookup::Known(glyphs),
            None => TranslationLookup::Unknown,
        }
    }

    pub fn similars_for(&self, glyph: char) -> SimilarLookup<'_> {
        match self.similars.get(&glyph) {
            Some(glyphs) => SimilarLookup::Known(glyphs),
            None => SimilarLookup::Unknown,
        }
    }

    /// Classify one recognized glyph against one reference word.
    ///
    /// Exact when the glyph is an acceptable rendering of the word; Similar
    /// when one of the glyph's confusable alternatives is; Wrong otherwise.
    /// Unknown words and glyphs classify Wrong, they do not fail.
    pub fn classify(&self, ocr_glyph: char, ref_word: &str) -> MatchClass {
        let renderings = self.translations_for(&canonicalize(ref_word)).renderings();
        if renderings.contains(&ocr_glyph) {
            return MatchClass::Exact;
        }
        let confusable = self
            .similars_for(ocr_glyph)
            .alternatives()
            .iter()
            .any(|alt| renderings.contains(alt));
        if confusable {
            MatchClass::Similar
        } else {
            MatchClass::Wrong
        }
    }
}

fn load_glyph_lists(
    path: &Path,
    context: &'static str,
) -> Result<HashMap<String, Vec<char>>, AlignError> {
    let data = std::fs::read_to_string(path).map_err(|e| AlignError::io(context, e))?;
    let raw: HashMap<String, Vec<String>> =
        serde_json::from_str(&data).map_err(|e| AlignError::json(context, e))?;

    let mut table = HashMap::with_capacity(raw.len());
    for (key, values) in raw {
        let mut glyphs = Vec::with_capacity(values.len());
        for value in values {
            match single_char(&value) {
                Some(c) => glyphs.push(c),
                None => {
                    tracing::warn!(
                        key = key.as_str(),
                        value = value.as_str(),
                        "dictionary rendering is not one glyph, skipping"
                    );
                }
            }
        }
        table.insert(key, glyphs);
    }
    Ok(table)
}

fn single_char(s: &str) -> Option<char> {
    let mut it = s.chars();
    let c = it.next()?;
    if it.next().is_some() {
        return None;
    }
    Some(c)
}

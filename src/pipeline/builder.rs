use std::path::Path;
use std::sync::Arc;

use crate::config::AlignerConfig;
use crate::dictionary::DictionaryStore;
use crate::error::AlignError;
use crate::pipeline::defaults::{BoxProjector, DictionaryLevenshteinAligner, ReadingOrderSorter};
use crate::pipeline::runtime::{PageAligner, PageAlignerParts};
use crate::pipeline::traits::{AlignmentProjector, BoxSorter, SequenceAligner};

/// Assembles a `PageAligner`, loading the dictionaries once.
///
/// Stage implementations default to the shipped ones and can be swapped
/// individually; a preloaded `DictionaryStore` short-circuits the file
/// loading entirely.
#[derive(Default)]
pub struct PageAlignerBuilder {
    config: AlignerConfig,
    dictionaries: Option<Arc<DictionaryStore>>,
    sorter: Option<Box<dyn BoxSorter>>,
    aligner: Option<Box<dyn SequenceAligner>>,
    projector: Option<Box<dyn AlignmentProjector>>,
}

impl PageAlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_dictionaries(mut self, dictionaries: DictionaryStore) -> Self {
        self.dictionaries = Some(Arc::new(dictionaries));
        self
    }

    pub fn with_shared_dictionaries(mut self, dictionaries: Arc<DictionaryStore>) -> Self {
        self.dictionaries = Some(dictionaries);
        self
    }

    pub fn with_sorter(mut self, sorter: Box<dyn BoxSorter>) -> Self {
        self.sorter = Some(sorter);
        self
    }

    pub fn with_aligner(mut self, aligner: Box<dyn SequenceAligner>) -> Self {
        self.aligner = Some(aligner);
        self
    }

    pub fn with_projector(mut self, projector: Box<dyn AlignmentProjector>) -> Self {
        self.projector = Some(projector);
        self
    }

    pub fn build(self) -> Result<PageAligner, AlignError> {
        let dictionaries = match self.dictionaries {
            Some(dictionaries) => dictionaries,
            None => Arc::new(DictionaryStore::load(
                Path::new(&self.config.translation_dict_path),
                Path::new(&self.config.similarity_dict_path),
            )?),
        };

        Ok(PageAligner::from_parts(PageAlignerParts {
            dictionaries,
            sorter: self.sorter.unwrap_or_else(|| Box::new(ReadingOrderSorter)),
            aligner: self
                .aligner
                .unwrap_or_else(|| Box::new(DictionaryLevenshteinAligner)),
            projector: self.projector.unwrap_or_else(|| Box::new(BoxProjector)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn build_with_preloaded_dictionaries_needs_no_files() {
        let store = DictionaryStore::new(HashMap::new(), HashMap::new());
        let aligner = PageAlignerBuilder::default()
            .with_dictionaries(store)
            .build();
        assert!(aligner.is_ok());
    }

    #[test]
    fn build_loads_dictionaries_from_config_paths() {
        let mut translation = NamedTempFile::new().unwrap();
        write!(translation, r#"{{"nam": ["南"]}}"#).unwrap();
        let mut similarity = NamedTempFile::new().unwrap();
        write!(similarity, r#"{{}}"#).unwrap();

        let config = AlignerConfig {
            translation_dict_path: translation.path().to_string_lossy().to_string(),
            similarity_dict_path: similarity.path().to_string_lossy().to_string(),
            ..AlignerConfig::default()
        };
        let aligner = PageAlignerBuilder::new(config).build().unwrap();
        assert!(matches!(
            aligner
                .dictionaries()
                .translations_for(&crate::dictionary::canonicalize("nam")),
            crate::dictionary::TranslationLookup::Known(_)
        ));
    }

    #[test]
    fn build_fails_on_missing_dictionary_path() {
        let config = AlignerConfig {
            translation_dict_path: "/nonexistent/translation.json".to_string(),
            similarity_dict_path: "/nonexistent/similarity.json".to_string(),
            ..AlignerConfig::default()
        };
        let result = PageAlignerBuilder::new(config).build();
        assert!(matches!(result, Err(AlignError::Io { .. })));
    }

    #[test]
    fn shared_dictionaries_reuse_one_allocation() {
        let store = Arc::new(DictionaryStore::new(HashMap::new(), HashMap::new()));
        let a = PageAlignerBuilder::default()
            .with_shared_dictionaries(Arc::clone(&store))
            .build()
            .unwrap();
        let b = PageAlignerBuilder::default()
            .with_shared_dictionaries(Arc::clone(&store))
            .build()
            .unwrap();
        assert!(std::ptr::eq(a.dictionaries(), b.dictionaries()));
    }
}

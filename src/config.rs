#[derive(Debug, Clone)]
pub struct AlignerConfig {
    pub translation_dict_path: String,
    pub similarity_dict_path: String,
    /// Boxes below this recognition confidence are dropped at load time;
    /// the alignment core itself never re-filters.
    pub confidence_threshold: f64,
}

impl AlignerConfig {
    pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.55;
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            translation_dict_path: String::new(),
            similarity_dict_path: String::new(),
            confidence_threshold: Self::DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

pub mod alignment;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod types;

pub use config::AlignerConfig;
pub use dictionary::{canonicalize, DictionaryStore, SimilarLookup, TranslationLookup};
pub use error::AlignError;
pub use pipeline::builder::PageAlignerBuilder;
pub use pipeline::runtime::{PageAligner, PageOutcome};
pub use pipeline::traits::{AlignmentProjector, BoxSorter, SequenceAligner};
pub use types::{
    AlignmentEdge, AlignmentResult, BoxAlignment, DetectedBox, MatchClass, OcrGlyph, Page,
    PageAlignment, Point, RenderClass,
};

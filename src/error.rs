use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// A page whose box data violates the supply contract. The page is
    /// skipped and batch processing continues with the remaining pages.
    #[error("malformed page '{page}': {message}")]
    MalformedInput { page: String, message: String },
}

impl AlignError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn malformed(page: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            page: page.into(),
            message: message.into(),
        }
    }
}

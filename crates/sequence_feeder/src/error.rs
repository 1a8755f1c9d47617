use thiserror::Error;

/// Error taxonomy for the feeder pipeline.
///
/// Every error condition here is a deterministic function of the input
/// shapes, so none of them are retryable: callers must fix the
/// configuration or the corpus and re-invoke.
///
/// All errors are raised eagerly - at batcher construction or at the
/// start of `produce`/`iterate` - never mid-traversal. Once a step
/// stream has started yielding, it cannot fail.
#[derive(Debug, Error)]
pub enum FeederError {
    /// Invalid `batch_size` or `sequence_length`, or a column too short
    /// to form even one valid window.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The feeder references a column that is absent from the supplied
    /// corpus.
    #[error("column '{0}' not found in corpus")]
    MissingColumn(String),
}

impl FeederError {
    /// Convenience constructor for configuration errors.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

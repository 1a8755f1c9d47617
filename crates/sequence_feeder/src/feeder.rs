use crate::batcher::{SequenceBatcher, Windows};
use crate::column::EncodedColumn;
use crate::error::FeederError;
use crate::formatter::Generator;
use anyhow::Result;
use std::collections::HashMap;
use tch::Tensor;

/// The `Feeder` composes one [`SequenceBatcher`] and one [`Generator`]
/// per registered column and drives them in lockstep.
///
/// On each step it pulls a synchronized window from every column's
/// batcher, applies that column's generator, and yields the aggregated
/// `(inputs, targets)` pair - each side a map from column name to that
/// column's formatted tensor.
///
/// # Example
/// ```ignore
/// let feeder = Feeder::from_single("sentence", Generator::Shift);
/// let corpus = HashMap::from([(
///     "sentence".to_string(),
///     EncodedColumn::from_flat(token_ids),
/// )]);
///
/// for (inputs, targets) in feeder.iterate(&corpus, 32, 64, 2, true)? {
///     let input = &inputs["sentence"];   // (64, 32)
///     let target = &targets["sentence"]; // (64, 32), shifted by one row
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Feeder {
    generators: HashMap<String, Generator>,
}

impl Feeder {
    /// Creates a feeder from a full column-to-generator map.
    pub fn new(generators: HashMap<String, Generator>) -> Self {
        Self { generators }
    }

    /// Creates a feeder with a single registered column.
    ///
    /// Chain with [`with_column`](Self::with_column) to add more.
    pub fn from_single(name: impl Into<String>, generator: Generator) -> Self {
        Self {
            generators: HashMap::from([(name.into(), generator)]),
        }
    }

    /// Registers (or replaces) a column's generator.
    pub fn with_column(mut self, name: impl Into<String>, generator: Generator) -> Self {
        self.generators.insert(name.into(), generator);
        self
    }

    /// Returns an iterator over the registered column names.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    /// Builds one batcher per registered column and returns the lazy
    /// lockstep step stream.
    ///
    /// The number of steps equals the minimum step count across all
    /// columns' batchers: columns of different lengths are truncated to
    /// the shortest so they stay index-aligned across epoch boundaries.
    /// A step is emitted only when complete for every column.
    ///
    /// # Errors
    /// - [`FeederError::MissingColumn`] if any registered column is
    ///   absent from `corpus`, before any step is yielded.
    /// - [`FeederError::Configuration`] if `batch_size` or
    ///   `sequence_length` is invalid for any column (see
    ///   [`SequenceBatcher::new`] and [`SequenceBatcher::produce`]).
    pub fn iterate(
        &self,
        corpus: &HashMap<String, EncodedColumn>,
        batch_size: usize,
        sequence_length: usize,
        epoch: usize,
        sequential: bool,
    ) -> Result<Feed> {
        let mut columns = Vec::with_capacity(self.generators.len());
        for (name, generator) in &self.generators {
            let column = corpus
                .get(name)
                .ok_or_else(|| FeederError::MissingColumn(name.clone()))?;
            let batcher = SequenceBatcher::new(column, batch_size)?;
            let windows = batcher.produce(sequence_length, epoch, sequential)?;
            columns.push(FeedColumn {
                name: name.clone(),
                windows,
                generator: *generator,
            });
        }
        Ok(Feed { columns })
    }
}

#[derive(Debug)]
struct FeedColumn {
    name: String,
    windows: Windows,
    generator: Generator,
}

/// Lazy lockstep step stream returned by [`Feeder::iterate`].
///
/// Ends as soon as any column's traversal is exhausted; no partial steps
/// are ever yielded.
#[derive(Debug)]
pub struct Feed {
    columns: Vec<FeedColumn>,
}

impl Iterator for Feed {
    type Item = (HashMap<String, Tensor>, HashMap<String, Tensor>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.columns.is_empty() {
            return None;
        }

        let mut inputs = HashMap::with_capacity(self.columns.len());
        let mut targets = HashMap::with_capacity(self.columns.len());
        for column in &mut self.columns {
            let step = column.windows.next()?;
            let (input, target) = column.generator.format(step);
            inputs.insert(column.name.clone(), input);
            targets.insert(column.name.clone(), target);
        }
        Some((inputs, targets))
    }
}

#[cfg(test)]
mod feeder_tests {
    use super::*;
    use anyhow::Result;

    fn single_column_corpus(tokens: Vec<i64>) -> HashMap<String, EncodedColumn> {
        HashMap::from([("sentence".to_string(), EncodedColumn::from_flat(tokens))])
    }

    #[test]
    fn test_missing_column_fails_before_any_step() {
        let feeder = Feeder::from_single("sentence", Generator::Shift)
            .with_column("labels", Generator::Shift);
        let corpus = single_column_corpus((0..20).collect());

        let err = feeder.iterate(&corpus, 2, 3, 1, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FeederError>(),
            Some(FeederError::MissingColumn(name)) if name == "labels"
        ));
    }

    #[test]
    fn test_configuration_error_surfaces_at_iterate() {
        let feeder = Feeder::from_single("sentence", Generator::Shift);
        let corpus = single_column_corpus((0..20).collect());

        // batch_size larger than the column's token count
        let err = feeder.iterate(&corpus, 21, 3, 1, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FeederError>(),
            Some(FeederError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_feeder_yields_no_steps() -> Result<()> {
        let feeder = Feeder::new(HashMap::new());
        let corpus = single_column_corpus((0..20).collect());
        assert_eq!(feeder.iterate(&corpus, 2, 3, 1, true)?.count(), 0);
        Ok(())
    }

    #[test]
    fn test_lockstep_truncates_to_shortest_column() -> Result<()> {
        // "long" alone would yield 6 steps per epoch, "short" only 3;
        // the lockstep stream must stop at 3.
        let corpus = HashMap::from([
            (
                "long".to_string(),
                EncodedColumn::from_flat((0..40).collect()),
            ),
            (
                "short".to_string(),
                EncodedColumn::from_flat((0..20).collect()),
            ),
        ]);
        let feeder = Feeder::from_single("long", Generator::Shift)
            .with_column("short", Generator::Shift);

        let steps: Vec<_> = feeder.iterate(&corpus, 2, 3, 1, true)?.collect();
        assert_eq!(steps.len(), 3);

        for (inputs, targets) in &steps {
            assert_eq!(inputs.len(), 2);
            assert_eq!(targets.len(), 2);
            assert_eq!(inputs["long"].size(), &[3, 2]);
            assert_eq!(inputs["short"].size(), &[3, 2]);
        }
        Ok(())
    }
}

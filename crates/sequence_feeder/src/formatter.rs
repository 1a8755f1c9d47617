use crate::batcher::WindowStep;
use tch::Tensor;

/// A `Generator` is the per-column policy that converts the raw
/// [`WindowStep`] emitted by a batcher into the `(input, target)` pair
/// presented to the feeder caller.
///
/// Generators are stateless pure functions of their inputs - no internal
/// buffering, nothing retained between steps. The variants form a closed
/// tagged set dispatched through the single [`format`](Self::format)
/// capability; extending the feeder with a new formatting policy means
/// adding a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    /// Shifted-target language modeling, for sequential traversals:
    /// passes the window and its one-row-shifted lookahead through
    /// unchanged, both `(sequence_length, batch_size)`.
    Shift,

    /// One-step-ahead prediction from a fixed-length context, for
    /// non-sequential traversals: transposes the window to lane-major
    /// `(batch_size, sequence_length)` and keeps the single trailing
    /// `(batch_size,)` row as the target.
    IdentityLastRow,
}

impl Generator {
    /// Derives the `(input, target)` pair for one step.
    pub fn format(&self, step: WindowStep) -> (Tensor, Tensor) {
        match self {
            Generator::Shift => (step.window, step.lookahead),
            Generator::IdentityLastRow => (step.window.transpose(0, 1), step.lookahead),
        }
    }
}

#[cfg(test)]
mod formatter_tests {
    use super::*;
    use crate::batcher::SequenceBatcher;
    use crate::column::EncodedColumn;
    use anyhow::Result;

    #[test]
    fn test_shift_passes_windows_through() -> Result<()> {
        let column = EncodedColumn::from_flat((0..20).collect());
        let batcher = SequenceBatcher::new(&column, 2)?;
        let step = batcher.produce(3, 1, true)?.next().unwrap();

        let (input, target) = Generator::Shift.format(step);
        let expected_input = Tensor::from_slice(&[0i64, 10, 1, 11, 2, 12]).reshape([3, 2]);
        let expected_target = Tensor::from_slice(&[1i64, 11, 2, 12, 3, 13]).reshape([3, 2]);
        assert!(input.equal(&expected_input));
        assert!(target.equal(&expected_target));
        Ok(())
    }

    #[test]
    fn test_identity_last_row_transposes_input() -> Result<()> {
        let column = EncodedColumn::from_flat((0..20).collect());
        let batcher = SequenceBatcher::new(&column, 2)?;
        let step = batcher.produce(3, 1, false)?.next().unwrap();

        let (input, target) = Generator::IdentityLastRow.format(step);

        // Input becomes lane-major: [[0, 1, 2], [10, 11, 12]]
        assert_eq!(input.size(), &[2, 3]);
        let expected_input = Tensor::from_slice(&[0i64, 1, 2, 10, 11, 12]).reshape([2, 3]);
        assert!(input.equal(&expected_input));

        // Target is the next-row vector [3, 13]
        let expected_target = Tensor::from_slice(&[3i64, 13]);
        assert!(target.equal(&expected_target));
        Ok(())
    }
}

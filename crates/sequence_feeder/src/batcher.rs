use crate::column::EncodedColumn;
use crate::error::FeederError;
use anyhow::Result;
use tch::Tensor;

/// A `SequenceBatcher` owns the lane matrix derived from one
/// [`EncodedColumn`] and exposes lazy, restartable traversals of
/// fixed-length windows over it.
///
/// # Lane matrix construction
/// Given the column's flat token stream of length `total_tokens` and a
/// `batch_size`:
/// 1. `lane_length = total_tokens / batch_size` (integer division)
/// 2. The stream is truncated to `lane_length * batch_size` tokens;
///    the tail beyond that point is dropped deterministically (never
///    sampled, never padded).
/// 3. The truncated stream is reshaped to `(batch_size, lane_length)`
///    and transposed to `(lane_length, batch_size)`, so row `i` holds
///    the `i`-th token of every lane.
///
/// The lane matrix is built once at construction and is read-only for
/// the rest of the batcher's life. Traversals only take `narrow` views
/// into it, so multiple traversals over the same batcher can coexist.
///
/// # Example
/// ```ignore
/// let column = EncodedColumn::from_flat((0..20).collect());
/// let batcher = SequenceBatcher::new(&column, 2)?;
/// assert_eq!(batcher.lane_length(), 10);
///
/// for step in batcher.produce(3, 1, true)? {
///     // step.window:    rows [i, i+3)   of the lane matrix
///     // step.lookahead: rows [i+1, i+4) - the shift-by-one target
/// }
/// ```
#[derive(Debug)]
pub struct SequenceBatcher {
    // (lane_length, batch_size), Kind::Int64, contiguous
    lanes: Tensor,
    lane_length: i64,
    batch_size: i64,
}

impl SequenceBatcher {
    /// Builds the lane matrix for `column` with the given `batch_size`.
    ///
    /// # Errors
    /// Returns [`FeederError::Configuration`] if `batch_size` is 0 or if
    /// the column holds fewer tokens than `batch_size` (not even one
    /// lane step can be formed).
    pub fn new(column: &EncodedColumn, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(FeederError::configuration("batch_size must be greater than 0").into());
        }

        let stream = column.flatten();
        let total_tokens = stream.len();
        if total_tokens < batch_size {
            return Err(FeederError::configuration(format!(
                "column holds {} tokens, fewer than batch_size {}: cannot form even one lane step",
                total_tokens, batch_size
            ))
            .into());
        }

        let lane_length = (total_tokens / batch_size) as i64;
        let batch_size = batch_size as i64;
        let truncated = (lane_length * batch_size) as usize;

        let lanes = Tensor::from_slice(&stream[..truncated])
            .reshape([batch_size, lane_length])
            .transpose(0, 1)
            .contiguous();

        Ok(Self {
            lanes,
            lane_length,
            batch_size,
        })
    }

    /// Number of time steps per lane.
    pub fn lane_length(&self) -> i64 {
        self.lane_length
    }

    /// Number of parallel lanes.
    pub fn batch_size(&self) -> i64 {
        self.batch_size
    }

    /// The `(lane_length, batch_size)` lane matrix itself.
    pub fn lane_matrix(&self) -> &Tensor {
        &self.lanes
    }

    /// Number of windows a single epoch yields for `sequence_length`.
    ///
    /// Windows start at rows `0, s, 2s, ...` and a start is valid only
    /// while `sequence_length + 1` rows remain (the `+1` reserves the
    /// row needed for a one-step-ahead target), so the count is
    /// `floor((lane_length - 1) / sequence_length)`.
    pub fn steps_per_epoch(&self, sequence_length: usize) -> Result<usize> {
        self.validate_sequence_length(sequence_length)?;
        Ok(((self.lane_length - 1) / sequence_length as i64) as usize)
    }

    /// Returns a lazy, finite traversal of windows over the lane matrix.
    ///
    /// For each of `epoch` repetitions, windows of exactly
    /// `sequence_length` rows are yielded starting at row 0, advancing
    /// by `sequence_length` per step, and stopping once fewer than
    /// `sequence_length + 1` rows remain; partial trailing windows are
    /// dropped, not padded. Epoch boundaries are transparent: the caller
    /// sees one continuous sequence of steps, each epoch an identical
    /// repetition of the first (no reshuffling).
    ///
    /// Each [`WindowStep`] carries the window plus a lookahead:
    /// - `sequential = true`: the same-shape window offset by one row
    ///   (the classic shifted target).
    /// - `sequential = false`: the single row immediately following the
    ///   window, as a `(batch_size,)` vector.
    ///
    /// The traversal is restartable: a fresh `produce` call re-derives a
    /// fresh traversal from row 0, it never resumes mid-stream.
    ///
    /// # Errors
    /// Returns [`FeederError::Configuration`] if `sequence_length` is 0
    /// or is not strictly smaller than the lane length.
    pub fn produce(&self, sequence_length: usize, epoch: usize, sequential: bool) -> Result<Windows> {
        self.validate_sequence_length(sequence_length)?;
        Ok(Windows {
            lanes: self.lanes.shallow_clone(),
            lane_length: self.lane_length,
            sequence_length: sequence_length as i64,
            sequential,
            next_start: 0,
            epochs_remaining: epoch,
        })
    }

    fn validate_sequence_length(&self, sequence_length: usize) -> Result<()> {
        if sequence_length == 0 {
            return Err(
                FeederError::configuration("sequence_length must be greater than 0").into(),
            );
        }
        if sequence_length as i64 >= self.lane_length {
            return Err(FeederError::configuration(format!(
                "sequence_length {} must be smaller than lane length {}: no valid window can be formed",
                sequence_length, self.lane_length
            ))
            .into());
        }
        Ok(())
    }
}

/// One step of a traversal: a time-major window plus its lookahead.
#[derive(Debug)]
pub struct WindowStep {
    /// `(sequence_length, batch_size)` slice of the lane matrix.
    pub window: Tensor,
    /// Sequential mode: the window shifted down by one row, same shape.
    /// Non-sequential mode: the single `(batch_size,)` row following the
    /// window.
    pub lookahead: Tensor,
}

/// Lazy window traversal returned by [`SequenceBatcher::produce`].
///
/// Holds an explicit cursor (`next_start`, `epochs_remaining`) rather
/// than hidden coroutine state; windows are computed on demand as
/// zero-copy views into the shared lane matrix.
#[derive(Debug)]
pub struct Windows {
    lanes: Tensor,
    lane_length: i64,
    sequence_length: i64,
    sequential: bool,
    next_start: i64,
    epochs_remaining: usize,
}

impl Iterator for Windows {
    type Item = WindowStep;

    fn next(&mut self) -> Option<WindowStep> {
        loop {
            if self.epochs_remaining == 0 {
                return None;
            }

            // A start is valid only while the window plus one lookahead
            // row still fits inside the lane matrix.
            if self.next_start + self.sequence_length < self.lane_length {
                let window = self.lanes.narrow(0, self.next_start, self.sequence_length);
                let lookahead = if self.sequential {
                    self.lanes
                        .narrow(0, self.next_start + 1, self.sequence_length)
                } else {
                    self.lanes.get(self.next_start + self.sequence_length)
                };
                self.next_start += self.sequence_length;
                return Some(WindowStep { window, lookahead });
            }

            self.epochs_remaining -= 1;
            self.next_start = 0;
        }
    }
}

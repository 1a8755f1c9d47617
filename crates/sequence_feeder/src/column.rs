use anyhow::Result;
use tch::{Kind, Tensor};

/// An `EncodedColumn` holds one column of integer-encoded text: a logical
/// 2D array where rows are documents and columns are token positions.
///
/// Rows may be ragged - documents rarely share a length - so the column
/// stores them as individual token-id vectors and concatenates them in
/// row order when a [`SequenceBatcher`](crate::batcher::SequenceBatcher)
/// asks for the flat stream.
///
/// The column is owned by the caller and only ever read by the core; the
/// lane matrix derived from it is the only allocation the batcher makes.
///
/// # Construction
/// ```ignore
/// // Ragged per-document rows (the usual case after tokenization)
/// let column = EncodedColumn::from_rows(vec![vec![1, 2, 3], vec![4, 5]]);
///
/// // An already-flat stream, treated as a single row
/// let column = EncodedColumn::from_flat((0..20).collect());
///
/// // A 2D tensor of token ids
/// let column = EncodedColumn::try_from(&tensor)?;
/// ```
#[derive(Debug, Clone)]
pub struct EncodedColumn {
    rows: Vec<Vec<i64>>,
}

impl EncodedColumn {
    /// Creates a column from per-document token-id rows.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Self {
        Self { rows }
    }

    /// Creates a column from an already-flat token stream (one row).
    pub fn from_flat(tokens: Vec<i64>) -> Self {
        Self { rows: vec![tokens] }
    }

    /// Returns the number of document rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the total number of tokens across all rows.
    pub fn total_tokens(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }

    /// Concatenates all rows into a single flat stream, in row order.
    pub fn flatten(&self) -> Vec<i64> {
        let mut stream = Vec::with_capacity(self.total_tokens());
        for row in &self.rows {
            stream.extend_from_slice(row);
        }
        stream
    }
}

impl From<Vec<Vec<i64>>> for EncodedColumn {
    fn from(rows: Vec<Vec<i64>>) -> Self {
        Self::from_rows(rows)
    }
}

impl From<Vec<i64>> for EncodedColumn {
    fn from(tokens: Vec<i64>) -> Self {
        Self::from_flat(tokens)
    }
}

/// Converts a 2D tensor of token ids into an `EncodedColumn`, one row
/// per tensor row. Fails if the tensor is not 2-dimensional.
impl TryFrom<&Tensor> for EncodedColumn {
    type Error = anyhow::Error;

    fn try_from(tensor: &Tensor) -> Result<Self> {
        let (_num_rows, row_length) = tensor.size2()?;
        let flat = tensor.to_kind(Kind::Int64).reshape(-1);
        let tokens = Vec::<i64>::try_from(&flat)?;
        let rows = tokens
            .chunks(row_length.max(1) as usize)
            .map(|row| row.to_vec())
            .collect();
        Ok(Self { rows })
    }
}

//! # sequence_feeder
//!
//! Converts variable-length tokenized text columns into fixed-shape,
//! time-major mini-batches for sequence-model training.
//!
//! The crate sits after tokenization and vocabulary lookup: it consumes
//! columns of integer token ids and owns only the flatten-reshape-window
//! step of the pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!                ┌───────────────┐
//!                │ EncodedColumn │ (caller-owned token ids, per column)
//!                └───────┬───────┘
//!                        │ flatten rows, truncate, reshape
//!                        ↓
//!               ┌─────────────────┐
//!               │ SequenceBatcher │ owns the (lane_length, batch_size)
//!               └────────┬────────┘ lane matrix, built once
//!                        │ lazy fixed-length windows
//!                        ↓
//!                  ┌───────────┐
//!                  │ Generator │ per-column (input, target) policy
//!                  └─────┬─────┘
//!                        │ formatted tensors
//!                        ↓
//!                   ┌────────┐
//!                   │ Feeder │ drives all columns in lockstep
//!                   └────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sequence_feeder::{EncodedColumn, Feeder, Generator};
//! use std::collections::HashMap;
//!
//! let corpus = HashMap::from([(
//!     "sentence".to_string(),
//!     EncodedColumn::from_rows(token_id_rows),
//! )]);
//! let feeder = Feeder::from_single("sentence", Generator::Shift);
//!
//! for (inputs, targets) in feeder.iterate(&corpus, 32, 64, 2, true)? {
//!     // inputs["sentence"]:  (64, 32) time-major window
//!     // targets["sentence"]: the same window shifted by one row
//! }
//! ```
//!
//! Everything is single-threaded and pull-based: each step is computed
//! on demand, and stopping consumption early is safe at any point.

pub mod batcher;
pub mod column;
pub mod error;
pub mod feeder;
pub mod formatter;

pub use batcher::{SequenceBatcher, WindowStep, Windows};
pub use column::EncodedColumn;
pub use error::FeederError;
pub use feeder::{Feed, Feeder};
pub use formatter::Generator;

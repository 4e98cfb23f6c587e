//! Storage module for persisting accumulated results.
//!
//! Histograms are checkpointed as JSON files so that long runs leave usable
//! partial results behind.

pub mod checkpoint;

pub use checkpoint::{Checkpoint, DEFAULT_CHECKPOINT_INTERVAL, histogram_file_name, histogram_whole_file_name};

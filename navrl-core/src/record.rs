//! Types and traits for recording per-step metrics.
//!
//! A [`Record`] is a container of key-value pairs produced during training
//! and evaluation, e.g. rewards, episode counters or textual diagnostics.
//! [`Recorder`] is the interface through which records are written out;
//! [`BufferedRecorder`] keeps them in memory for inspection (useful in
//! evaluation and tests) while [`NullRecorder`] discards everything.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;

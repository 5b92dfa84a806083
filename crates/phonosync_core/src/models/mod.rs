//! Data models shared by the alignment core and its callers.
//!
//! - Caption entries and tracks as produced by the upstream normalizer
//! - Correspondence pairs and the alignment result sum type

mod entry;
mod result;

pub use entry::{apply_offset, Entry, EntryId, Track};
pub use result::{AlignmentResult, CorrespondencePair, FailureReason, ResultRecordError};

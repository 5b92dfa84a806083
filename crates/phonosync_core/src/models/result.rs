//! Alignment result types and their wire format.
//!
//! On the wire a result is a flat record:
//! - success: `{"status": "success", "offset_seconds", "confidence", "alignment_path"?}`
//! - failure: `{"status": "failure", "reason", "offset_seconds": null}`

use serde::{Deserialize, Serialize};

/// Entry `i` of track 1 corresponds to entry `j` of track 2.
///
/// Serialized as a two-element array `[i, j]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct CorrespondencePair {
    pub i: usize,
    pub j: usize,
}

impl CorrespondencePair {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

impl From<(usize, usize)> for CorrespondencePair {
    fn from((i, j): (usize, usize)) -> Self {
        Self { i, j }
    }
}

impl From<CorrespondencePair> for (usize, usize) {
    fn from(pair: CorrespondencePair) -> Self {
        (pair.i, pair.j)
    }
}

/// Why an alignment was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// One or both tracks are empty.
    #[serde(rename = "insufficient data")]
    InsufficientData,
    /// Track data cannot be aligned (non-finite timestamps).
    #[serde(rename = "invalid input")]
    InvalidInput,
    /// No pair inside the search window reached the similarity threshold.
    #[serde(rename = "no anchor found")]
    NoAnchorFound,
    /// The walk ended before reaching the minimum path length.
    #[serde(rename = "path too short")]
    PathTooShort,
    /// Per-pair offsets disagree beyond the dispersion threshold.
    #[serde(rename = "offset inconsistent")]
    OffsetInconsistent,
}

impl FailureReason {
    /// Wire string for this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::InsufficientData => "insufficient data",
            FailureReason::InvalidInput => "invalid input",
            FailureReason::NoAnchorFound => "no anchor found",
            FailureReason::PathTooShort => "path too short",
            FailureReason::OffsetInconsistent => "offset inconsistent",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of aligning two tracks.
///
/// A failure never carries an offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "AlignmentResultRecord", try_from = "AlignmentResultRecord")]
pub enum AlignmentResult {
    Success {
        /// Seconds to add to track 1 times to land on track 2.
        offset_seconds: f64,
        /// Quality estimate in `[0, 1]`.
        confidence: f64,
        /// Accepted correspondences, monotonic in both indices.
        alignment_path: Vec<CorrespondencePair>,
    },
    Failure {
        reason: FailureReason,
    },
}

impl AlignmentResult {
    /// Create a failed result.
    pub fn failure(reason: FailureReason) -> Self {
        Self::Failure { reason }
    }

    /// Check if the alignment succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The offset, only present on success.
    pub fn offset_seconds(&self) -> Option<f64> {
        match self {
            Self::Success { offset_seconds, .. } => Some(*offset_seconds),
            Self::Failure { .. } => None,
        }
    }

    /// The confidence, only present on success.
    pub fn confidence(&self) -> Option<f64> {
        match self {
            Self::Success { confidence, .. } => Some(*confidence),
            Self::Failure { .. } => None,
        }
    }

    /// The failure reason, only present on failure.
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason } => Some(*reason),
        }
    }

    /// The alignment path (empty on failure).
    pub fn alignment_path(&self) -> &[CorrespondencePair] {
        match self {
            Self::Success { alignment_path, .. } => alignment_path,
            Self::Failure { .. } => &[],
        }
    }

    /// Drop the path so it is omitted from the serialized record.
    pub fn without_path(self) -> Self {
        match self {
            Self::Success {
                offset_seconds,
                confidence,
                ..
            } => Self::Success {
                offset_seconds,
                confidence,
                alignment_path: Vec::new(),
            },
            failure => failure,
        }
    }
}

/// Error converting a wire record back into an [`AlignmentResult`].
#[derive(Debug, thiserror::Error)]
pub enum ResultRecordError {
    /// A success record lacks a required field.
    #[error("success record is missing '{0}'")]
    MissingField(&'static str),

    /// A failure record has no reason.
    #[error("failure record is missing a reason")]
    MissingReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ResultStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AlignmentResultRecord {
    status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<FailureReason>,
    #[serde(default)]
    offset_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alignment_path: Option<Vec<CorrespondencePair>>,
}

impl From<AlignmentResult> for AlignmentResultRecord {
    fn from(result: AlignmentResult) -> Self {
        match result {
            AlignmentResult::Success {
                offset_seconds,
                confidence,
                alignment_path,
            } => Self {
                status: ResultStatus::Success,
                reason: None,
                offset_seconds: Some(offset_seconds),
                confidence: Some(confidence),
                alignment_path: if alignment_path.is_empty() {
                    None
                } else {
                    Some(alignment_path)
                },
            },
            AlignmentResult::Failure { reason } => Self {
                status: ResultStatus::Failure,
                reason: Some(reason),
                offset_seconds: None,
                confidence: None,
                alignment_path: None,
            },
        }
    }
}

impl TryFrom<AlignmentResultRecord> for AlignmentResult {
    type Error = ResultRecordError;

    fn try_from(record: AlignmentResultRecord) -> Result<Self, Self::Error> {
        match record.status {
            ResultStatus::Success => Ok(Self::Success {
                offset_seconds: record
                    .offset_seconds
                    .ok_or(ResultRecordError::MissingField("offset_seconds"))?,
                confidence: record
                    .confidence
                    .ok_or(ResultRecordError::MissingField("confidence"))?,
                alignment_path: record.alignment_path.unwrap_or_default(),
            }),
            ResultStatus::Failure => Ok(Self::Failure {
                reason: record.reason.ok_or(ResultRecordError::MissingReason)?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_serializes_null_offset() {
        let result = AlignmentResult::failure(FailureReason::NoAnchorFound);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(
            value,
            json!({"status": "failure", "reason": "no anchor found", "offset_seconds": null})
        );
    }

    #[test]
    fn success_serializes_path_as_pairs() {
        let result = AlignmentResult::Success {
            offset_seconds: 5.0,
            confidence: 0.9,
            alignment_path: vec![CorrespondencePair::new(0, 1), CorrespondencePair::new(1, 2)],
        };
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["offset_seconds"], 5.0);
        assert_eq!(value["alignment_path"], json!([[0, 1], [1, 2]]));
        assert!(value.get("reason").is_none());
    }

    #[test]
    fn without_path_omits_the_field() {
        let result = AlignmentResult::Success {
            offset_seconds: -1.5,
            confidence: 0.75,
            alignment_path: vec![CorrespondencePair::new(3, 3)],
        }
        .without_path();
        let value = serde_json::to_value(&result).unwrap();

        assert!(value.get("alignment_path").is_none());
        assert_eq!(value["confidence"], 0.75);
    }

    #[test]
    fn record_parses_back_into_result() {
        let parsed: AlignmentResult = serde_json::from_value(json!({
            "status": "success",
            "offset_seconds": 2.0,
            "confidence": 0.8,
            "alignment_path": [[0, 0], [1, 1]]
        }))
        .unwrap();
        assert_eq!(parsed.alignment_path().len(), 2);
        assert_eq!(parsed.offset_seconds(), Some(2.0));

        let failed: AlignmentResult = serde_json::from_value(json!({
            "status": "failure",
            "reason": "path too short",
            "offset_seconds": null
        }))
        .unwrap();
        assert_eq!(failed.reason(), Some(FailureReason::PathTooShort));
        assert_eq!(failed.offset_seconds(), None);
    }

    #[test]
    fn success_record_without_offset_is_rejected() {
        let parsed: Result<AlignmentResult, _> =
            serde_json::from_value(json!({"status": "success", "confidence": 0.5}));
        assert!(parsed.is_err());
    }

    #[test]
    fn reason_display_matches_wire_string() {
        for reason in [
            FailureReason::InsufficientData,
            FailureReason::InvalidInput,
            FailureReason::NoAnchorFound,
            FailureReason::PathTooShort,
            FailureReason::OffsetInconsistent,
        ] {
            let wire = serde_json::to_value(reason).unwrap();
            assert_eq!(wire, json!(reason.to_string()));
        }
    }
}

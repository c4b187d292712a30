//! Graph upload session resource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UploadError;

/// A server-allocated resumable upload context for one attachment
///
/// Returned by `createUploadSession`. Only one uploader may write to a
/// session at a time; the server tracks a single contiguous write cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    /// Pre-authenticated URL that receives the chunk PUTs
    pub upload_url: String,
    #[serde(default)]
    pub expiration_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_expected_ranges: Vec<String>,
    /// Size declared when the session was created (not sent by the server)
    #[serde(skip)]
    pub total_size: u64,
}

impl UploadSession {
    /// Session for an already known upload URL
    pub fn new(upload_url: impl Into<String>, total_size: u64) -> Self {
        Self {
            upload_url: upload_url.into(),
            expiration_date_time: None,
            next_expected_ranges: Vec::new(),
            total_size,
        }
    }

    /// Whether the session expiry has passed
    pub fn is_expired(&self) -> bool {
        self.expiration_date_time
            .is_some_and(|expires| expires <= Utc::now())
    }

    /// Parse and validate the upload URL
    pub(crate) fn validated_url(&self) -> Result<&str, UploadError> {
        let url = self.upload_url.trim();
        if url.is_empty() {
            return Err(UploadError::InvalidSession("upload URL is empty".to_string()));
        }
        url::Url::parse(url)
            .map_err(|e| UploadError::InvalidSession(format!("upload URL is invalid: {}", e)))?;
        Ok(url)
    }
}

/// One entry of a `nextExpectedRanges` array
///
/// Graph sends strings like `"4194304-"` or `"4194304-8388607"`; some
/// servers send bare integers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpectedRange {
    Offset(u64),
    Range(String),
}

impl ExpectedRange {
    fn start(&self) -> Option<u64> {
        match self {
            Self::Offset(offset) => Some(*offset),
            Self::Range(range) => range.split('-').next()?.trim().parse().ok(),
        }
    }
}

/// Continuation body returned for accepted, non-final chunks
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContinuationBody {
    next_expected_ranges: Vec<ExpectedRange>,
}

/// Start offset of the first `nextExpectedRanges` entry in a response body
///
/// Returns `None` when the body is not JSON, the field is missing or empty,
/// or the first entry has no parsable start.
pub(crate) fn next_expected_offset(body: &[u8]) -> Option<u64> {
    let parsed: ContinuationBody = serde_json::from_slice(body).ok()?;
    parsed.next_expected_ranges.first()?.start()
}

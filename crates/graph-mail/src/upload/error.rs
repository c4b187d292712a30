//! Upload error taxonomy

use std::io;

/// Longest response body kept on an error for diagnostics
const BODY_SNIPPET_LEN: usize = 512;

/// Errors produced by the attachment size gate and the chunked upload loop
///
/// Every variant is terminal: the upload is aborted and nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Attachment is small enough that it must be sent inline instead
    #[error("attachment of {size} bytes is too small for an upload session (must exceed {min} bytes)", min = super::MIN_UPLOAD_SESSION_SIZE)]
    AttachmentTooSmallForSession { size: u64 },

    /// Attachment is too large to be embedded in the message body
    #[error("attachment of {size} bytes is too large to send inline (limit {max} bytes)", max = super::MIN_UPLOAD_SESSION_SIZE)]
    AttachmentTooLargeForInline { size: u64 },

    /// Source could not be opened or read, or its size is zero/unknown
    #[error("attachment is unreadable: {reason}")]
    AttachmentUnreadable {
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// Single-request upload answered with something other than 201
    #[error("upload rejected with status {status}: {body}")]
    RejectedChunk { status: u16, body: String },

    /// Continuation response was neither 201 nor usable `nextExpectedRanges` JSON
    #[error("malformed upload session response (status {status}): {body}")]
    MalformedServerResponse { status: u16, body: String },

    /// Server asked to resume before the oldest byte still held in memory
    #[error("server expects offset {expected} but the source cannot rewind before {earliest}")]
    ResumeOutOfRange { expected: u64, earliest: u64 },

    /// Upload session is unusable (empty or invalid upload URL)
    #[error("invalid upload session: {0}")]
    InvalidSession(String),

    #[error("upload cancelled at offset {offset}")]
    Cancelled { offset: u64 },

    #[error("upload deadline exceeded at offset {offset}")]
    DeadlineExceeded { offset: u64 },

    /// Failure in the HTTP transport or the Graph request layer
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl UploadError {
    pub(crate) fn unreadable(reason: impl Into<String>, source: io::Error) -> Self {
        Self::AttachmentUnreadable {
            reason: reason.into(),
            source: Some(source),
        }
    }

    pub(crate) fn rejected(status: u16, body: &[u8]) -> Self {
        Self::RejectedChunk {
            status,
            body: body_snippet(body),
        }
    }

    pub(crate) fn malformed(status: u16, body: &[u8]) -> Self {
        Self::MalformedServerResponse {
            status,
            body: body_snippet(body),
        }
    }

    /// HTTP status attached to this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RejectedChunk { status, .. } | Self::MalformedServerResponse { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Lossy UTF-8 rendering of a response body, truncated on a char boundary
pub(crate) fn body_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= BODY_SNIPPET_LEN {
        return text.into_owned();
    }
    let mut end = BODY_SNIPPET_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_snippet_short_body_untouched() {
        assert_eq!(body_snippet(b"{\"error\":\"bad\"}"), "{\"error\":\"bad\"}");
    }

    #[test]
    fn test_body_snippet_truncates_long_body() {
        let body = vec![b'x'; 2000];
        let snippet = body_snippet(&body);
        assert_eq!(snippet.len(), BODY_SNIPPET_LEN + 3);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_body_snippet_respects_char_boundary() {
        // 'é' is two bytes; 511 ASCII bytes puts a boundary mid-character at 512
        let mut body = vec![b'a'; BODY_SNIPPET_LEN - 1];
        body.extend("éééé".as_bytes());
        let snippet = body_snippet(&body);
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.len(), BODY_SNIPPET_LEN - 1 + 3);
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(UploadError::rejected(500, b"oops").status(), Some(500));
        assert_eq!(UploadError::malformed(200, b"").status(), Some(200));
        assert_eq!(UploadError::Cancelled { offset: 0 }.status(), None);
    }

    #[test]
    fn test_too_small_message_mentions_threshold() {
        let err = UploadError::AttachmentTooSmallForSession { size: 10 };
        assert!(err.to_string().contains("3145728"));
    }
}

//! Large attachment uploads through Graph upload sessions
//!
//! This module provides:
//! - The attachment size gate deciding between inline and session uploads
//! - `ChunkedUploader`, which streams bytes to an upload session
//! - The `UploadTransport` seam over HTTP and a ureq implementation

mod error;
mod observer;
mod range;
mod session;
mod source;
mod transport;
mod uploader;

pub use error::UploadError;
pub(crate) use error::body_snippet;
pub use observer::{LogObserver, UploadObserver};
pub use range::UploadRange;
pub use session::UploadSession;
pub use source::UploadSource;
pub use transport::{TransportRequest, TransportResponse, UploadTransport, UreqTransport};
pub use uploader::{ChunkedUploader, UploadOptions, UploadReport};

/// Attachments at or below this size (3 MiB) must be sent inline
pub const MIN_UPLOAD_SESSION_SIZE: u64 = 3_145_728;

/// Largest body sent in a single upload PUT (4 MiB)
pub const UPLOAD_CHUNK_SIZE: usize = 4_194_304;

/// Check that an attachment of `size` bytes may use an upload session
///
/// # Errors
/// - `AttachmentUnreadable` for a zero size
/// - `AttachmentTooSmallForSession` at or below `MIN_UPLOAD_SESSION_SIZE`
pub fn check_session_size(size: u64) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::AttachmentUnreadable {
            reason: "attachment size is zero or unknown".to_string(),
            source: None,
        });
    }
    if size <= MIN_UPLOAD_SESSION_SIZE {
        return Err(UploadError::AttachmentTooSmallForSession { size });
    }
    Ok(())
}

/// Check that an attachment of `size` bytes may be embedded in a message
pub fn check_inline_size(size: u64) -> Result<(), UploadError> {
    if size > MIN_UPLOAD_SESSION_SIZE {
        return Err(UploadError::AttachmentTooLargeForInline { size });
    }
    Ok(())
}

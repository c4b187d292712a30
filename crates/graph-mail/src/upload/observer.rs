//! Hooks for watching an upload progress

use log::{debug, info, warn};

use super::{UploadRange, UploadReport};

/// Receives upload events as they happen
///
/// Callbacks run on the uploading thread between requests, so they should
/// return quickly. All methods default to doing nothing.
pub trait UploadObserver: Send + Sync {
    /// A chunk was sent and answered with `status`
    fn on_chunk_sent(&self, _range: &UploadRange, _status: u16) {}

    /// The server asked to continue from `expected` instead of `local`
    fn on_resync(&self, _expected: u64, _local: u64) {}

    /// The upload finished successfully
    fn on_complete(&self, _report: &UploadReport) {}
}

/// Observer that writes upload events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl UploadObserver for LogObserver {
    fn on_chunk_sent(&self, range: &UploadRange, status: u16) {
        debug!("[UPLOAD] {} -> {}", range, status);
    }

    fn on_resync(&self, expected: u64, local: u64) {
        warn!(
            "[UPLOAD] Server expects offset {} (local cursor at {}), resynchronizing",
            expected, local
        );
    }

    fn on_complete(&self, report: &UploadReport) {
        if report.completed_by_server {
            info!(
                "[UPLOAD] Completed: {} bytes in {} request(s)",
                report.bytes_sent, report.chunks_sent
            );
        } else {
            warn!(
                "[UPLOAD] All {} bytes sent in {} request(s) but server never answered 201",
                report.bytes_sent, report.chunks_sent
            );
        }
    }
}

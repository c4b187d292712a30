//! Chunked upload loop
//!
//! Streams an attachment to an upload session in strictly ordered,
//! range-bounded PUT requests. Each chunk's start offset depends on the
//! previous response, so chunks are never sent concurrently.

use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;
use ureq::http::Method;

use super::observer::{LogObserver, UploadObserver};
use super::session::next_expected_offset;
use super::transport::{TransportRequest, TransportResponse, UploadTransport};
use super::{UPLOAD_CHUNK_SIZE, UploadError, UploadRange, UploadSession, UploadSource};

/// Status the upload endpoint returns once the whole attachment is stored
const STATUS_CREATED: u16 = 201;

/// Tuning and interruption controls for one upload
///
/// Fields are only reachable through the builder methods, so the chunk size
/// always stays within `1..=UPLOAD_CHUNK_SIZE`.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    chunk_size: usize,
    /// Checked between chunks, never while a request is in flight
    cancel: Option<CancellationToken>,
    /// End-to-end deadline, checked between chunks
    deadline: Option<Instant>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            chunk_size: UPLOAD_CHUNK_SIZE,
            cancel: None,
            deadline: None,
        }
    }
}

impl UploadOptions {
    /// Override the chunk size, clamped to `1..=UPLOAD_CHUNK_SIZE`
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, UPLOAD_CHUNK_SIZE);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Bytes per PUT
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Summary of a finished upload
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Number of PUT requests issued
    pub chunks_sent: usize,
    /// Body bytes sent across all requests (resent bytes count twice)
    pub bytes_sent: u64,
    /// False when the source ran out without the server answering 201
    pub completed_by_server: bool,
}

/// Drives an attachment's bytes into a pre-created upload session
///
/// Holds no state between uploads, so a failed upload can be retried from
/// scratch with a fresh source. Callers must not run two uploads against the
/// same session concurrently.
pub struct ChunkedUploader {
    transport: Arc<dyn UploadTransport>,
    observer: Arc<dyn UploadObserver>,
    options: UploadOptions,
}

impl ChunkedUploader {
    /// Create an uploader that logs progress through `LogObserver`
    pub fn new(transport: Arc<dyn UploadTransport>) -> Self {
        Self {
            transport,
            observer: Arc::new(LogObserver),
            options: UploadOptions::default(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_options(mut self, options: UploadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// Upload `source` to `session`
    ///
    /// Sources that fit in one chunk go out as a single PUT that must be
    /// answered with 201. Larger sources are sent chunk by chunk; a 201 ends
    /// the upload immediately, any other answer must carry
    /// `nextExpectedRanges`, whose first entry becomes the next start offset.
    ///
    /// # Errors
    /// - `InvalidSession` if the upload URL is empty or unparsable
    /// - `AttachmentUnreadable` if the source is empty or cannot be read
    /// - `RejectedChunk` if a single-PUT upload is not answered with 201
    /// - `MalformedServerResponse` if a continuation response is unusable or
    ///   asks for the chunk that was just sent
    /// - `ResumeOutOfRange` if the server rewinds past the buffered chunk
    /// - `Cancelled` / `DeadlineExceeded` when interrupted between chunks
    pub fn upload<R: Read>(
        &self,
        session: &UploadSession,
        mut source: UploadSource<R>,
    ) -> Result<UploadReport, UploadError> {
        let url = session.validated_url()?;
        let total = source.len();

        if total == 0 {
            return Err(UploadError::AttachmentUnreadable {
                reason: format!("{} is empty", source.name()),
                source: None,
            });
        }

        if session.total_size != 0 && session.total_size != total {
            warn!(
                "[UPLOAD] Session declared {} bytes but source has {}; server will likely reject",
                session.total_size, total
            );
        }

        info!(
            "[UPLOAD] Uploading {} ({} bytes, chunk size {})",
            source.name(),
            total,
            self.options.chunk_size
        );

        let report = if total <= self.options.chunk_size as u64 {
            self.upload_single(url, &mut source)?
        } else {
            self.upload_chunked(url, &mut source)?
        };

        self.observer.on_complete(&report);
        Ok(report)
    }

    /// Whole attachment in one request; only a 201 counts as success
    fn upload_single<R: Read>(
        &self,
        url: &str,
        source: &mut UploadSource<R>,
    ) -> Result<UploadReport, UploadError> {
        self.check_interrupted(0)?;

        let total = source.len();
        let mut body = vec![0u8; total as usize];
        source.read_chunk(&mut body, 0)?;

        let range = chunk_range(0, total, total)?;
        let response = self.put(url, &range, &body)?;
        self.observer.on_chunk_sent(&range, response.status);

        if response.status != STATUS_CREATED {
            return Err(UploadError::rejected(response.status, &response.body));
        }

        Ok(UploadReport {
            chunks_sent: 1,
            bytes_sent: total,
            completed_by_server: true,
        })
    }

    /// Chunk loop driven by the server's `nextExpectedRanges`
    fn upload_chunked<R: Read>(
        &self,
        url: &str,
        source: &mut UploadSource<R>,
    ) -> Result<UploadReport, UploadError> {
        let total = source.len();
        let chunk_size = self.options.chunk_size as u64;
        let mut report = UploadReport::default();

        // Start of the next chunk to send, as dictated by the server
        let mut offset: u64 = 0;
        // Bytes consumed from the source so far
        let mut read_pos: u64 = 0;
        // Unacknowledged tail of the last chunk: bytes [offset, read_pos)
        let mut carry: Vec<u8> = Vec::new();

        while offset < total {
            self.check_interrupted(offset)?;

            let len = chunk_size.min(total - offset);
            let mut chunk = std::mem::take(&mut carry);
            let carried = chunk.len();
            chunk.resize(len as usize, 0);
            source.read_chunk(&mut chunk[carried..], read_pos)?;
            read_pos += len - carried as u64;

            let range = chunk_range(offset, len, total)?;
            let response = self.put(url, &range, &chunk)?;
            report.chunks_sent += 1;
            report.bytes_sent += len;
            self.observer.on_chunk_sent(&range, response.status);

            if response.status == STATUS_CREATED {
                report.completed_by_server = true;
                return Ok(report);
            }

            let next = match next_expected_offset(&response.body) {
                Some(next) if next <= total => next,
                _ => return Err(UploadError::malformed(response.status, &response.body)),
            };

            if next < offset {
                return Err(UploadError::ResumeOutOfRange {
                    expected: next,
                    earliest: offset,
                });
            }
            // Continuing from the chunk start would resend the same bytes
            // without end
            if next == offset {
                return Err(UploadError::malformed(response.status, &response.body));
            }

            if next != range.next_offset() {
                self.observer.on_resync(next, range.next_offset());
            }

            if next >= read_pos {
                source.skip(next - read_pos, read_pos)?;
                read_pos = next;
            } else {
                carry = chunk.split_off((next - offset) as usize);
            }

            offset = next;
        }

        debug!("[UPLOAD] Source exhausted after {} chunk(s)", report.chunks_sent);
        Ok(report)
    }

    fn put(
        &self,
        url: &str,
        range: &UploadRange,
        body: &[u8],
    ) -> Result<TransportResponse, UploadError> {
        let request = TransportRequest {
            method: Method::PUT,
            url,
            headers: vec![
                ("Content-Type", "application/octet-stream".to_string()),
                ("Content-Length", body.len().to_string()),
                ("Content-Range", range.header_value()),
            ],
            body,
        };
        Ok(self.transport.send(&request)?)
    }

    fn check_interrupted(&self, offset: u64) -> Result<(), UploadError> {
        if self
            .options
            .cancel
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
        {
            return Err(UploadError::Cancelled { offset });
        }
        if self
            .options
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            return Err(UploadError::DeadlineExceeded { offset });
        }
        Ok(())
    }
}

fn chunk_range(start: u64, len: u64, total: u64) -> Result<UploadRange, UploadError> {
    UploadRange::for_chunk(start, len, total).ok_or_else(|| UploadError::AttachmentUnreadable {
        reason: format!("invalid chunk {}+{} of {}", start, len, total),
        source: None,
    })
}

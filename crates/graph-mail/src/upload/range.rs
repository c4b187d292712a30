//! Byte ranges sent in `Content-Range` headers

use std::fmt;

/// Inclusive byte span of one chunk out of the whole attachment
///
/// Always satisfies `start <= end < total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl UploadRange {
    /// Range covering `len` bytes starting at `start`
    ///
    /// Returns `None` for an empty chunk or one that would run past `total`.
    pub fn for_chunk(start: u64, len: u64, total: u64) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let end = start.checked_add(len - 1)?;
        if end >= total {
            return None;
        }
        Some(Self { start, end, total })
    }

    /// Number of bytes in the range
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Offset just past this range
    pub fn next_offset(&self) -> u64 {
        self.end + 1
    }

    /// Value for the `Content-Range` header
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UploadRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

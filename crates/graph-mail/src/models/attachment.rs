//! Inline file attachments

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::upload::{UploadError, check_inline_size};

/// Graph `fileAttachment` carried inside a message body
///
/// Limited to `MIN_UPLOAD_SESSION_SIZE` bytes; anything larger goes through
/// an upload session instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    #[serde(rename = "@odata.type")]
    odata_type: String,
    name: String,
    content_type: String,
    size: u64,
    /// Base64-encoded file content
    content_bytes: String,
}

impl FileAttachment {
    const ODATA_TYPE: &'static str = "#microsoft.graph.fileAttachment";

    /// Read a file from disk into an inline attachment
    ///
    /// # Errors
    /// - `AttachmentUnreadable` if the file is missing or cannot be read
    /// - `AttachmentTooLargeForInline` above the inline limit
    pub fn from_path(name: impl Into<String>, path: &Path) -> Result<Self, UploadError> {
        let size = std::fs::metadata(path)
            .map_err(|e| UploadError::unreadable(format!("cannot stat {}", path.display()), e))?
            .len();
        check_inline_size(size)?;

        let bytes = std::fs::read(path)
            .map_err(|e| UploadError::unreadable(format!("cannot read {}", path.display()), e))?;

        Self::from_bytes(name, content_type_for_path(path), bytes)
    }

    /// Build an inline attachment from bytes with an explicit MIME type
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        let size = bytes.len() as u64;
        check_inline_size(size)?;

        Ok(Self {
            odata_type: Self::ODATA_TYPE.to_string(),
            name: name.into(),
            content_type: content_type.into(),
            size,
            content_bytes: BASE64_STANDARD.encode(&bytes),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// MIME type for a file, from its extension
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::MIN_UPLOAD_SESSION_SIZE;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_bytes_encodes_content() {
        let attachment = FileAttachment::from_bytes("hello.txt", "text/plain", b"hello".to_vec()).unwrap();
        let value = serde_json::to_value(&attachment).unwrap();

        assert_eq!(value["@odata.type"], "#microsoft.graph.fileAttachment");
        assert_eq!(value["contentBytes"], "aGVsbG8=");
        assert_eq!(value["size"], 5);
        assert_eq!(value["contentType"], "text/plain");
    }

    #[test]
    fn test_from_bytes_over_limit() {
        let bytes = vec![0u8; MIN_UPLOAD_SESSION_SIZE as usize + 1];
        let result = FileAttachment::from_bytes("big.bin", "application/octet-stream", bytes);
        assert!(matches!(result, Err(UploadError::AttachmentTooLargeForInline { .. })));
    }

    #[test]
    fn test_from_path_infers_content_type() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(br#"{"a":1}"#).unwrap();

        let attachment = FileAttachment::from_path("data.json", file.path()).unwrap();
        assert_eq!(attachment.content_type(), "application/json");
        assert_eq!(attachment.size(), 7);
        assert_eq!(attachment.name(), "data.json");
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = FileAttachment::from_path("nope", Path::new("/no/such/file.pdf"));
        assert!(matches!(result, Err(UploadError::AttachmentUnreadable { .. })));
    }

    #[test]
    fn test_content_type_fallback() {
        assert_eq!(content_type_for_path(Path::new("archive.ZIP")), "application/zip");
        assert_eq!(content_type_for_path(Path::new("blob.xyz")), "application/octet-stream");
        assert_eq!(content_type_for_path(Path::new("noext")), "application/octet-stream");
    }
}

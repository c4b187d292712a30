//! Attachment byte sources with a known length

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

use super::UploadError;
use crate::models::content_type_for_path;

/// A forward-only attachment stream whose total length is known up front
///
/// The length is needed before the first request because every
/// `Content-Range` header carries the total size.
pub struct UploadSource<R> {
    name: String,
    mime_type: String,
    len: u64,
    reader: R,
}

impl UploadSource<File> {
    /// Open a file on disk as an upload source
    ///
    /// # Errors
    /// `AttachmentUnreadable` if the file cannot be opened or stat'ed.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let file = File::open(path).map_err(|e| {
            UploadError::unreadable(format!("cannot open {}", path.display()), e)
        })?;
        let len = file
            .metadata()
            .map_err(|e| UploadError::unreadable(format!("cannot stat {}", path.display()), e))?
            .len();

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());

        Ok(Self {
            name,
            mime_type: content_type_for_path(path).to_string(),
            len,
            reader: file,
        })
    }
}

impl UploadSource<Cursor<Vec<u8>>> {
    /// Wrap an in-memory buffer
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let len = bytes.len() as u64;
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            len,
            reader: Cursor::new(bytes),
        }
    }
}

impl<R: Read> UploadSource<R> {
    /// Wrap any reader with a declared length
    ///
    /// The declared length is trusted; a reader that ends early surfaces as
    /// `AttachmentUnreadable` during the upload.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, len: u64, reader: R) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            len,
            reader,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Declared total size in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fill `buf` completely from the reader
    ///
    /// Unlike `Read::read_exact`, hitting EOF is reported with the offset at
    /// which the source fell short of its declared length.
    pub(crate) fn read_chunk(&mut self, buf: &mut [u8], offset: u64) -> Result<(), UploadError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(UploadError::AttachmentUnreadable {
                        reason: format!(
                            "source ended at byte {} of declared {}",
                            offset + filled as u64,
                            self.len
                        ),
                        source: None,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(UploadError::unreadable(
                        format!("read failed at byte {}", offset + filled as u64),
                        e,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Read the whole declared length into memory
    pub(crate) fn read_all(&mut self) -> Result<Vec<u8>, UploadError> {
        let mut bytes = vec![0u8; self.len as usize];
        self.read_chunk(&mut bytes, 0)?;
        Ok(bytes)
    }

    /// Read and discard `count` bytes
    pub(crate) fn skip(&mut self, count: u64, offset: u64) -> Result<(), UploadError> {
        let copied = io::copy(&mut (&mut self.reader).take(count), &mut io::sink())
            .map_err(|e| UploadError::unreadable(format!("skip failed at byte {}", offset), e))?;
        if copied < count {
            return Err(UploadError::AttachmentUnreadable {
                reason: format!(
                    "source ended at byte {} of declared {}",
                    offset + copied,
                    self.len
                ),
                source: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_bytes_reports_len() {
        let source = UploadSource::from_bytes("a.bin", "application/octet-stream", vec![1, 2, 3]);
        assert_eq!(source.len(), 3);
        assert!(!source.is_empty());
        assert_eq!(source.name(), "a.bin");
    }

    #[test]
    fn test_from_path_reads_metadata() {
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();
        file.write_all(&[0u8; 1024]).unwrap();

        let source = UploadSource::from_path(file.path()).unwrap();
        assert_eq!(source.len(), 1024);
        assert_eq!(source.mime_type(), "application/pdf");
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = UploadSource::from_path(Path::new("/definitely/not/here.bin"));
        assert!(matches!(result, Err(UploadError::AttachmentUnreadable { .. })));
    }

    #[test]
    fn test_read_chunk_short_source() {
        let mut source = UploadSource::new("x", "text/plain", 10, Cursor::new(vec![0u8; 4]));
        let mut buf = vec![0u8; 8];
        let err = source.read_chunk(&mut buf, 0).unwrap_err();
        assert!(err.to_string().contains("source ended at byte 4"));
    }

    #[test]
    fn test_skip_advances_reader() {
        let mut source = UploadSource::from_bytes("x", "text/plain", (0u8..10).collect());
        source.skip(6, 0).unwrap();
        let mut buf = vec![0u8; 4];
        source.read_chunk(&mut buf, 6).unwrap();
        assert_eq!(buf, vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_read_all_uses_declared_len() {
        let mut source = UploadSource::from_bytes("x", "text/plain", vec![7u8; 5]);
        assert_eq!(source.read_all().unwrap(), vec![7u8; 5]);

        let mut short = UploadSource::new("x", "text/plain", 6, Cursor::new(vec![0u8; 3]));
        assert!(matches!(
            short.read_all(),
            Err(UploadError::AttachmentUnreadable { .. })
        ));
    }
}

//! Input resolution: turn an uploaded document into plain text.
//!
//! Only two kinds are accepted, decided from the *declared* media type (or
//! file extension) rather than by sniffing content: the declared kind is what
//! the uploader asserted, and rejecting anything else up-front means no field
//! extraction or model call ever runs on an unsupported document.

use crate::error::Idea2AppError;
use crate::pipeline::pdf;
use std::path::Path;
use tracing::debug;

/// Declared kind of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MediaKind {
    /// `application/pdf`
    Pdf,
    /// `text/plain`
    PlainText,
}

impl MediaKind {
    /// Parse a MIME type. Parameters (`; charset=…`) and case are ignored.
    pub fn from_mime(mime: &str) -> Result<Self, Idea2AppError> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => Ok(MediaKind::Pdf),
            "text/plain" => Ok(MediaKind::PlainText),
            _ => Err(Idea2AppError::UnsupportedFormat {
                declared: mime.to_string(),
            }),
        }
    }

    /// Infer the kind from a `.pdf` / `.txt` extension.
    pub fn from_path(path: &Path) -> Result<Self, Idea2AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => Ok(MediaKind::Pdf),
            Some("txt") => Ok(MediaKind::PlainText),
            _ => Err(Idea2AppError::UnsupportedFormat {
                declared: path.display().to_string(),
            }),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            MediaKind::Pdf => "application/pdf",
            MediaKind::PlainText => "text/plain",
        }
    }
}

/// An uploaded document: raw bytes plus the kind the uploader declared.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub kind: MediaKind,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Vec<u8>>, kind: MediaKind) -> Self {
        Self {
            bytes: bytes.into(),
            kind,
        }
    }

    /// Build from bytes and a declared MIME type.
    ///
    /// Fails with [`Idea2AppError::UnsupportedFormat`] before touching the
    /// bytes when the MIME type is neither PDF nor plain text.
    pub fn from_mime(bytes: impl Into<Vec<u8>>, mime: &str) -> Result<Self, Idea2AppError> {
        let kind = MediaKind::from_mime(mime)?;
        Ok(Self::new(bytes, kind))
    }

    /// Read a local file. The kind comes from `mime` when given, otherwise
    /// from the file extension; the kind is checked before the file is read.
    pub async fn from_file(path: &Path, mime: Option<&str>) -> Result<Self, Idea2AppError> {
        let kind = match mime {
            Some(m) => MediaKind::from_mime(m)?,
            None => MediaKind::from_path(path)?,
        };
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|_| Idea2AppError::FileNotFound {
                path: path.to_path_buf(),
            })?;
        debug!("Read {} bytes from {} as {:?}", bytes.len(), path.display(), kind);
        Ok(Self { bytes, kind })
    }
}

/// Extract the document's text.
///
/// Plain text is decoded as strict UTF-8. PDFs go through pdfium on a
/// blocking thread; see [`pdf::extract_text`].
pub async fn read_text(document: &RawDocument) -> Result<String, Idea2AppError> {
    match document.kind {
        MediaKind::PlainText => decode_utf8(document.bytes.clone()),
        MediaKind::Pdf => pdf::extract_text(document.bytes.clone()).await,
    }
}

fn decode_utf8(bytes: Vec<u8>) -> Result<String, Idea2AppError> {
    String::from_utf8(bytes).map_err(|source| Idea2AppError::DecodeError { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_parsing() {
        assert_eq!(MediaKind::from_mime("application/pdf").unwrap(), MediaKind::Pdf);
        assert_eq!(MediaKind::from_mime("text/plain").unwrap(), MediaKind::PlainText);
        assert_eq!(
            MediaKind::from_mime("Text/Plain; charset=utf-8").unwrap(),
            MediaKind::PlainText
        );
    }

    #[test]
    fn unsupported_mime_is_rejected() {
        for mime in ["image/png", "application/msword", "", "text/markdown"] {
            let err = MediaKind::from_mime(mime).unwrap_err();
            assert_eq!(err.kind(), "unsupported_format", "mime {mime:?}");
        }
    }

    #[test]
    fn extension_parsing() {
        assert_eq!(MediaKind::from_path(Path::new("idea.PDF")).unwrap(), MediaKind::Pdf);
        assert_eq!(
            MediaKind::from_path(Path::new("/tmp/idea.txt")).unwrap(),
            MediaKind::PlainText
        );
        assert!(MediaKind::from_path(Path::new("idea.docx")).is_err());
        assert!(MediaKind::from_path(Path::new("idea")).is_err());
    }

    #[tokio::test]
    async fn plain_text_is_decoded() {
        let doc = RawDocument::new("Project name: Foo", MediaKind::PlainText);
        assert_eq!(read_text(&doc).await.unwrap(), "Project name: Foo");
    }

    #[tokio::test]
    async fn invalid_utf8_fails() {
        let doc = RawDocument::new(vec![b'a', 0xff, 0xfe], MediaKind::PlainText);
        let err = read_text(&doc).await.unwrap_err();
        assert_eq!(err.kind(), "decode_error");
    }

    #[tokio::test]
    async fn from_file_checks_kind_before_reading() {
        // The file does not exist; the extension must be rejected first.
        let err = RawDocument::from_file(Path::new("/definitely/missing.png"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unsupported_format");

        let err = RawDocument::from_file(Path::new("/definitely/missing.txt"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "file_not_found");
    }

    #[tokio::test]
    async fn explicit_mime_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idea.md");
        std::fs::write(&path, "Platforms: iOS").unwrap();

        assert!(RawDocument::from_file(&path, None).await.is_err());
        let doc = RawDocument::from_file(&path, Some("text/plain")).await.unwrap();
        assert_eq!(doc.kind, MediaKind::PlainText);
    }
}

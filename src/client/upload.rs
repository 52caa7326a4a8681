use std::{fmt, path::Path};

/// Largest document the service accepts for analysis.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Document formats the service can extract requirements from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// PDF document.
    Pdf,
    /// Plain text.
    Text,
    /// Markdown.
    Markdown,
}

impl UploadKind {
    /// Infer the kind from a file extension, case-insensitively.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// The MIME type sent with the upload.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Text => "text/plain",
            Self::Markdown => "text/markdown",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A validated document ready to be uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    name: String,
    kind: UploadKind,
    bytes: Vec<u8>,
}

/// Why a document cannot be uploaded.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// The file that failed.
        path: String,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The file is not a PDF, text or markdown document.
    #[error("Invalid file type. Only PDF, TXT, MD allowed")]
    UnsupportedType,

    /// The file exceeds [`MAX_UPLOAD_BYTES`].
    #[error("File size exceeds 10MB limit")]
    TooLarge,
}

impl UploadFile {
    /// Validate an in-memory document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is larger than [`MAX_UPLOAD_BYTES`].
    pub fn new(
        name: impl Into<String>,
        kind: UploadKind,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge);
        }
        Ok(Self {
            name: name.into(),
            kind,
            bytes,
        })
    }

    /// Read and validate a document from disk, inferring its kind from the
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not supported, the file cannot be
    /// read, or it is too large.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let kind = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(UploadKind::from_extension)
            .ok_or(UploadError::UnsupportedType)?;

        let too_large = std::fs::metadata(path)
            .map(|meta| meta.len() > MAX_UPLOAD_BYTES as u64)
            .map_err(|source| UploadError::Read {
                path: path.display().to_string(),
                source,
            })?;
        if too_large {
            return Err(UploadError::TooLarge);
        }

        let bytes = std::fs::read(path).map_err(|source| UploadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| "document".to_string(), |n| n.to_string_lossy().into_owned());

        Self::new(name, kind, bytes)
    }

    /// The file name sent to the service.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The document kind.
    #[must_use]
    pub const fn kind(&self) -> UploadKind {
        self.kind
    }

    /// Size of the document in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the document is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;

    use super::*;

    #[test_case("brief.pdf", Some(UploadKind::Pdf); "pdf")]
    #[test_case("NOTES.TXT", Some(UploadKind::Text); "uppercase text")]
    #[test_case("readme.md", Some(UploadKind::Markdown); "markdown")]
    #[test_case("image.png", None; "unsupported")]
    fn kind_from_extension(name: &str, expected: Option<UploadKind>) {
        let extension = Path::new(name).extension().unwrap().to_str().unwrap();
        assert_eq!(UploadKind::from_extension(extension), expected);
    }

    #[test]
    fn reads_supported_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("requirements.md");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"# The system shall...")
            .unwrap();

        let file = UploadFile::from_path(&path).unwrap();

        assert_eq!(file.name(), "requirements.md");
        assert_eq!(file.kind(), UploadKind::Markdown);
        assert_eq!(file.len(), 21);
    }

    #[test]
    fn rejects_unsupported_extension_before_reading() {
        let error = UploadFile::from_path(Path::new("/does/not/exist.docx")).unwrap_err();
        assert!(matches!(error, UploadError::UnsupportedType));
    }

    #[test]
    fn rejects_oversized_document() {
        let error = UploadFile::new("big.txt", UploadKind::Text, vec![b'x'; MAX_UPLOAD_BYTES + 1])
            .unwrap_err();
        assert_eq!(error.to_string(), "File size exceeds 10MB limit");
    }
}

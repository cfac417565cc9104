//! Binary attachments submitted alongside project and certification forms.

use core::fmt;

/// Errors that can occur when building an [`Attachment`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    /// The file exceeds the upload cap.
    #[error("file {file_name} is {size} bytes, the limit is {max} bytes")]
    TooLarge {
        /// Name of the rejected file.
        file_name: String,
        /// Actual size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max: usize,
    },
    /// The file has no content.
    #[error("file {0} is empty")]
    Empty(String),
    /// The file name is blank.
    #[error("attachment file name cannot be empty")]
    MissingFileName,
}

/// A file held in memory, ready to be sent as a multipart part.
///
/// Construction enforces the 5 MiB cap, so an oversized file is rejected
/// before it can reach the network layer.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl Attachment {
    /// Maximum attachment size (5 MiB).
    pub const MAX_BYTES: usize = 5 * 1024 * 1024;

    /// Build an attachment, validating name and size.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::TooLarge`] when `bytes` exceeds
    /// [`Self::MAX_BYTES`], [`AttachmentError::Empty`] when it has no content.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, AttachmentError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(AttachmentError::MissingFileName);
        }
        if bytes.is_empty() {
            return Err(AttachmentError::Empty(file_name));
        }
        if bytes.len() > Self::MAX_BYTES {
            return Err(AttachmentError::TooLarge {
                file_name,
                size: bytes.len(),
                max: Self::MAX_BYTES,
            });
        }

        Ok(Self {
            file_name,
            content_type: content_type.into(),
            bytes,
        })
    }

    /// Guess a MIME type from a file extension.
    ///
    /// Covers the formats the admin forms accept; anything else is sent as
    /// `application/octet-stream`.
    #[must_use]
    pub fn content_type_for(file_name: &str) -> &'static str {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            Some("svg") => "image/svg+xml",
            Some("pdf") => "application/pdf",
            _ => "application/octet-stream",
        }
    }

    /// Original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type sent with the part.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// File contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the attachment has no content (never true for a built value).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the attachment, returning its contents.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_file_at_limit() {
        let attachment =
            Attachment::new("cert.pdf", "application/pdf", vec![0; Attachment::MAX_BYTES]);
        assert!(attachment.is_ok());
    }

    #[test]
    fn test_rejects_file_over_limit() {
        let result = Attachment::new(
            "huge.png",
            "image/png",
            vec![0; Attachment::MAX_BYTES + 1],
        );
        assert_eq!(
            result,
            Err(AttachmentError::TooLarge {
                file_name: "huge.png".to_string(),
                size: Attachment::MAX_BYTES + 1,
                max: Attachment::MAX_BYTES,
            })
        );
    }

    #[test]
    fn test_rejects_empty_file_and_blank_name() {
        assert_eq!(
            Attachment::new("a.png", "image/png", Vec::new()),
            Err(AttachmentError::Empty("a.png".to_string()))
        );
        assert_eq!(
            Attachment::new(" ", "image/png", vec![1]),
            Err(AttachmentError::MissingFileName)
        );
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(Attachment::content_type_for("Shot.JPG"), "image/jpeg");
        assert_eq!(Attachment::content_type_for("cert.pdf"), "application/pdf");
        assert_eq!(
            Attachment::content_type_for("archive"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_debug_omits_contents() {
        let attachment = Attachment::new("a.png", "image/png", vec![7, 7, 7]).unwrap_or_else(|e| {
            panic!("valid attachment rejected: {e}");
        });
        let debug = format!("{attachment:?}");
        assert!(debug.contains("len: 3"));
        assert!(!debug.contains("[7, 7, 7]"));
    }
}

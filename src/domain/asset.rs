//! Uploaded image types
//!
//! An [`ImageUpload`] is what the user submits through the form. After the
//! blob store accepts it, the result is an [`UploadedAsset`] carrying the URL
//! that the analysis service will read from.

use super::errors::CardScanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Azure limits blob names to 1024 characters
const MAX_BLOB_NAME_LEN: usize = 1024;

/// Longest sanitized file-name suffix kept in a generated blob name
const MAX_FILE_STEM_LEN: usize = 200;

/// Blob name newtype wrapper
///
/// # Examples
///
/// ```
/// use cardscan::domain::asset::BlobName;
///
/// let name = BlobName::generate("my card.png");
/// assert!(name.as_str().ends_with("-my_card.png"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobName(String);

impl BlobName {
    /// Creates a blob name from an existing string
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Blob name cannot be empty".to_string());
        }
        if name.len() > MAX_BLOB_NAME_LEN {
            return Err(format!(
                "Blob name exceeds {MAX_BLOB_NAME_LEN} characters: {}",
                name.len()
            ));
        }
        if name.starts_with('/') || name.ends_with('.') || name.ends_with('/') {
            return Err(format!("Invalid blob name: {name}"));
        }
        Ok(Self(name))
    }

    /// Generates a unique blob name from the user's original file name
    ///
    /// Format: `{uuid}-{sanitized file name}`. Characters outside
    /// `[A-Za-z0-9._-]` are replaced with `_`.
    pub fn generate(original_name: &str) -> Self {
        let base = original_name
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(original_name);

        let mut sanitized: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        sanitized = sanitized.trim_matches('.').to_string();
        if sanitized.len() > MAX_FILE_STEM_LEN {
            sanitized = sanitized[sanitized.len() - MAX_FILE_STEM_LEN..].to_string();
        }
        if sanitized.is_empty() {
            sanitized = "upload".to_string();
        }

        Self(format!("{}-{}", Uuid::new_v4().simple(), sanitized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BlobName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for BlobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    const PNG_MAGIC: &'static [u8] = b"\x89PNG\r\n\x1a\n";
    const JPEG_MAGIC: &'static [u8] = &[0xFF, 0xD8, 0xFF];

    /// Detects the format from the file's leading bytes
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(Self::PNG_MAGIC) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(Self::JPEG_MAGIC) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    /// Maps a file extension (`png`, `jpg`, `jpeg`) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// An image submitted by the user
#[derive(Debug, Clone)]
pub struct ImageUpload {
    file_name: String,
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl ImageUpload {
    /// Creates an upload after checking that the bytes are a PNG or JPEG image
    ///
    /// # Errors
    ///
    /// Returns a validation error if the file is empty, has an extension other
    /// than png/jpg/jpeg, or its content is not a PNG or JPEG image.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, CardScanError> {
        let file_name = file_name.into();

        if bytes.is_empty() {
            return Err(CardScanError::Validation(format!(
                "File '{file_name}' is empty"
            )));
        }

        if let Some((_, ext)) = file_name.rsplit_once('.') {
            if ImageFormat::from_extension(ext).is_none() {
                return Err(CardScanError::Validation(format!(
                    "Unsupported file extension '.{ext}'. Supported formats: PNG, JPG, JPEG"
                )));
            }
        }

        let format = ImageFormat::detect(&bytes).ok_or_else(|| {
            CardScanError::Validation(format!(
                "File '{file_name}' is not a PNG or JPEG image"
            ))
        })?;

        Ok(Self {
            file_name,
            bytes,
            format,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// How the returned URL grants access to the blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessUrlKind {
    /// Time-limited SAS URL
    Signed,
    /// Plain blob URL, readable only if the container allows public access
    Direct,
}

/// A stored image and the URL used to read it back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub blob_name: BlobName,
    pub url: String,
    pub url_kind: AccessUrlKind,
    pub size_bytes: u64,
    pub content_type: String,
}

impl UploadedAsset {
    pub fn is_signed(&self) -> bool {
        self.url_kind == AccessUrlKind::Signed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_generate_sanitizes_file_name() {
        let name = BlobName::generate("../Meu Cartão (1).PNG");
        let (prefix, suffix) = name.as_str().split_once('-').unwrap();
        assert_eq!(prefix.len(), 32);
        assert_eq!(suffix, "Meu_Cart_o__1_.PNG");
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(BlobName::generate("a.png"), BlobName::generate("a.png"));
    }

    #[test]
    fn test_generate_empty_name() {
        let name = BlobName::generate("");
        assert!(name.as_str().ends_with("-upload"));
    }

    #[test]
    fn test_blob_name_validation() {
        assert!(BlobName::new("").is_err());
        assert!(BlobName::new("/leading").is_err());
        assert!(BlobName::new("x".repeat(1025)).is_err());
        assert!(BlobName::new("cards/visa.png").is_ok());
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a"), None);
        assert_eq!(ImageFormat::detect(&[]), None);
    }

    #[test]
    fn test_upload_rejects_empty_and_non_images() {
        assert!(matches!(
            ImageUpload::new("card.png", vec![]),
            Err(CardScanError::Validation(_))
        ));
        assert!(matches!(
            ImageUpload::new("card.png", b"plain text".to_vec()),
            Err(CardScanError::Validation(_))
        ));
        assert!(matches!(
            ImageUpload::new("card.gif", PNG_HEADER.to_vec()),
            Err(CardScanError::Validation(_))
        ));
    }

    #[test]
    fn test_upload_accepts_png() {
        let upload = ImageUpload::new("card.png", PNG_HEADER.to_vec()).unwrap();
        assert_eq!(upload.format(), ImageFormat::Png);
        assert_eq!(upload.format().content_type(), "image/png");
        assert_eq!(upload.size(), PNG_HEADER.len());
    }
}

//! Image format detection from payload bytes.
//!
//! Content type is always derived from the actual bytes, never from a
//! caller-supplied label: the label is attacker-controlled input.

/// Image formats accepted for tabloid pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detect the format from payload bytes.
    ///
    /// Returns `None` for empty payloads and for anything that is not
    /// PNG or JPEG (other image formats included).
    pub fn detect(payload: &[u8]) -> Option<Self> {
        if payload.is_empty() {
            return None;
        }

        match image::guess_format(payload).ok()? {
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// File extension for object keys, including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => ".png",
            ImageFormat::Jpeg => ".jpeg",
        }
    }

    /// MIME type for the stored object.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_detect_png() {
        assert_eq!(ImageFormat::detect(PNG_MAGIC), Some(ImageFormat::Png));
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(ImageFormat::detect(JPEG_MAGIC), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_detect_rejects_text() {
        assert_eq!(ImageFormat::detect(b"hello, not an image"), None);
    }

    #[test]
    fn test_detect_rejects_empty() {
        assert_eq!(ImageFormat::detect(&[]), None);
    }

    #[test]
    fn test_detect_rejects_gif() {
        // GIF is a valid image format but not on the allow-list.
        assert_eq!(ImageFormat::detect(b"GIF89a\x01\x00\x01\x00"), None);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ImageFormat::Png.extension(), ".png");
        assert_eq!(ImageFormat::Jpeg.extension(), ".jpeg");
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
    }
}

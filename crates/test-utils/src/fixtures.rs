//! Byte fixtures for image sniffing tests.
//!
//! Format detection only inspects the leading magic bytes, so these
//! payloads carry a real signature followed by filler.

/// A payload that sniffs as PNG.
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, // signature
    0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R', // IHDR chunk header
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
];

/// A payload that sniffs as JPEG (JFIF header).
pub const JPEG_BYTES: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01,
];

/// A payload that sniffs as GIF: a real image format, but not allowed.
pub const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00";

/// A payload that is plain text no matter what label a caller attaches.
pub const TEXT_BYTES: &[u8] = b"this is definitely not an image";

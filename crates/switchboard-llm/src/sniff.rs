//! MIME type detection for image payloads
//!
//! Caller-supplied metadata is never trusted; the type is derived from the
//! leading bytes of the payload.

/// Bytes examined when classifying a payload
const SNIFF_LEN: usize = 512;

/// Fallback for payloads that look like text
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Fallback for unrecognized binary payloads
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Detect the MIME type of `bytes`
///
/// Known magic numbers win. Otherwise the payload is text unless its head
/// contains a binary control byte.
pub fn detect_content_type(bytes: &[u8]) -> &'static str {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];

    if let Some(kind) = infer::get(head) {
        return kind.mime_type();
    }

    if head.iter().any(|&b| is_binary_byte(b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

const fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

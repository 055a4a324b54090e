//! Content-type sniffing.

/// Number of leading bytes handed to a [`ContentClassifier`].
pub const SNIFF_LEN: usize = 512;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// Guesses a MIME type from the first bytes of a stream.
///
/// Implementations receive at most [`SNIFF_LEN`] bytes (fewer when the
/// stream is shorter) and always return some type.
pub trait ContentClassifier: Send + Sync {
    fn classify(&self, prefix: &[u8]) -> String;
}

/// Magic-number detection via `infer`, falling back to a text/binary guess.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicClassifier;

impl ContentClassifier for MagicClassifier {
    fn classify(&self, prefix: &[u8]) -> String {
        let prefix = &prefix[..prefix.len().min(SNIFF_LEN)];
        if let Some(kind) = infer::get(prefix) {
            return kind.mime_type().to_string();
        }
        if prefix.iter().any(|b| is_binary_byte(*b)) {
            OCTET_STREAM.to_string()
        } else {
            TEXT_PLAIN.to_string()
        }
    }
}

/// Control bytes that never appear in text (WHATWG mime sniffing).
fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

use std::fmt::{self, Display, Formatter};

use encoding_rs::UTF_8;
use memchr::memmem;

pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    memmem::find(haystack, needle)
}

/// Strict UTF-8 decoding, `None` on any malformed sequence.
pub(crate) fn decode_utf8(bytes: &[u8]) -> Option<std::borrow::Cow<'_, str>> {
    UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
}

/// Lossy UTF-8 decoding.
pub(crate) fn decode_utf8_lossy(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    UTF_8.decode_without_bom_handling(bytes).0
}

/// Short hex rendering of a byte slice: all of it when small, otherwise
/// the first and last ten bytes.
pub(crate) struct HexPreview<'a>(pub(crate) &'a [u8]);

fn write_hex(f: &mut Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for (idx, b) in bytes.iter().enumerate() {
        if idx > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{:#x}", b)?;
    }
    Ok(())
}

impl Display for HexPreview<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.len() < 20 {
            write_hex(f, self.0)
        } else {
            write_hex(f, &self.0[..10])?;
            f.write_str("..")?;
            write_hex(f, &self.0[self.0.len() - 10..])
        }
    }
}

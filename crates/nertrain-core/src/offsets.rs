//! Conversions between byte offsets (what `str` and `regex` use) and
//! character offsets (what annotation spans use).

/// Byte offset of the `char_idx`-th character. `char_idx == char count`
/// maps to `text.len()`.
pub fn char_to_byte(text: &str, char_idx: usize) -> Option<usize> {
    if char_idx == 0 {
        return Some(0);
    }
    text.char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .nth(char_idx)
}

/// Character index of a byte offset. Returns `None` if `byte_idx` is not a
/// char boundary or lies past the end.
pub fn byte_to_char(text: &str, byte_idx: usize) -> Option<usize> {
    if !text.is_char_boundary(byte_idx) {
        return None;
    }
    Some(text[..byte_idx].chars().count())
}

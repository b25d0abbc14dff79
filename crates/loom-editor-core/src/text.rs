//! UTF-16 offset helpers.
//!
//! Document offsets are measured in UTF-16 code units, matching the host
//! editor's string model. Rust strings are UTF-8, so every slice taken at a
//! document offset goes through these conversions.

/// Length of a string in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Convert a UTF-16 offset into a byte offset.
///
/// Offsets that land inside a surrogate pair round down to the start of that
/// char. Offsets past the end clamp to `s.len()`.
pub fn utf16_to_byte(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in s.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return byte;
        }
        units = next;
    }
    s.len()
}

/// Convert a byte offset into a UTF-16 offset.
pub fn byte_to_utf16(s: &str, byte_offset: usize) -> usize {
    let end = byte_offset.min(s.len());
    s.char_indices()
        .take_while(|(byte, _)| *byte < end)
        .map(|(_, ch)| ch.len_utf16())
        .sum()
}

/// Slice a string by UTF-16 offsets `[start, end)`.
pub fn utf16_slice(s: &str, start: usize, end: usize) -> &str {
    let start_byte = utf16_to_byte(s, start);
    let end_byte = utf16_to_byte(s, end.max(start));
    &s[start_byte..end_byte]
}

/// Reverse a string by chars.
///
/// Backward pattern matching runs regexes over the reversed text before the
/// caret; captured groups are reversed again to restore document order.
pub fn reversed(s: &str) -> String {
    s.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_len() {
        assert_eq!(utf16_len("hello"), 5);
        // Astral plane emoji is a surrogate pair
        assert_eq!(utf16_len("😀"), 2);
        // ZWJ family: four astral chars + three joiners
        assert_eq!(utf16_len("👨‍👩‍👧‍👦"), 11);
        assert_eq!(utf16_len("é"), 1);
    }

    #[test]
    fn test_utf16_to_byte() {
        let s = "a😀b";
        assert_eq!(utf16_to_byte(s, 0), 0);
        assert_eq!(utf16_to_byte(s, 1), 1);
        // Inside the surrogate pair rounds down
        assert_eq!(utf16_to_byte(s, 2), 1);
        assert_eq!(utf16_to_byte(s, 3), 5);
        assert_eq!(utf16_to_byte(s, 4), 6);
        assert_eq!(utf16_to_byte(s, 100), 6);
    }

    #[test]
    fn test_byte_to_utf16() {
        let s = "a😀b";
        assert_eq!(byte_to_utf16(s, 0), 0);
        assert_eq!(byte_to_utf16(s, 1), 1);
        assert_eq!(byte_to_utf16(s, 5), 3);
        assert_eq!(byte_to_utf16(s, 6), 4);
    }

    #[test]
    fn test_utf16_slice() {
        let s = "hi😀there";
        assert_eq!(utf16_slice(s, 0, 2), "hi");
        assert_eq!(utf16_slice(s, 2, 4), "😀");
        assert_eq!(utf16_slice(s, 4, 9), "there");
        assert_eq!(utf16_slice(s, 5, 3), "");
    }

    #[test]
    fn test_reversed() {
        assert_eq!(reversed("**ab**"), "**ba**");
        assert_eq!(reversed(""), "");
    }
}

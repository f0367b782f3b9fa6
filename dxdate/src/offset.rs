//! Byte/character offset conversion.
//!
//! `regex` reports byte offsets; mentions are located by character offset
//! (Unicode scalar values), which is what annotators and downstream
//! consumers count.
//!
//! ```text
//! Text:  "fièvre[dx] (2023-01-15)[date]"
//!            ^
//!            `è` is 2 bytes
//!
//! "(" is byte 12 but char 11
//! ```

/// Precomputed byte→char table for one text, so each lookup is O(1).
///
/// ASCII text skips the table entirely.
#[derive(Debug, Clone)]
pub struct SpanConverter {
    byte_to_char: Vec<usize>,
    is_ascii: bool,
}

impl SpanConverter {
    /// Create a converter for the given text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            Self {
                byte_to_char: Vec::new(),
                is_ascii: true,
            }
        } else {
            Self {
                byte_to_char: build_byte_to_char_map(text),
                is_ascii: false,
            }
        }
    }

    /// Convert a byte offset to a char offset. Out-of-range offsets clamp
    /// to the end of the text.
    #[must_use]
    pub fn byte_to_char(&self, byte_idx: usize) -> usize {
        if self.is_ascii {
            return byte_idx;
        }
        self.byte_to_char
            .get(byte_idx)
            .or_else(|| self.byte_to_char.last())
            .copied()
            .unwrap_or(0)
    }
}

fn build_byte_to_char_map(text: &str) -> Vec<usize> {
    let mut map = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
        for slot in map.iter_mut().skip(byte_idx).take(ch.len_utf8()) {
            *slot = char_idx;
        }
    }
    map[text.len()] = text.chars().count();
    map
}

/// First `max_chars` characters of `text`, never splitting a character.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_ascii() {
        let conv = SpanConverter::new("flu[dx]");
        assert_eq!(conv.byte_to_char(3), 3);
    }

    #[test]
    fn test_converter_unicode() {
        let text = "fièvre[dx]";
        let conv = SpanConverter::new(text);
        // `[` is byte 7, char 6
        assert_eq!(conv.byte_to_char(7), 6);
        assert_eq!(conv.byte_to_char(text.len()), text.chars().count());
        assert_eq!(conv.byte_to_char(999), text.chars().count());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn char_boundaries_map_to_char_index(text in ".{0,80}") {
            let conv = SpanConverter::new(&text);
            for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
                prop_assert_eq!(conv.byte_to_char(byte_idx), char_idx);
            }
            prop_assert_eq!(conv.byte_to_char(text.len()), text.chars().count());
        }

        #[test]
        fn truncate_never_exceeds(text in ".{0,80}", n in 0usize..100) {
            prop_assert!(truncate_chars(&text, n).chars().count() <= n);
        }
    }
}

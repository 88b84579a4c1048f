//! Incremental JSON boundary detection.
//!
//! A subscribe response embeds the message payload inside a larger JSON
//! envelope, and the payload's end has to be found without parsing it and
//! without buffering it. The filter is a per-byte classifier tracking just
//! enough structure (string mode, escape mode, net bracket depth) to
//! recognize the byte at which one top-level JSON value closes. It runs in
//! O(1) space regardless of payload size and performs no I/O.
//!
//! # Classification
//!
//! Inside a string, only three bytes matter: `\` arms the escape flag, an
//! escaped byte is consumed blind, and an unescaped `"` leaves string
//! mode, closing the whole value if no bracket is open. Outside a string,
//! `{`/`[` and `}`/`]` move the depth counter, and a close that brings it
//! to zero is the boundary. Everything else (whitespace, separators,
//! scalar content) is inert.
//!
//! The filter assumes well-formed JSON. Unbalanced input yields an
//! undetected or premature boundary; it is not validated here.
//!
//! # Examples
//!
//! ```
//! use relay_http::{FilterEvent, JsonBoundaryFilter};
//!
//! let mut filter = JsonBoundaryFilter::new();
//! let mut events = b"[[1],[2]]".iter().map(|b| filter.feed(*b));
//! assert_eq!(events.position(|e| e == FilterEvent::Boundary), Some(8));
//! ```

/// Outcome of feeding one byte to the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterEvent {
    /// The byte is interior to the value; keep feeding.
    Continue,
    /// This byte closes the top-level value. It is the last payload byte.
    Boundary,
}

/// Byte-at-a-time detector for the end of one top-level JSON value.
///
/// State persists across calls, so a value arriving in arbitrary fragments
/// is classified identically to one arriving whole. Depth starts at zero;
/// a fresh filter is required per value.
///
/// One deliberate quirk: a bare top-level string (`"hi"`) is closed by its
/// final quote, on the assumption that the payload is never a bracket-free
/// string followed by more structure. This matches the deployed service's
/// envelope and must not be generalized.
#[derive(Debug, Clone, Default)]
pub struct JsonBoundaryFilter {
    in_string: bool,
    after_backslash: bool,
    depth: i32,
}

impl JsonBoundaryFilter {
    /// A filter at its initial state: depth zero, outside any string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one byte, advancing the state machine.
    pub fn feed(&mut self, byte: u8) -> FilterEvent {
        if self.in_string {
            if self.after_backslash {
                // Whatever was escaped, it is string content.
                self.after_backslash = false;
                return FilterEvent::Continue;
            }
            match byte {
                b'\\' => {
                    self.after_backslash = true;
                    FilterEvent::Continue
                }
                b'"' => {
                    self.in_string = false;
                    if self.depth == 0 {
                        FilterEvent::Boundary
                    } else {
                        FilterEvent::Continue
                    }
                }
                _ => FilterEvent::Continue,
            }
        } else {
            match byte {
                b'"' => {
                    self.in_string = true;
                    FilterEvent::Continue
                }
                b'{' | b'[' => {
                    self.depth += 1;
                    FilterEvent::Continue
                }
                b'}' | b']' => {
                    self.depth -= 1;
                    if self.depth <= 0 {
                        FilterEvent::Boundary
                    } else {
                        FilterEvent::Continue
                    }
                }
                _ => FilterEvent::Continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Index of the boundary byte, or None if it never fires.
    fn boundary_at(input: &[u8]) -> Option<usize> {
        let mut filter = JsonBoundaryFilter::new();
        input
            .iter()
            .position(|byte| filter.feed(*byte) == FilterEvent::Boundary)
    }

    #[test]
    fn test_boundary_fires_at_closing_bracket_of_array() {
        let input = br#"["Hello, world!"],"13511688131075270"]"#;
        assert_eq!(boundary_at(input), Some(16));
        assert_eq!(&input[..17], br#"["Hello, world!"]"#);
    }

    #[test]
    fn test_nested_containers_close_only_once() {
        assert_eq!(boundary_at(b"[[1,2],[3,4]]"), Some(12));
        assert_eq!(boundary_at(br#"{"a":{"b":[1]}}"#), Some(14));
    }

    #[test]
    fn test_escaped_quote_does_not_end_the_string() {
        let input = br#""a\"b""#;
        assert_eq!(boundary_at(input), Some(5));
    }

    #[test]
    fn test_escaped_backslash_then_quote_ends_the_string() {
        // In `"a\\"` the backslash escapes itself, so the quote is real.
        let input = br#""a\\""#;
        assert_eq!(boundary_at(input), Some(4));
    }

    #[test]
    fn test_bare_top_level_string_closes_on_final_quote() {
        assert_eq!(boundary_at(br#""hi there""#), Some(9));
    }

    #[test]
    fn test_brackets_inside_strings_are_content() {
        let input = br#"["a]b}c"]"#;
        assert_eq!(boundary_at(input), Some(8));
    }

    #[test]
    fn test_whitespace_and_scalars_are_inert() {
        assert_eq!(boundary_at(b" [1, true, null, 2.5e3] "), Some(22));
    }

    #[test]
    fn test_state_survives_fragmented_feeding() {
        let mut filter = JsonBoundaryFilter::new();
        for byte in br#"["frag"#.iter() {
            assert_eq!(filter.feed(*byte), FilterEvent::Continue);
        }
        let tail = br#"ment"]"#;
        let position = tail
            .iter()
            .position(|byte| filter.feed(*byte) == FilterEvent::Boundary);
        assert_eq!(position, Some(5));
    }
}

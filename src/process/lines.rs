//! Incremental line framing for engine output.

use std::borrow::Cow;

/// Splits a chunked byte stream into trimmed lines.
///
/// Bytes are buffered until a `\n` arrives. The unterminated tail (the
/// backlog) survives across calls to [`feed`](Self::feed), so lines split
/// across chunks, including a `\r\n` split between its two bytes or a
/// multi-byte UTF-8 character split mid-sequence, are framed correctly.
///
/// After every `feed` the backlog contains no `\n`.
#[derive(Debug, Default, Clone)]
pub struct LineAccumulator {
    backlog: Vec<u8>,
}

impl LineAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, in order.
    ///
    /// Lines are trimmed of surrounding whitespace (which removes `\r`).
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.backlog.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.backlog[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            lines.push(
                String::from_utf8_lossy(&self.backlog[start..end])
                    .trim()
                    .to_string(),
            );
            start = end + 1;
        }
        self.backlog.drain(..start);

        lines
    }

    /// The unterminated tail seen so far.
    ///
    /// Decoded lossily: an incomplete trailing UTF-8 sequence shows up as
    /// U+FFFD until the rest of it arrives.
    pub fn backlog(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.backlog)
    }

    /// Whether no unterminated bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.backlog.is_empty()
    }

    /// Drain the backlog as a final, untrimmed line.
    pub fn take_backlog(&mut self) -> String {
        let tail = String::from_utf8_lossy(&self.backlog).into_owned();
        self.backlog.clear();
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "a\nbb\nccc\n";

    fn feed_all(chunks: &[&[u8]]) -> (Vec<String>, LineAccumulator) {
        let mut acc = LineAccumulator::new();
        let mut lines = Vec::new();
        for chunk in chunks {
            lines.extend(acc.feed(chunk));
        }
        (lines, acc)
    }

    #[test]
    fn single_chunk() {
        let (lines, acc) = feed_all(&[INPUT.as_bytes()]);
        assert_eq!(lines, vec!["a", "bb", "ccc"]);
        assert!(acc.is_empty());
    }

    #[test]
    fn every_two_way_split_frames_identically() {
        let bytes = INPUT.as_bytes();
        for cut in 0..=bytes.len() {
            let (lines, acc) = feed_all(&[&bytes[..cut], &bytes[cut..]]);
            assert_eq!(lines, vec!["a", "bb", "ccc"], "split at {cut}");
            assert!(acc.is_empty());
        }
    }

    #[test]
    fn every_three_way_split_frames_identically() {
        let bytes = INPUT.as_bytes();
        for i in 0..=bytes.len() {
            for j in i..=bytes.len() {
                let (lines, _) = feed_all(&[&bytes[..i], &bytes[i..j], &bytes[j..]]);
                assert_eq!(lines, vec!["a", "bb", "ccc"], "split at {i},{j}");
            }
        }
    }

    #[test]
    fn byte_at_a_time() {
        let chunks: Vec<&[u8]> = INPUT.as_bytes().chunks(1).collect();
        let (lines, _) = feed_all(&chunks);
        assert_eq!(lines, vec!["a", "bb", "ccc"]);
    }

    #[test]
    fn emitted_lines_plus_backlog_cover_input() {
        let input = "a\nbb\nccc\ndd";
        let bytes = input.as_bytes();
        for cut in 0..=bytes.len() {
            let (lines, mut acc) = feed_all(&[&bytes[..cut], &bytes[cut..]]);
            let mut rebuilt = lines.join("\n");
            rebuilt.push('\n');
            rebuilt.push_str(&acc.take_backlog());
            assert_eq!(rebuilt, input, "split at {cut}");
        }
    }

    #[test]
    fn crlf_split_between_chunks() {
        let (lines, acc) = feed_all(&[b"uciok\r", b"\nreadyok\r\n"]);
        assert_eq!(lines, vec!["uciok", "readyok"]);
        assert!(acc.is_empty());
    }

    #[test]
    fn partial_line_stays_in_backlog() {
        let mut acc = LineAccumulator::new();
        assert!(acc.feed(b"info depth 1\nbestm").len() == 1);
        assert_eq!(acc.backlog(), "bestm");
        assert_eq!(acc.feed(b"ove e2e4\n"), vec!["bestmove e2e4"]);
        assert!(acc.is_empty());
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let text = "h\u{00e9}llo\n".as_bytes();
        // Cut inside the two-byte encoding of the accented e.
        let (lines, _) = feed_all(&[&text[..2], &text[2..]]);
        assert_eq!(lines, vec!["h\u{00e9}llo"]);
    }

    #[test]
    fn empty_lines_are_emitted() {
        let (lines, _) = feed_all(&[b"\n\nx\n"]);
        assert_eq!(lines, vec!["", "", "x"]);
    }

    #[test]
    fn empty_chunk_is_a_no_op() {
        let mut acc = LineAccumulator::new();
        assert!(acc.feed(b"").is_empty());
        assert!(acc.is_empty());
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Incremental multipart stream decoding.
//!
//! Agents deliver the sample stream as `multipart/x-mixed-replace`, one
//! XML document per part:
//!
//! ```text
//! --BOUNDARY\r\n
//! Content-type: text/xml\r\n
//! Content-length: 123\r\n
//! \r\n
//! <MTConnectStreams ...>...</MTConnectStreams>\r\n
//! --BOUNDARY\r\n
//! ...
//! ```
//!
//! [`BoundaryDecoder`] accumulates network bytes and yields one payload
//! per completed part. Parts arrive split across arbitrary read
//! boundaries, so the decoder keeps partial frames buffered until they
//! complete. `Content-length` sizes the payload when present; otherwise
//! the next boundary delimits it.

use bytes::{Buf, BytesMut};

// =============================================================================
// Content-Type helpers
// =============================================================================

/// Extracts the multipart boundary from a `Content-Type` header value.
///
/// Accepts both quoted and bare parameter forms, e.g.
/// `multipart/x-mixed-replace;boundary=ABCD` and `...;boundary="ABCD"`.
pub fn boundary_from_content_type(value: &str) -> Option<String> {
    for param in value.split(';').map(str::trim) {
        if let Some(boundary) = param.strip_prefix("boundary=") {
            let boundary = boundary.trim_matches('"');
            if !boundary.is_empty() {
                return Some(boundary.to_string());
            }
        }
    }
    None
}

// =============================================================================
// BoundaryDecoder
// =============================================================================

/// Incremental decoder for one multipart stream.
#[derive(Debug)]
pub struct BoundaryDecoder {
    buf: BytesMut,
    delimiter: Vec<u8>,
    finished: bool,
}

impl BoundaryDecoder {
    /// Creates a decoder for the given boundary token.
    pub fn new(boundary: &str) -> Self {
        let mut delimiter = Vec::with_capacity(boundary.len() + 2);
        delimiter.extend_from_slice(b"--");
        delimiter.extend_from_slice(boundary.as_bytes());

        Self {
            buf: BytesMut::with_capacity(8 * 1024),
            delimiter,
            finished: false,
        }
    }

    /// Appends network bytes to the internal buffer.
    pub fn extend(&mut self, bytes: &[u8]) {
        if !self.finished {
            self.buf.extend_from_slice(bytes);
        }
    }

    /// Returns `true` once the closing `--BOUNDARY--` marker was seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Yields the next complete payload, if one is buffered.
    pub fn next_payload(&mut self) -> Option<String> {
        loop {
            if self.finished {
                return None;
            }

            // Drop any preamble before the first delimiter.
            let start = find(&self.buf, &self.delimiter)?;
            if start > 0 {
                self.buf.advance(start);
            }

            let after_delim = self.delimiter.len();
            if self.buf.len() < after_delim + 2 {
                return None;
            }

            if &self.buf[after_delim..after_delim + 2] == b"--" {
                self.finished = true;
                self.buf.clear();
                return None;
            }

            // Part headers end at the first blank line.
            let header_end = match find(&self.buf[after_delim..], b"\r\n\r\n") {
                Some(offset) => after_delim + offset + 4,
                None => return None,
            };

            let headers = String::from_utf8_lossy(&self.buf[after_delim..header_end]).to_string();

            if let Some(length) = content_length(&headers) {
                if self.buf.len() < header_end + length {
                    return None;
                }

                let payload =
                    String::from_utf8_lossy(&self.buf[header_end..header_end + length]).to_string();
                self.buf.advance(header_end + length);

                if payload.trim().is_empty() {
                    continue;
                }
                return Some(payload);
            }

            // No length header: the next delimiter ends the payload.
            let next_delim = match find(&self.buf[header_end..], &self.delimiter) {
                Some(offset) => header_end + offset,
                None => return None,
            };

            let payload = String::from_utf8_lossy(&self.buf[header_end..next_delim])
                .trim_end_matches(['\r', '\n'])
                .to_string();
            self.buf.advance(next_delim);

            if payload.trim().is_empty() {
                continue;
            }
            return Some(payload);
        }
    }

    /// Drains a trailing length-less payload once the stream has closed.
    ///
    /// A part without a `Content-length` header is normally terminated by
    /// the next delimiter; when the agent closes the connection instead,
    /// the final payload is recovered here.
    pub fn finish(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }
        self.finished = true;

        let start = find(&self.buf, &self.delimiter)?;
        let after_delim = start + self.delimiter.len();
        let header_end = find(&self.buf[after_delim..], b"\r\n\r\n")? + after_delim + 4;

        let payload = String::from_utf8_lossy(&self.buf[header_end..])
            .trim_end_matches(['\r', '\n'])
            .to_string();
        self.buf.clear();

        if payload.trim().is_empty() {
            None
        } else {
            Some(payload)
        }
    }
}

/// Finds the first occurrence of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Parses a `Content-length` value out of a part's header block.
fn content_length(headers: &str) -> Option<usize> {
    headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "<MTConnectStreams><Streams/></MTConnectStreams>";

    fn frame(boundary: &str, body: &str) -> String {
        format!(
            "--{boundary}\r\nContent-type: text/xml\r\nContent-length: {}\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn test_boundary_from_content_type() {
        assert_eq!(
            boundary_from_content_type("multipart/x-mixed-replace;boundary=ABCD1234"),
            Some("ABCD1234".to_string())
        );
        assert_eq!(
            boundary_from_content_type("multipart/x-mixed-replace; boundary=\"quoted\""),
            Some("quoted".to_string())
        );
        assert_eq!(boundary_from_content_type("text/xml"), None);
        assert_eq!(
            boundary_from_content_type("multipart/x-mixed-replace;boundary="),
            None
        );
    }

    #[test]
    fn test_single_frame() {
        let mut decoder = BoundaryDecoder::new("B");
        decoder.extend(frame("B", BODY).as_bytes());

        assert_eq!(decoder.next_payload().as_deref(), Some(BODY));
        assert_eq!(decoder.next_payload(), None);
    }

    #[test]
    fn test_frame_split_across_reads() {
        let mut decoder = BoundaryDecoder::new("B");
        let frame = frame("B", BODY);
        let (head, tail) = frame.split_at(frame.len() / 2);

        decoder.extend(head.as_bytes());
        assert_eq!(decoder.next_payload(), None);

        decoder.extend(tail.as_bytes());
        assert_eq!(decoder.next_payload().as_deref(), Some(BODY));
    }

    #[test]
    fn test_multiple_frames_in_one_read() {
        let mut decoder = BoundaryDecoder::new("B");
        let two = format!("{}\r\n{}", frame("B", "<a/>"), frame("B", "<b/>"));
        decoder.extend(two.as_bytes());

        assert_eq!(decoder.next_payload().as_deref(), Some("<a/>"));
        assert_eq!(decoder.next_payload().as_deref(), Some("<b/>"));
        assert_eq!(decoder.next_payload(), None);
    }

    #[test]
    fn test_preamble_skipped() {
        let mut decoder = BoundaryDecoder::new("B");
        decoder.extend(b"ignore this preamble\r\n");
        decoder.extend(frame("B", BODY).as_bytes());

        assert_eq!(decoder.next_payload().as_deref(), Some(BODY));
    }

    #[test]
    fn test_frame_without_content_length() {
        let mut decoder = BoundaryDecoder::new("B");
        decoder.extend(b"--B\r\nContent-type: text/xml\r\n\r\n<a/>\r\n");

        // The payload end is unknown until the next delimiter shows up.
        assert_eq!(decoder.next_payload(), None);

        decoder.extend(b"--B\r\nContent-type: text/xml\r\n\r\n");
        assert_eq!(decoder.next_payload().as_deref(), Some("<a/>"));
    }

    #[test]
    fn test_finish_recovers_trailing_payload() {
        let mut decoder = BoundaryDecoder::new("B");
        decoder.extend(b"--B\r\nContent-type: text/xml\r\n\r\n<last/>\r\n");

        assert_eq!(decoder.next_payload(), None);
        assert_eq!(decoder.finish().as_deref(), Some("<last/>"));
        assert!(decoder.is_finished());
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_terminator_finishes_stream() {
        let mut decoder = BoundaryDecoder::new("B");
        decoder.extend(format!("{}\r\n--B--\r\n", frame("B", BODY)).as_bytes());

        assert_eq!(decoder.next_payload().as_deref(), Some(BODY));
        assert_eq!(decoder.next_payload(), None);
        assert!(decoder.is_finished());
    }

    #[test]
    fn test_empty_payload_skipped() {
        let mut decoder = BoundaryDecoder::new("B");
        let empty_then_real = format!("{}{}", frame("B", ""), frame("B", BODY));
        decoder.extend(empty_then_real.as_bytes());

        assert_eq!(decoder.next_payload().as_deref(), Some(BODY));
    }
}

//! Newline-delimited text framing
//!
//! Thin wrapper over `LinesCodec` that changes one thing: an unterminated
//! line left in the buffer at end-of-stream is discarded instead of being
//! yielded as a final line.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

/// Line codec used on both halves of a participant's connection
///
/// Decoding strips the trailing `\n` (and `\r`, if present). Encoding
/// appends `\n`.
#[derive(Debug, Clone)]
pub struct LineCodec {
    inner: LinesCodec,
}

impl LineCodec {
    /// Create a codec that rejects inbound lines longer than `max_length` bytes
    pub fn new(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
        }
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        self.inner.decode(buf)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        match self.inner.decode(buf)? {
            Some(line) => Ok(Some(line)),
            None => {
                // partial line at disconnect
                buf.clear();
                Ok(None)
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = LinesCodecError;

    fn encode(&mut self, line: String, buf: &mut BytesMut) -> Result<(), LinesCodecError> {
        self.inner.encode(line, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_lines() {
        let mut codec = LineCodec::new(1024);
        let mut buf = BytesMut::from("alice\r\nhello\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("alice".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("hello".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_partial_line_waits_for_delimiter() {
        let mut codec = LineCodec::new(1024);
        let mut buf = BytesMut::from("hel");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"lo\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("hello".to_string()));
    }

    #[test]
    fn test_partial_line_discarded_at_eof() {
        let mut codec = LineCodec::new(1024);
        let mut buf = BytesMut::from("done\nunfinished");

        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("done".to_string()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_overlong_line_is_an_error() {
        let mut codec = LineCodec::new(4);
        let mut buf = BytesMut::from("toolong\n");

        assert!(matches!(
            codec.decode(&mut buf),
            Err(LinesCodecError::MaxLineLengthExceeded)
        ));
    }

    #[test]
    fn test_encode_appends_newline() {
        let mut codec = LineCodec::new(1024);
        let mut buf = BytesMut::new();

        codec.encode("alice: hi".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"alice: hi\n");
    }
}

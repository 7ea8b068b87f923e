//! Decoding of YAML byte streams.
//!
//! YAML streams may be UTF-8 or UTF-16 in either byte order. The encoding is told by the byte order
//! mark, or failing that by where the null bytes of the first (ASCII) character fall.

use std::borrow::Cow;
use std::io;
use std::ops::ControlFlow;

use encoding_rs::{Decoder, DecoderResult, Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{Error, Result};

/// A function called on malformed input.
///
/// It receives the length of the malformed sequence, the number of bytes read after it, the input
/// from the start of the malformed sequence, and the output decoded so far. It may push a
/// replacement to the output and continue, or break with an error message.
pub type DecodingCallback = fn(
    malformation_length: u8,
    bytes_read_after_malformation: u8,
    input_at_malformation: &[u8],
    output: &mut String,
) -> ControlFlow<Cow<'static, str>>;

/// What to do with malformed input.
#[derive(Clone, Copy, Debug, Default)]
pub enum DecodingTrap {
    /// Skip the malformed bytes.
    Ignore,
    /// Put U+FFFD in their place.
    Replace,
    /// Fail.
    #[default]
    Strict,
    /// Let a callback decide.
    Call(DecodingCallback),
}

/// Reads a YAML byte stream into a `String`.
///
/// ```
/// # use yaml_stream::decoder::{DecodingTrap, YamlDecoder};
/// let bytes: &[u8] = b"\xEF\xBB\xBFkey: value\n";
/// let text = YamlDecoder::read(bytes)
///     .encoding_trap(DecodingTrap::Strict)
///     .decode()
///     .unwrap();
/// assert_eq!(text, "key: value\n");
/// ```
#[derive(Debug)]
pub struct YamlDecoder<T: io::Read> {
    source: T,
    trap: DecodingTrap,
}

impl<T: io::Read> YamlDecoder<T> {
    /// Decode from `source`.
    pub fn read(source: T) -> YamlDecoder<T> {
        YamlDecoder {
            source,
            trap: DecodingTrap::default(),
        }
    }

    /// Set the behavior on malformed input.
    pub fn encoding_trap(&mut self, trap: DecodingTrap) -> &mut Self {
        self.trap = trap;
        self
    }

    /// Read the whole source and decode it. A byte order mark is not part of the result.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if reading fails and [`Error::Decode`] if the input is malformed and
    /// the trap does not recover.
    pub fn decode(&mut self) -> Result<String> {
        let mut buffer = Vec::new();
        self.source.read_to_end(&mut buffer)?;

        let (encoding, bom_length) = detect_encoding(&buffer);
        let input = &buffer[bom_length..];
        debug_print!("decoding {} bytes as {}", input.len(), encoding.name());

        let mut decoder = encoding.new_decoder_without_bom_handling();
        let capacity = decoder
            .max_utf8_buffer_length_without_replacement(input.len())
            .unwrap_or(input.len());
        let mut output = String::with_capacity(capacity);
        decode_loop(input, &mut output, &mut decoder, self.trap)?;
        Ok(output)
    }
}

/// Pick the encoding and the length of the byte order mark.
fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => (UTF_8, 3),
        [0xFF, 0xFE, ..] => (UTF_16LE, 2),
        [0xFE, 0xFF, ..] => (UTF_16BE, 2),
        [0, b, ..] if *b != 0 => (UTF_16BE, 0),
        [a, 0, ..] if *a != 0 => (UTF_16LE, 0),
        _ => (UTF_8, 0),
    }
}

fn decode_loop(
    mut input: &[u8],
    output: &mut String,
    decoder: &mut Decoder,
    trap: DecodingTrap,
) -> Result<()> {
    let mut offset = 0;
    loop {
        let (result, read) = decoder.decode_to_string_without_replacement(input, output, true);
        match result {
            DecoderResult::InputEmpty => return Ok(()),
            DecoderResult::OutputFull => {
                output.reserve(output.capacity().max(64));
            }
            DecoderResult::Malformed(length, after) => {
                let at = read - usize::from(length) - usize::from(after);
                match trap {
                    DecodingTrap::Strict => {
                        return Err(Error::Decode(format!(
                            "invalid byte sequence at offset {}",
                            offset + at
                        )));
                    }
                    DecodingTrap::Ignore => {}
                    DecodingTrap::Replace => output.push('\u{FFFD}'),
                    DecodingTrap::Call(callback) => {
                        if let ControlFlow::Break(message) =
                            callback(length, after, &input[at..], output)
                        {
                            return Err(Error::Decode(message.into_owned()));
                        }
                    }
                }
            }
        }
        offset += read;
        input = &input[read..];
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn utf16(s: &str, little_endian: bool, bom: bool) -> Vec<u8> {
        let mut bytes = Vec::new();
        let units = bom.then_some(0xFEFF).into_iter().chain(s.encode_utf16());
        for unit in units {
            if little_endian {
                bytes.extend_from_slice(&unit.to_le_bytes());
            } else {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
        }
        bytes
    }

    fn decode(bytes: &[u8], trap: DecodingTrap) -> Result<String> {
        YamlDecoder::read(bytes).encoding_trap(trap).decode()
    }

    #[test]
    fn test_detect_encoding() {
        assert_eq!(detect_encoding(b"\xEF\xBB\xBFa"), (UTF_8, 3));
        assert_eq!(detect_encoding(b"\xFF\xFEa\x00"), (UTF_16LE, 2));
        assert_eq!(detect_encoding(b"\xFE\xFF\x00a"), (UTF_16BE, 2));
        assert_eq!(detect_encoding(b"\x00a"), (UTF_16BE, 0));
        assert_eq!(detect_encoding(b"a\x00"), (UTF_16LE, 0));
        assert_eq!(detect_encoding(b"ab"), (UTF_8, 0));
        assert_eq!(detect_encoding(b""), (UTF_8, 0));
    }

    #[test]
    fn test_utf16() {
        let text = "a: [1, 2]\nb: héllo\n";
        for little_endian in [true, false] {
            for bom in [true, false] {
                let bytes = utf16(text, little_endian, bom);
                assert_eq!(decode(&bytes, DecodingTrap::Strict).unwrap(), text);
            }
        }
    }

    #[test]
    fn test_traps() {
        let bytes = b"a: \xFFb\n";
        assert!(matches!(
            decode(bytes, DecodingTrap::Strict),
            Err(Error::Decode(_))
        ));
        assert_eq!(decode(bytes, DecodingTrap::Ignore).unwrap(), "a: b\n");
        assert_eq!(decode(bytes, DecodingTrap::Replace).unwrap(), "a: \u{FFFD}b\n");

        fn question_mark(_: u8, _: u8, _: &[u8], output: &mut String) -> ControlFlow<Cow<'static, str>> {
            output.push('?');
            ControlFlow::Continue(())
        }
        assert_eq!(
            decode(bytes, DecodingTrap::Call(question_mark)).unwrap(),
            "a: ?b\n"
        );

        fn refuse(_: u8, _: u8, input: &[u8], _: &mut String) -> ControlFlow<Cow<'static, str>> {
            ControlFlow::Break(format!("refused {:#04x}", input[0]).into())
        }
        let err = decode(bytes, DecodingTrap::Call(refuse)).unwrap_err();
        assert_eq!(err.to_string(), "decoding error: refused 0xff");
    }

    #[test]
    fn test_large_input() {
        let text = "- item\n".repeat(10_000);
        assert_eq!(decode(text.as_bytes(), DecodingTrap::Strict).unwrap(), text);
    }
}

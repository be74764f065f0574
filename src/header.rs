//! Per-input parser settings and encoding-aware stream wrapping.
//!
//! A [`Header`] is caller-constructed configuration. It derives serde traits so it
//! round-trips through whatever configuration format the surrounding system uses:
//!
//! ```rust
//! use schema_ingest::header::{Encoding, Header};
//!
//! let header = Header::from_json_str(
//!     r#"{"parser_settings":{"version":"1.0","file_format_type":"csv","encoding":"windows-1252"}}"#,
//! )
//! .unwrap();
//! assert_eq!(header.parser_settings.encoding(), Encoding::Windows1252);
//! ```

use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

use encoding_rs::{CoderResult, Decoder, WINDOWS_1252};
use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};

/// Text encodings an input stream may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "iso-8859-1")]
    Iso8859_1,
    #[serde(rename = "windows-1252")]
    Windows1252,
}

/// Encoding used when [`ParserSettings::encoding`] is not set.
pub const DEFAULT_ENCODING: Encoding = Encoding::Utf8;

impl Encoding {
    pub const ALL: [Encoding; 3] = [Encoding::Utf8, Encoding::Iso8859_1, Encoding::Windows1252];

    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Iso8859_1 => "iso-8859-1",
            Self::Windows1252 => "windows-1252",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| {
                TransformError::Config(format!(
                    "unsupported encoding '{s}' (expected one of: utf-8, iso-8859-1, windows-1252)"
                ))
            })
    }
}

/// Parsing configuration for one input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParserSettings {
    pub version: String,
    pub file_format_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
}

impl ParserSettings {
    pub fn new(version: impl Into<String>, file_format_type: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            file_format_type: file_format_type.into(),
            encoding: None,
        }
    }

    /// Sets the encoding from its configuration name; unknown names are rejected.
    pub fn with_encoding_name(mut self, name: &str) -> TransformResult<Self> {
        self.encoding = Some(name.parse()?);
        Ok(self)
    }

    /// Effective encoding (`utf-8` when unset).
    pub fn encoding(&self) -> Encoding {
        self.encoding.unwrap_or(DEFAULT_ENCODING)
    }

    /// Checks the fields a schema handler relies on.
    pub fn validate(&self) -> TransformResult<()> {
        if self.version.trim().is_empty() {
            return Err(TransformError::Config(
                "parser_settings.version must not be empty".to_string(),
            ));
        }
        if self.file_format_type.trim().is_empty() {
            return Err(TransformError::Config(
                "parser_settings.file_format_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Wraps `input` so that reads yield UTF-8 regardless of the declared encoding.
    pub fn wrap_encoding<R: Read>(&self, input: R) -> DecodingReader<R> {
        DecodingReader::new(input, self.encoding())
    }
}

/// Schema header: the settings that tell a handler how to parse its input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    pub parser_settings: ParserSettings,
}

impl Header {
    pub fn new(parser_settings: ParserSettings) -> Self {
        Self { parser_settings }
    }

    /// Parses a header from JSON. Unknown encoding names fail here.
    pub fn from_json_str(s: &str) -> TransformResult<Self> {
        serde_json::from_str(s).map_err(|e| TransformError::Config(format!("invalid header: {e}")))
    }

    pub fn to_json_string(&self) -> TransformResult<String> {
        serde_json::to_string(self).map_err(|e| TransformError::Config(format!("invalid header: {e}")))
    }
}

const READ_CHUNK: usize = 8 * 1024;

enum Transcoder {
    Passthrough,
    Latin1,
    Decoder(Decoder),
}

/// A reader that transcodes its inner stream to UTF-8.
pub struct DecodingReader<R> {
    inner: R,
    transcoder: Transcoder,
    raw: Vec<u8>,
    pending: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl<R: Read> DecodingReader<R> {
    pub fn new(inner: R, encoding: Encoding) -> Self {
        let transcoder = match encoding {
            Encoding::Utf8 => Transcoder::Passthrough,
            Encoding::Iso8859_1 => Transcoder::Latin1,
            Encoding::Windows1252 => Transcoder::Decoder(WINDOWS_1252.new_decoder_without_bom_handling()),
        };
        Self {
            inner,
            transcoder,
            raw: vec![0; READ_CHUNK],
            pending: Vec::new(),
            pos: 0,
            finished: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    // Refills `pending`; returns false once the inner stream and the decoder are drained.
    fn fill(&mut self) -> io::Result<bool> {
        while self.pos >= self.pending.len() {
            if self.finished {
                return Ok(false);
            }
            self.pending.clear();
            self.pos = 0;

            let n = self.inner.read(&mut self.raw)?;
            let last = n == 0;
            let chunk = &self.raw[..n];
            match &mut self.transcoder {
                Transcoder::Passthrough => self.pending.extend_from_slice(chunk),
                Transcoder::Latin1 => {
                    self.pending
                        .extend_from_slice(encoding_rs::mem::decode_latin1(chunk).as_bytes());
                }
                Transcoder::Decoder(decoder) => decode_into(decoder, chunk, last, &mut self.pending),
            }
            if last {
                self.finished = true;
            }
        }
        Ok(true)
    }
}

fn decode_into(decoder: &mut Decoder, mut src: &[u8], last: bool, out: &mut Vec<u8>) {
    let mut buf = vec![0u8; decoder.max_utf8_buffer_length(src.len()).unwrap_or(src.len() * 3 + 16)];
    loop {
        let (result, read, written, _) = decoder.decode_to_utf8(src, &mut buf, last);
        out.extend_from_slice(&buf[..written]);
        src = &src[read..];
        match result {
            CoderResult::InputEmpty => break,
            CoderResult::OutputFull => {}
        }
    }
}

impl<R: Read> Read for DecodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if matches!(self.transcoder, Transcoder::Passthrough) {
            return self.inner.read(buf);
        }
        if buf.is_empty() || !self.fill()? {
            return Ok(0);
        }
        let available = &self.pending[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl<R> fmt::Debug for DecodingReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoding = match self.transcoder {
            Transcoder::Passthrough => Encoding::Utf8,
            Transcoder::Latin1 => Encoding::Iso8859_1,
            Transcoder::Decoder(_) => Encoding::Windows1252,
        };
        f.debug_struct("DecodingReader")
            .field("encoding", &encoding)
            .field("buffered", &(self.pending.len() - self.pos))
            .field("finished", &self.finished)
            .finish()
    }
}

use std::any::Any;
use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::{CtxAwareErr, TransformError};

/// One raw record produced by an [`Ingester`].
///
/// Created fresh per successful read and owned by the caller afterwards.
pub trait RawRecord {
    /// The raw payload; concrete ingesters document what type to downcast to.
    fn raw(&self) -> &dyn Any;

    /// Stable digest of the raw payload, used for dedup/resume.
    fn checksum(&self) -> String;
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn checksum_of(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// A [`RawRecord`] whose payload is a byte buffer (`raw()` downcasts to `Vec<u8>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesRecord {
    bytes: Vec<u8>,
    checksum: String,
}

impl BytesRecord {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let checksum = checksum_of(&bytes);
        Self { bytes, checksum }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl RawRecord for BytesRecord {
    fn raw(&self) -> &dyn Any {
        &self.bytes
    }

    fn checksum(&self) -> String {
        self.checksum.clone()
    }
}

/// A successful read: the record plus the raw input bytes it was built from.
pub struct Ingested {
    pub record: Box<dyn RawRecord>,
    pub raw: Vec<u8>,
}

impl Ingested {
    pub fn new(record: impl RawRecord + 'static, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            record: Box::new(record),
            raw: raw.into(),
        }
    }
}

impl fmt::Debug for Ingested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ingested")
            .field("checksum", &self.record.checksum())
            .field("raw_len", &self.raw.len())
            .finish()
    }
}

/// A failed read: the error plus whatever raw bytes were consumed before failing.
#[derive(Debug)]
pub struct ReadFailure {
    pub error: TransformError,
    pub raw: Vec<u8>,
}

impl ReadFailure {
    pub fn new(error: TransformError, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            error,
            raw: raw.into(),
        }
    }

    /// The clean end-of-input sentinel.
    pub fn end_of_input() -> Self {
        TransformError::EndOfInput.into()
    }

    pub fn is_end_of_input(&self) -> bool {
        self.error.is_end_of_input()
    }
}

impl From<TransformError> for ReadFailure {
    fn from(error: TransformError) -> Self {
        Self {
            error,
            raw: Vec::new(),
        }
    }
}

impl From<std::io::Error> for ReadFailure {
    fn from(error: std::io::Error) -> Self {
        TransformError::from(error).into()
    }
}

/// Pull-based record reader bound to one input stream and one [`crate::Ctx`].
///
/// `read` is called sequentially by a single caller. On failure the caller first checks
/// for the end-of-input sentinel, then asks [`Ingester::is_continuable_error`]: if it
/// returns true the ingester has already skipped past the bad segment and `read` may be
/// called again; otherwise the ingester is finished.
///
/// Errors returned from `read` should be built with [`CtxAwareErr::fmt_err`] so they
/// carry the input name and position.
pub trait Ingester: CtxAwareErr {
    fn read(&mut self) -> Result<Ingested, ReadFailure>;

    fn is_continuable_error(&self, err: &TransformError) -> bool;
}

#[cfg(test)]
mod tests {
    use super::{checksum_of, BytesRecord, RawRecord, ReadFailure};

    #[test]
    fn checksum_is_sha256_hex() {
        assert_eq!(
            checksum_of(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn bytes_record_downcasts_to_vec() {
        let rec = BytesRecord::new("a,b");
        assert_eq!(rec.raw().downcast_ref::<Vec<u8>>(), Some(&b"a,b".to_vec()));
        assert_eq!(rec.checksum(), BytesRecord::new(b"a,b".to_vec()).checksum());
        assert_ne!(rec.checksum(), BytesRecord::new("a,c").checksum());
    }

    #[test]
    fn end_of_input_failure() {
        let f = ReadFailure::end_of_input();
        assert!(f.is_end_of_input());
        assert!(f.raw.is_empty());
    }
}

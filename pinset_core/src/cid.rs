//! Content identifiers.
//!
//! A [`Cid`] is a version-1 content identifier carrying a codec tag and a
//! BLAKE3 multihash. Binary layout:
//!
//! ```text
//! 0x01 | codec | 0x1e (blake3) | 0x20 (digest length) | 32 digest bytes
//! ```
//!
//! The string form is multibase; base32-lower is used when formatting.

use std::fmt;
use std::str::FromStr;

const CID_VERSION: u8 = 0x01;
const MULTIHASH_BLAKE3: u8 = 0x1e;
const DIGEST_LEN: u8 = 0x20;
const ENCODED_LEN: usize = 4 + DIGEST_LEN as usize;

#[derive(thiserror::Error, Debug)]
pub enum CidError {
    #[error("invalid multibase string: {0}")]
    Multibase(#[from] multibase::Error),
    #[error("invalid length: expected 36 bytes, got {0}")]
    InvalidLength(usize),
    #[error("unsupported cid version {0:#x}")]
    UnsupportedVersion(u8),
    #[error("unknown codec {0:#x}")]
    UnknownCodec(u8),
    #[error("invalid multihash type: expected {0:#x}, got {1:#x}")]
    InvalidMultihashType(u8, u8),
    #[error("invalid digest length: expected {0}, got {1}")]
    InvalidDigestLength(u8, u8),
}

/// Content codec of the object a [`Cid`] points at.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Codec {
    /// Opaque bytes without links.
    Raw,
    /// A CBOR-encoded node that may link to other objects.
    DagCbor,
}

impl Codec {
    pub const fn code(self) -> u8 {
        match self {
            Codec::Raw => 0x55,
            Codec::DagCbor => 0x71,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, CidError> {
        match code {
            0x55 => Ok(Codec::Raw),
            0x71 => Ok(Codec::DagCbor),
            other => Err(CidError::UnknownCodec(other)),
        }
    }
}

/// Identifier for a content-addressed object.
///
/// ```
/// use pinset_core::{Cid, cid::Codec};
///
/// let id = Cid::new(Codec::Raw, b"hello");
/// let parsed: Cid = id.to_string().parse().unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cid {
    codec: Codec,
    digest: [u8; 32],
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cid").field(&self.to_string()).finish()
    }
}

impl Cid {
    /// Hashes `data` and returns the identifier for it under `codec`.
    pub fn new(codec: Codec, data: impl AsRef<[u8]>) -> Self {
        Self::from_digest(codec, *blake3::hash(data.as_ref()).as_bytes())
    }

    /// Shorthand for [`Cid::new`] with [`Codec::Raw`].
    pub fn raw(data: impl AsRef<[u8]>) -> Self {
        Self::new(Codec::Raw, data)
    }

    pub const fn from_digest(codec: Codec, digest: [u8; 32]) -> Self {
        Self { codec, digest }
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn parse(s: &str) -> Result<Self, CidError> {
        let (_, bytes) = multibase::decode(s)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CidError> {
        if bytes.len() != ENCODED_LEN {
            return Err(CidError::InvalidLength(bytes.len()));
        }
        if bytes[0] != CID_VERSION {
            return Err(CidError::UnsupportedVersion(bytes[0]));
        }
        let codec = Codec::from_code(bytes[1])?;
        if bytes[2] != MULTIHASH_BLAKE3 {
            return Err(CidError::InvalidMultihashType(MULTIHASH_BLAKE3, bytes[2]));
        }
        if bytes[3] != DIGEST_LEN {
            return Err(CidError::InvalidDigestLength(DIGEST_LEN, bytes[3]));
        }

        let digest: [u8; 32] = bytes[4..]
            .try_into()
            .map_err(|_| CidError::InvalidLength(bytes.len()))?;
        Ok(Self { codec, digest })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ENCODED_LEN);
        out.extend_from_slice(&[CID_VERSION, self.codec.code(), MULTIHASH_BLAKE3, DIGEST_LEN]);
        out.extend_from_slice(&self.digest);
        out
    }

    pub fn to_base32(&self) -> String {
        multibase::encode(multibase::Base::Base32Lower, self.to_bytes())
    }

    /// First five digest bytes in hex, for log lines.
    pub fn fmt_short(&self) -> String {
        self.digest[..5].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base32())
    }
}

impl FromStr for Cid {
    type Err = CidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cid::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(bytes: &[u8]) -> String {
        multibase::encode(multibase::Base::Base32Lower, bytes)
    }

    #[test]
    fn test_cid_string_roundtrip() {
        let id = Cid::new(Codec::DagCbor, b"node");
        let s = id.to_string();
        assert!(s.starts_with('b'));
        assert_eq!(Cid::parse(&s).unwrap(), id);
        assert_eq!(id.to_bytes().len(), ENCODED_LEN);
    }

    #[test]
    fn test_cid_accepts_other_multibases() {
        let id = Cid::raw(b"hello");
        let b58 = multibase::encode(multibase::Base::Base58Btc, id.to_bytes());
        assert_eq!(Cid::parse(&b58).unwrap(), id);
    }

    #[test]
    fn test_cid_codec_is_part_of_identity() {
        assert_ne!(Cid::new(Codec::Raw, b"x"), Cid::new(Codec::DagCbor, b"x"));
    }

    #[test]
    fn test_cid_digest_is_blake3() {
        let id = Cid::raw(b"hello");
        assert_eq!(id.digest(), blake3::hash(b"hello").as_bytes());
        assert_eq!(id.fmt_short().len(), 10);
    }

    #[test]
    fn test_cid_error_too_short() {
        let result = Cid::parse(&encoded(&[CID_VERSION, 0x55]));
        assert!(matches!(result, Err(CidError::InvalidLength(2))));
    }

    #[test]
    fn test_cid_error_version() {
        let mut bytes = Cid::raw(b"a").to_bytes();
        bytes[0] = 0x00;
        let result = Cid::parse(&encoded(&bytes));
        assert!(matches!(result, Err(CidError::UnsupportedVersion(0))));
    }

    #[test]
    fn test_cid_error_codec() {
        let mut bytes = Cid::raw(b"a").to_bytes();
        bytes[1] = 0x70;
        let result = Cid::from_bytes(&bytes);
        assert!(matches!(result, Err(CidError::UnknownCodec(0x70))));
    }

    #[test]
    fn test_cid_error_multihash() {
        let mut bytes = Cid::raw(b"a").to_bytes();
        bytes[2] = 0x12;
        let result = Cid::from_bytes(&bytes);
        assert!(matches!(result, Err(CidError::InvalidMultihashType(_, 0x12))));
    }

    #[test]
    fn test_cid_error_not_multibase() {
        assert!(matches!(Cid::parse(""), Err(CidError::Multibase(_))));
    }
}

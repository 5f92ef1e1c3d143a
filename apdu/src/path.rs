// Copyright (c) 2022-2023 The MobileCoin Foundation

//! BIP32 path encoding for IOV keys
//!
//! IOV keys live at `m/44'/234'/index'`, all components hardened.
//!
//! ## Encoding
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                  PURPOSE (44', little-endian)                 |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                 COIN_TYPE (234', little-endian)               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                   INDEX (index', little-endian)               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use core::{fmt, num::IntErrorKind, str::FromStr};

use byteorder::{ByteOrder, LittleEndian};
use encdec::{DecodeOwned, Encode};

use crate::ApduError;

/// BIP44 purpose
pub const BIP44_PURPOSE: u32 = 44;

/// IOV registered coin type
pub const IOV_COIN_TYPE: u32 = 234;

/// Hardened derivation offset
pub const HARDENED: u32 = 0x8000_0000;

/// Encoded path length in bytes
pub const PATH_LEN: usize = 12;

/// Harden an index by adding [HARDENED]
///
/// Callers must pass an index below [HARDENED], see [PathIndex].
const fn harden(index: u32) -> u32 {
    HARDENED + index
}

/// Account index, guaranteed to lie in `0..=2^31 - 1`
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct PathIndex(u32);

impl PathIndex {
    /// Largest valid (unhardened) index
    pub const MAX: PathIndex = PathIndex(HARDENED - 1);

    /// Create a new index, failing for values that would not survive hardening
    pub const fn new(index: u32) -> Result<Self, ApduError> {
        if index >= HARDENED {
            return Err(ApduError::IndexOutOfRange);
        }
        Ok(Self(index))
    }

    /// Recover an index from an already hardened word
    pub const fn from_hardened(word: u32) -> Result<Self, ApduError> {
        if word < HARDENED {
            return Err(ApduError::IndexOutOfRange);
        }
        Ok(Self(word - HARDENED))
    }

    /// Fetch the raw (unhardened) index
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Fetch the hardened path word
    pub const fn hardened(&self) -> u32 {
        harden(self.0)
    }
}

impl TryFrom<u32> for PathIndex {
    type Error = ApduError;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}

impl TryFrom<i64> for PathIndex {
    type Error = ApduError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match u32::try_from(v) {
            Ok(v) => Self::new(v),
            Err(_) => Err(ApduError::IndexOutOfRange),
        }
    }
}

impl From<PathIndex> for u32 {
    fn from(i: PathIndex) -> Self {
        i.0
    }
}

/// Parse a decimal index, rejecting fractional, negative and out-of-range input
impl FromStr for PathIndex {
    type Err = ApduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        match i64::from_str(s) {
            Ok(v) => Self::try_from(v),
            // Integers too wide for i64 are out of range rather than malformed
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    Err(ApduError::IndexOutOfRange)
                }
                _ => Err(ApduError::NotAnInteger),
            },
        }
    }
}

impl fmt::Display for PathIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// IOV BIP32 path, `m/44'/234'/index'`
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Bip32Path {
    words: [u32; 3],
}

impl Bip32Path {
    /// Create the IOV path for the provided account index
    pub const fn iov(index: PathIndex) -> Self {
        Self {
            words: [harden(BIP44_PURPOSE), harden(IOV_COIN_TYPE), index.hardened()],
        }
    }

    /// Fetch hardened path words
    pub const fn words(&self) -> &[u32; 3] {
        &self.words
    }

    /// Fetch the account index for this path
    pub const fn index(&self) -> PathIndex {
        PathIndex(self.words[2] - HARDENED)
    }

    /// Serialize the path to wire bytes
    pub fn to_bytes(&self) -> [u8; PATH_LEN] {
        let mut b = [0u8; PATH_LEN];
        LittleEndian::write_u32_into(&self.words, &mut b);
        b
    }
}

impl From<PathIndex> for Bip32Path {
    fn from(index: PathIndex) -> Self {
        Self::iov(index)
    }
}

impl fmt::Display for Bip32Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for w in self.words {
            write!(f, "/{}'", w - HARDENED)?;
        }
        Ok(())
    }
}

impl Encode for Bip32Path {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(PATH_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < PATH_LEN {
            return Err(ApduError::InvalidLength);
        }

        buff[..PATH_LEN].copy_from_slice(&self.to_bytes());

        Ok(PATH_LEN)
    }
}

impl DecodeOwned for Bip32Path {
    type Output = Self;

    type Error = ApduError;

    /// Decode a path, rejecting anything but `m/44'/234'/index'`
    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < PATH_LEN {
            return Err(ApduError::InvalidLength);
        }

        let mut words = [0u32; 3];
        LittleEndian::read_u32_into(&buff[..PATH_LEN], &mut words);

        if words[0] != harden(BIP44_PURPOSE) || words[1] != harden(IOV_COIN_TYPE) {
            return Err(ApduError::InvalidEncoding);
        }

        let index =
            PathIndex::from_hardened(words[2]).map_err(|_| ApduError::InvalidEncoding)?;

        Ok((Self::iov(index), PATH_LEN))
    }
}

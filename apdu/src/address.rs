// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address APDUs, for fetching the ed25519 public key and address for a path

use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, Instruction, IOV_APDU_CLA};
use crate::path::{Bip32Path, PATH_LEN};

/// Ed25519 public key length
pub const PUBLIC_KEY_LEN: usize = 32;

/// Address request APDU.
///
/// Requests the public key and address for an IOV BIP32 path,
/// optionally requiring on-device confirmation (`P1 = 1`).
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                      BIP32_PATH (12 bytes)                    /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AddressReq {
    /// Key derivation path
    pub path: Bip32Path,
    /// Require user confirmation on the device
    pub confirm: bool,
}

impl AddressReq {
    /// Create a new [AddressReq] APDU
    pub fn new(path: Bip32Path, confirm: bool) -> Self {
        Self { path, confirm }
    }
}

impl ApduStatic for AddressReq {
    const CLA: u8 = IOV_APDU_CLA;
    const INS: u8 = Instruction::GetAddrEd25519 as u8;

    fn p1(&self) -> u8 {
        self.confirm as u8
    }
}

impl Encode for AddressReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(PATH_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        self.path.encode(buff)
    }
}

/// Address response APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                       ED25519_PUBLIC_KEY                      /
/// /                           (32 bytes)                          /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                         ADDRESS (ASCII)                       /
/// /                 (variable length, to end of payload)          /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AddressResp<'a> {
    /// Ed25519 public key
    pub public_key: [u8; PUBLIC_KEY_LEN],
    /// Bech32 address
    pub address: &'a str,
}

impl<'a> AddressResp<'a> {
    /// Create a new [AddressResp] APDU
    pub fn new(public_key: [u8; PUBLIC_KEY_LEN], address: &'a str) -> Self {
        Self {
            public_key,
            address,
        }
    }
}

impl<'a> Encode for AddressResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(PUBLIC_KEY_LEN + self.address.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.encode_len()?;
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        buff[..PUBLIC_KEY_LEN].copy_from_slice(&self.public_key);
        buff[PUBLIC_KEY_LEN..n].copy_from_slice(self.address.as_bytes());

        Ok(n)
    }
}

impl<'a> Decode<'a> for AddressResp<'a> {
    type Output = Self;
    type Error = ApduError;

    /// Decode an [AddressResp], consuming the whole buffer
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < PUBLIC_KEY_LEN {
            return Err(ApduError::InvalidLength);
        }

        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(&buff[..PUBLIC_KEY_LEN]);

        let a = &buff[PUBLIC_KEY_LEN..];
        if !a.is_ascii() {
            return Err(ApduError::InvalidUtf8);
        }
        let address = core::str::from_utf8(a).map_err(|_| ApduError::InvalidUtf8)?;

        Ok((
            Self {
                public_key,
                address,
            },
            buff.len(),
        ))
    }
}

// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Raw APDU response framing
//!
//! ```text
//! +----------------------------+-------+-------+
//! | PAYLOAD (operation defined) |  SW1  |  SW2  |
//! +----------------------------+-------+-------+
//! ```
//!
//! The status word is always the final two bytes (big-endian).

use encdec::{Decode, Encode};

use crate::{status::StatusWord, ApduError};

/// Status word length in bytes
pub const STATUS_LEN: usize = 2;

/// APDU response, split into payload and trailing status word
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ApduResponse<'a> {
    /// Operation-specific payload
    pub payload: &'a [u8],
    /// Trailing status word
    pub status: StatusWord,
}

impl<'a> ApduResponse<'a> {
    /// Create a new response
    pub fn new(payload: &'a [u8], status: impl Into<StatusWord>) -> Self {
        Self {
            payload,
            status: status.into(),
        }
    }

    /// Split a raw response into payload and status word
    pub fn parse(buff: &'a [u8]) -> Result<Self, ApduError> {
        Self::decode(buff).map(|(r, _)| r)
    }

    /// Decode the payload as an ASCII diagnostic string, if present and valid
    pub fn diagnostic(&self) -> Option<&'a str> {
        if self.payload.is_empty() || !self.payload.is_ascii() {
            return None;
        }
        core::str::from_utf8(self.payload).ok()
    }
}

impl<'a> Encode for ApduResponse<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(self.payload.len() + STATUS_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.payload.len();
        if buff.len() < n + STATUS_LEN {
            return Err(ApduError::InvalidLength);
        }

        buff[..n].copy_from_slice(self.payload);
        buff[n..][..STATUS_LEN].copy_from_slice(&self.status.to_be_bytes());

        Ok(n + STATUS_LEN)
    }
}

impl<'a> Decode<'a> for ApduResponse<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < STATUS_LEN {
            return Err(ApduError::MalformedResponse);
        }

        let n = buff.len() - STATUS_LEN;
        let status = StatusWord::from_be_bytes([buff[n], buff[n + 1]]);

        Ok((
            Self {
                payload: &buff[..n],
                status,
            },
            buff.len(),
        ))
    }
}

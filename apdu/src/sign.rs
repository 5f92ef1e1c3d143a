// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Sign APDUs, carrying one planned [Frame] per exchange
//!
//! See [chunk][crate::chunk] for frame planning.

use encdec::Encode;

use super::{ApduError, ApduStatic, Instruction, IOV_APDU_CLA};
use crate::{chunk::Frame, CHUNK_SIZE};

/// Ed25519 signature length
pub const SIGNATURE_LEN: usize = 64;

/// Sign chunk request APDU
///
/// `P1` carries the (1-based) frame position, `P2` the total frame count.
/// The first frame carries the encoded BIP32 path, following frames carry
/// consecutive message fragments.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                       FRAME_DATA (<= 250 bytes)               /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignChunkReq<'a> {
    /// Frame position (1-based)
    pub position: u8,
    /// Total frame count
    pub count: u8,
    /// Frame payload
    pub data: &'a [u8],
}

impl<'a> From<Frame<'a>> for SignChunkReq<'a> {
    fn from(f: Frame<'a>) -> Self {
        Self {
            position: f.position,
            count: f.count,
            data: f.data,
        }
    }
}

impl<'a> ApduStatic for SignChunkReq<'a> {
    const CLA: u8 = IOV_APDU_CLA;
    const INS: u8 = Instruction::SignEd25519 as u8;

    fn p1(&self) -> u8 {
        self.position
    }

    fn p2(&self) -> u8 {
        self.count
    }
}

impl<'a> Encode for SignChunkReq<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(self.data.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.data.len();
        if n > CHUNK_SIZE || buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        buff[..n].copy_from_slice(self.data);

        Ok(n)
    }
}

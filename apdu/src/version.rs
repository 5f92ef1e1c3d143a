// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application version APDUs

use encdec::{DecodeOwned, Encode};

use super::{ApduError, ApduStatic, Instruction, IOV_APDU_CLA};

/// Fetch application version APDU
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct VersionReq {}

impl ApduStatic for VersionReq {
    /// Version command APDU is class `0x22`
    const CLA: u8 = IOV_APDU_CLA;

    /// Version GET APDU is instruction `0x00`
    const INS: u8 = Instruction::GetVersion as u8;
}

impl Encode for VersionReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

impl DecodeOwned for VersionReq {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(_buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        Ok((Self {}, 0))
    }
}

/// Application version response APDU
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   TEST_MODE   |     MAJOR     |     MINOR     |     PATCH     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    LOCKED     |
/// +-+-+-+-+-+-+-+-+
/// ```
///
/// `TEST_MODE` is set for any non-zero value, `LOCKED` only for `1`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct VersionResp {
    /// App built in test mode
    pub test_mode: bool,
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Patch version
    pub patch: u8,
    /// Device locked
    pub device_locked: bool,
}

impl VersionResp {
    /// Encoded response length
    pub const LEN: usize = 5;
}

impl Encode for VersionResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(Self::LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < Self::LEN {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.test_mode as u8;
        buff[1] = self.major;
        buff[2] = self.minor;
        buff[3] = self.patch;
        buff[4] = self.device_locked as u8;

        Ok(Self::LEN)
    }
}

impl DecodeOwned for VersionResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < Self::LEN {
            return Err(ApduError::InvalidLength);
        }

        let v = Self {
            test_mode: buff[0] != 0,
            major: buff[1],
            minor: buff[2],
            patch: buff[3],
            device_locked: buff[4] == 1,
        };

        Ok((v, Self::LEN))
    }
}

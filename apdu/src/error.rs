// Copyright (c) 2022-2023 The MobileCoin Foundation

/// APDU encoding, decoding and argument errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum ApduError {
    /// Buffer too short for encode / decode
    #[cfg_attr(feature = "thiserror", error("Invalid buffer length"))]
    InvalidLength,

    /// Field contents could not be decoded
    #[cfg_attr(feature = "thiserror", error("Invalid encoding"))]
    InvalidEncoding,

    /// String field is not valid UTF-8 / ASCII
    #[cfg_attr(feature = "thiserror", error("Invalid string encoding"))]
    InvalidUtf8,

    /// Index input is not an integer
    #[cfg_attr(feature = "thiserror", error("Input must be an integer"))]
    NotAnInteger,

    /// Index input is negative or exceeds 2^31 - 1
    #[cfg_attr(feature = "thiserror", error("Index is out of range"))]
    IndexOutOfRange,

    /// Message requires more frames than can be signalled in P2
    #[cfg_attr(feature = "thiserror", error("Message too long ({0} bytes)"))]
    MessageTooLong(usize),

    /// Response too short to contain a status word
    #[cfg_attr(feature = "thiserror", error("Response too short to cut status code"))]
    MalformedResponse,
}

impl From<encdec::Error> for ApduError {
    fn from(e: encdec::Error) -> Self {
        match e {
            encdec::Error::Length => ApduError::InvalidLength,
            #[allow(unreachable_patterns)]
            _ => ApduError::InvalidEncoding,
        }
    }
}

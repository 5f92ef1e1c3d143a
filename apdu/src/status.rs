// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Status words returned by the IOV app
//!
//! Every response ends with a big-endian 16-bit [StatusWord]. Known values map to a
//! [StatusCode] with a fixed description, anything else renders as
//! `Unknown Status Code: N`.

use core::fmt::{self, Display};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::EnumIter;

/// Known IOV / ledger status codes
#[derive(Copy, Clone, PartialEq, Eq, Debug, EnumIter, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum StatusCode {
    U2fUnknown = 0x0001,
    U2fBadRequest = 0x0002,
    U2fConfigurationUnsupported = 0x0003,
    U2fDeviceIneligible = 0x0004,
    U2fTimeout = 0x0005,
    Timeout = 0x000e,
    Success = 0x9000,
    DeviceBusy = 0x9001,
    KeyDerivation = 0x6802,
    ExecutionError = 0x6400,
    WrongLength = 0x6700,
    EmptyBuffer = 0x6982,
    OutputBufferTooSmall = 0x6983,
    DataInvalid = 0x6984,
    ConditionsNotSatisfied = 0x6985,
    TransactionRejected = 0x6986,
    BadKeyHandle = 0x6a80,
    InvalidP1P2 = 0x6b00,
    InsNotSupported = 0x6d00,
    AppNotOpen = 0x6e00,
    UnknownError = 0x6f00,
    SignVerifyError = 0x6f01,
}

impl StatusCode {
    /// Fixed human-readable description
    pub const fn description(&self) -> &'static str {
        use StatusCode::*;

        match self {
            U2fUnknown => "U2F: Unknown",
            U2fBadRequest => "U2F: Bad request",
            U2fConfigurationUnsupported => "U2F: Configuration unsupported",
            U2fDeviceIneligible => "U2F: Device Ineligible",
            U2fTimeout => "U2F: Timeout",
            Timeout => "Timeout",
            Success => "No errors",
            DeviceBusy => "Device is busy",
            KeyDerivation => "Error deriving keys",
            ExecutionError => "Execution Error",
            WrongLength => "Wrong Length",
            EmptyBuffer => "Empty Buffer",
            OutputBufferTooSmall => "Output buffer too small",
            DataInvalid => "Data is invalid",
            ConditionsNotSatisfied => "Conditions not satisfied",
            TransactionRejected => "Transaction rejected",
            BadKeyHandle => "Bad key handle",
            InvalidP1P2 => "Invalid P1/P2",
            InsNotSupported => "Instruction not supported",
            AppNotOpen => "Ledger app does not seem to be open",
            UnknownError => "Unknown error",
            SignVerifyError => "Sign/verify error",
        }
    }

    /// Codes for which the app attaches an ASCII diagnostic to the response payload
    pub const fn has_diagnostic(&self) -> bool {
        matches!(self, StatusCode::BadKeyHandle | StatusCode::DataInvalid)
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Raw status word as received from the device
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct StatusWord(pub u16);

impl StatusWord {
    /// Success status word (`0x9000`)
    pub const SUCCESS: StatusWord = StatusWord(StatusCode::Success as u16);

    /// Build a status word from trailing (big-endian) response bytes
    pub const fn from_be_bytes(b: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(b))
    }

    /// Fetch status word bytes for encoding
    pub const fn to_be_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Resolve the known [StatusCode], if any
    pub fn code(&self) -> Option<StatusCode> {
        StatusCode::try_from(self.0).ok()
    }

    /// Check whether this is the success status word
    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }

    /// Check whether the response payload carries a diagnostic string
    pub fn has_diagnostic(&self) -> bool {
        self.code().map(|c| c.has_diagnostic()).unwrap_or(false)
    }
}

impl From<u16> for StatusWord {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

impl From<StatusCode> for StatusWord {
    fn from(c: StatusCode) -> Self {
        Self(c.into())
    }
}

impl From<StatusWord> for u16 {
    fn from(s: StatusWord) -> Self {
        s.0
    }
}

/// Renders the registry description, or `Unknown Status Code: N` for unknown words
impl Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(c) => write!(f, "{}", c),
            None => write!(f, "Unknown Status Code: {}", self.0),
        }
    }
}

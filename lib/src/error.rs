// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_iov_apdu::ApduError;
use tokio::time::error::Elapsed;

use crate::transport::TransportError;

/// Ledger IOV API Error Type
///
/// Device-reported status words are _not_ errors, these are returned
/// as data in the operation results.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HID Init Error
    #[error("could not create HidApi instance")]
    HidInit,

    /// No matching device
    #[error("No device found")]
    NoDevice,

    /// Transport (channel) error
    #[error("Transport error: {0}")]
    Transport(anyhow::Error),

    /// Invalid local argument (path index, message length)
    #[error("Invalid argument: {0}")]
    InvalidArgument(ApduError),

    /// Response could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(ApduError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request timeout
    #[error("Timeout waiting for device response")]
    RequestTimeout,
}

impl Error {
    /// Classify a transport failure, answers rejected for lacking a status
    /// word (an [ApduError] source) are malformed responses
    pub(crate) fn from_transport(e: impl Into<anyhow::Error>) -> Self {
        let e = e.into();

        match e.chain().find_map(|c| c.downcast_ref::<ApduError>()) {
            Some(a) => Error::MalformedResponse(*a),
            None => Error::Transport(e),
        }
    }
}

impl From<Elapsed> for Error {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::from_transport(e)
    }
}

#[cfg(feature = "transport_hid")]
impl From<hidapi::HidError> for Error {
    fn from(_: hidapi::HidError) -> Self {
        Error::HidInit
    }
}

#[cfg(feature = "transport_hid")]
impl From<crate::transport::LedgerHIDError> for Error {
    fn from(e: crate::transport::LedgerHIDError) -> Self {
        match e {
            crate::transport::LedgerHIDError::DeviceNotFound => Error::NoDevice,
            e => Error::Transport(e.into()),
        }
    }
}

#[cfg(feature = "transport_tcp")]
impl From<crate::transport::TcpError> for Error {
    fn from(e: crate::transport::TcpError) -> Self {
        Error::from_transport(e)
    }
}

//! Generic transport abstraction for hiding underlying transport types
//!
// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::ops::Deref;

use async_trait::async_trait;
use ledger_transport::{APDUAnswer, APDUCommand, Exchange};

#[cfg(feature = "transport_hid")]
pub use ledger_transport_hid::{LedgerHIDError, TransportNativeHID};

#[cfg(feature = "transport_tcp")]
mod tcp;
#[cfg(feature = "transport_tcp")]
pub use tcp::{TcpError, TcpOptions, TransportTcp};

use strum::Display;

/// Generic ledger device (abstract over transport types)
#[derive(Display)]
#[non_exhaustive]
pub enum GenericTransport {
    #[cfg(feature = "transport_hid")]
    Hid(TransportNativeHID),
    #[cfg(feature = "transport_tcp")]
    Tcp(TransportTcp),
}

/// Errors from the underlying transports
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    #[cfg(feature = "transport_hid")]
    #[error("HID: {0}")]
    Hid(#[from] LedgerHIDError),

    #[cfg(feature = "transport_tcp")]
    #[error("TCP: {0}")]
    Tcp(#[from] TcpError),
}

/// Convert a HID transport into a generic transport
#[cfg(feature = "transport_hid")]
impl From<TransportNativeHID> for GenericTransport {
    fn from(t: TransportNativeHID) -> Self {
        Self::Hid(t)
    }
}

/// Convert a TCP transport into a generic transport
#[cfg(feature = "transport_tcp")]
impl From<TransportTcp> for GenericTransport {
    fn from(t: TransportTcp) -> Self {
        Self::Tcp(t)
    }
}

/// Implementation of [Exchange] for [GenericTransport], hiding transport error types
#[async_trait]
impl Exchange for GenericTransport {
    type Error = TransportError;
    type AnswerType = Vec<u8>;

    async fn exchange<I>(
        &self,
        command: &APDUCommand<I>,
    ) -> Result<APDUAnswer<Self::AnswerType>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync,
    {
        let r = match self {
            #[cfg(feature = "transport_hid")]
            Self::Hid(t) => t.exchange(command).await?,
            #[cfg(feature = "transport_tcp")]
            Self::Tcp(t) => t.exchange(command).await?,
            #[cfg(not(all(feature = "transport_hid", feature = "transport_tcp")))]
            _ => panic!("Transport {} unavailable", self),
        };

        Ok(r)
    }
}

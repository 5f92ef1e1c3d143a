// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger IOV API Library (and CLI)
//!
//! Provides [DeviceHandle] for issuing version, address and sign commands
//! to the IOV ledger app over any [Exchange] transport, along with a
//! [LedgerProvider] for device discovery.

pub use ledger_transport::Exchange;

/// Re-export transports for consumer use
pub mod transport;
use transport::GenericTransport;

/// Re-export `ledger-iov-apdu` for consumers
pub use ledger_iov_apdu::{self as apdu};

mod handle;
pub use handle::{DeviceHandle, Reply, ACCEPTED};

mod error;
pub use error::Error;

pub mod info;
pub use info::{AddressInfo, SignResult, VersionInfo};

#[cfg(any(feature = "transport_hid", feature = "transport_tcp"))]
mod provider;
#[cfg(any(feature = "transport_hid", feature = "transport_tcp"))]
pub use provider::{Filter, LedgerInfo, LedgerProvider};

/// Generic ledger device handle (abstract over transport types)
pub type GenericHandle = DeviceHandle<GenericTransport>;

impl GenericHandle {
    /// Create a new generic device handle
    pub fn new(d: impl Into<GenericTransport>) -> Self {
        Self::from(d.into())
    }
}

// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Device discovery and connection

use log::debug;

#[cfg(feature = "transport_hid")]
use hidapi::HidApi;

use crate::{transport::*, Error, GenericHandle};

/// Device discovery filter
#[derive(Copy, Clone, Debug, PartialEq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum Filter {
    /// USB-HID devices and the configured TCP simulator
    Any,
    /// USB-HID devices only
    Hid,
    /// Configured TCP simulator only
    Tcp,
}

/// Discovered device, passed to [LedgerProvider::connect]
#[derive(Clone, Debug)]
pub enum LedgerInfo {
    #[cfg(feature = "transport_hid")]
    Hid(hidapi::DeviceInfo),
    #[cfg(feature = "transport_tcp")]
    Tcp(TcpOptions),
}

impl core::fmt::Display for LedgerInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            #[cfg(feature = "transport_hid")]
            LedgerInfo::Hid(i) => write!(
                f,
                "HID {:04x}:{:04x} {} ({})",
                i.vendor_id(),
                i.product_id(),
                i.product_string().unwrap_or("unknown"),
                i.serial_number().unwrap_or("no serial"),
            ),
            #[cfg(feature = "transport_tcp")]
            LedgerInfo::Tcp(o) => write!(f, "TCP {} (simulator)", o.socket_addr()),
        }
    }
}

/// Discovers IOV devices and opens handles to them
///
/// Only one provider should exist at a time, HID contexts are process-global
/// on some platforms.
pub struct LedgerProvider {
    #[cfg(feature = "transport_hid")]
    hid_api: HidApi,
    #[cfg(feature = "transport_tcp")]
    tcp: TcpOptions,
}

impl LedgerProvider {
    /// Create a provider, probing the default simulator port for TCP devices
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            #[cfg(feature = "transport_hid")]
            hid_api: HidApi::new()?,
            #[cfg(feature = "transport_tcp")]
            tcp: TcpOptions::default(),
        })
    }

    /// Set the simulator address probed during discovery
    #[cfg(feature = "transport_tcp")]
    pub fn with_tcp(mut self, opts: TcpOptions) -> Self {
        self.tcp = opts;
        self
    }

    /// List reachable devices matching `filter`
    pub async fn list_devices(&self, filter: Filter) -> Vec<LedgerInfo> {
        let mut devices = vec![];

        #[cfg(feature = "transport_hid")]
        if matches!(filter, Filter::Any | Filter::Hid) {
            devices.extend(
                TransportNativeHID::list_ledgers(&self.hid_api)
                    .cloned()
                    .map(LedgerInfo::Hid),
            );
        }

        #[cfg(feature = "transport_tcp")]
        if matches!(filter, Filter::Any | Filter::Tcp) {
            let addr = self.tcp.socket_addr();
            match tokio::net::TcpStream::connect(addr).await {
                Ok(_) => devices.push(LedgerInfo::Tcp(self.tcp.clone())),
                Err(e) => debug!("No simulator at {}: {}", addr, e),
            }
        }

        debug!("Found {} devices: {:?}", devices.len(), devices);

        devices
    }

    /// Open a handle to a discovered device
    pub async fn connect(&self, info: &LedgerInfo) -> Result<GenericHandle, Error> {
        debug!("Connecting to {}", info);

        let t = match info {
            #[cfg(feature = "transport_hid")]
            LedgerInfo::Hid(i) => {
                GenericTransport::from(TransportNativeHID::open_device(&self.hid_api, i)?)
            }
            #[cfg(feature = "transport_tcp")]
            LedgerInfo::Tcp(o) => GenericTransport::from(TransportTcp::new(o.clone()).await?),
        };

        Ok(GenericHandle::new(t))
    }
}

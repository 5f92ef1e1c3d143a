// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Simulated IOV ledger app for testing without hardware
//!
//! [SimDevice] implements [ledger_transport::Exchange] for in-process use,
//! [serve] exposes it over TCP for use with the TCP transport.

mod device;
pub use device::{LoggedApdu, SimDevice, SimError, SimOptions};

pub mod keys;

mod server;
pub use server::serve;

// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Tests for IOV ledger app integration.
//!
//! Generic over [ledger_transport::Exchange] for reuse against the
//! simulator and physical devices.
//!

pub mod version;

pub mod address;

pub mod sign;

/// Account indices exercised by address and sign tests
pub const TEST_INDICES: &[u32] = &[0, 1, 2, 0x7fff_ffff];

/// Message lengths covering frame boundaries
pub const MESSAGE_LENGTHS: &[usize] = &[0, 1, 249, 250, 251, 500, 1000, 1234];

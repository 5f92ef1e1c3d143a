// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Structured operation results
//!
//! Device-reported failures are carried here as data (`return_code` and
//! `error_message`), with operation-specific fields left empty.

use serde::{Deserialize, Serialize};

use ledger_iov_apdu::prelude::StatusWord;

/// Application version information
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub return_code: u16,
    pub error_message: String,
    pub test_mode: bool,
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub device_locked: bool,
}

/// Public key and address for an account index
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub return_code: u16,
    pub error_message: String,
    /// Hex encoded ed25519 public key
    pub pub_key: String,
    pub address: String,
}

/// Outcome of a (multi-frame) sign exchange
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignResult {
    pub return_code: u16,
    pub error_message: String,
    /// Signature bytes, empty unless the final frame succeeded
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

macro_rules! impl_status {
    ($($t:ty),*) => {
        $(
            impl $t {
                /// Build a status-only result
                pub fn from_status(status: StatusWord) -> Self {
                    Self::with_message(status, status.to_string())
                }

                /// Build a status-only result with a translated message
                pub fn with_message(status: StatusWord, error_message: String) -> Self {
                    Self {
                        return_code: status.0,
                        error_message,
                        ..Default::default()
                    }
                }

                /// Fetch the returned status word
                pub fn status(&self) -> StatusWord {
                    StatusWord(self.return_code)
                }

                /// Check whether the device reported success
                pub fn is_success(&self) -> bool {
                    self.status().is_success()
                }
            }
        )*
    };
}

impl_status!(VersionInfo, AddressInfo, SignResult);

impl VersionInfo {
    /// Format version as `major.minor.patch`
    pub fn version(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }
}

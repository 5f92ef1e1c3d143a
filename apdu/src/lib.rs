// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for IOV app communication
//!
//! This module provides protocol definitions and request / response codecs for communication
//! with the IOV ledger application.
//!
//! Requests carry a fixed class byte ([IOV_APDU_CLA]), an [Instruction], two parameter bytes
//! and a payload of at most [CHUNK_SIZE] bytes. Responses carry an operation-specific payload
//! followed by a big-endian [StatusWord][status::StatusWord].
//!
//! Multi-byte payload fields (BIP32 path words) are little-endian, status words are big-endian.
//!

#![cfg_attr(not(feature = "std"), no_std)]

use core::fmt::Debug;

pub use ledger_apdu::APDUCommand;

use encdec::Encode;

pub mod address;
pub mod chunk;
pub mod path;
pub mod prelude;
pub mod response;
pub mod sign;
pub mod status;
pub mod version;

mod error;
pub use error::ApduError;

/// IOV APDU Class
pub const IOV_APDU_CLA: u8 = 0x22;

/// Maximum payload carried by a single APDU frame
pub const CHUNK_SIZE: usize = 250;

/// IOV APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version and mode flags
    GetVersion = 0x00,

    /// Fetch ed25519 public key and address for a path
    GetAddrEd25519 = 0x01,

    /// Sign a (chunked) message with the key for a path
    SignEd25519 = 0x02,
}

/// Static APDU header information, implemented by request types
pub trait ApduStatic {
    /// Class byte
    const CLA: u8;

    /// Instruction byte
    const INS: u8;

    /// First parameter byte
    fn p1(&self) -> u8 {
        0
    }

    /// Second parameter byte
    fn p2(&self) -> u8 {
        0
    }
}

/// Request APDU, encodable into an [APDUCommand] for a transport
pub trait ApduReq: ApduStatic + Encode<Error = ApduError> + Debug {
    /// Encode the request payload into `buff` and build the command referencing it
    fn command<'b>(&self, buff: &'b mut [u8]) -> Result<APDUCommand<&'b [u8]>, ApduError> {
        let n = self.encode(buff)?;

        if n > CHUNK_SIZE {
            return Err(ApduError::InvalidLength);
        }

        Ok(APDUCommand {
            cla: Self::CLA,
            ins: Self::INS,
            p1: self.p1(),
            p2: self.p2(),
            data: &buff[..n],
        })
    }
}

impl<T: ApduStatic + Encode<Error = ApduError> + Debug> ApduReq for T {}

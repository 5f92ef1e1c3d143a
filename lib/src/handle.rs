// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Handle for connected ledger devices
//!
//! This provides methods for interacting with the IOV app
//! and is generic over [ledger_transport::Exchange]

use std::{sync::Arc, time::Duration};

use encdec::{Decode, DecodeOwned};
use ledger_transport::Exchange;
use log::{debug, trace, warn};
use tokio::sync::Mutex;

use ledger_iov_apdu::prelude::*;

use crate::{
    info::{AddressInfo, SignResult, VersionInfo},
    Error,
};

/// Status words accepted by IOV commands, diagnostic statuses keep their payload
pub const ACCEPTED: &[u16] = &[
    StatusCode::Success as u16,
    StatusCode::BadKeyHandle as u16,
    StatusCode::DataInvalid as u16,
];

/// IOV handle for a connected ledger device.
///
/// This is generic over [Exchange] types to support different
/// underlying transports / providers
pub struct DeviceHandle<T: Exchange> {
    /// Transport for communication, held for the duration of each command
    t: Arc<Mutex<T>>,
    /// Optional timeout for APDU requests
    request_timeout: Option<Duration>,
}

/// Create a [DeviceHandle] wrapper from a type implementing [Exchange]
impl<T: Exchange> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
            request_timeout: None,
        }
    }
}

impl<T: Exchange> Clone for DeviceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            t: self.t.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

/// Response to a single exchange
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// Status word in the accepted set, payload retained
    Accepted { payload: Vec<u8>, status: StatusWord },
    /// Status word outside the accepted set, payload dropped
    Rejected(StatusWord),
}

impl Reply {
    /// Fetch the reply status word
    pub fn status(&self) -> StatusWord {
        match self {
            Reply::Accepted { status, .. } => *status,
            Reply::Rejected(status) => *status,
        }
    }

    /// Fetch the payload of a successful reply, or the failure status with
    /// its translated message (including any diagnostic)
    pub fn into_payload(self) -> Result<Vec<u8>, (StatusWord, String)> {
        match self {
            Reply::Accepted { payload, status } if status.is_success() => Ok(payload),
            Reply::Accepted { payload, status } => Err((status, status_message(status, &payload))),
            Reply::Rejected(status) => Err((status, status.to_string())),
        }
    }
}

impl<T> DeviceHandle<T>
where
    T: Exchange + Send + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    /// Apply a timeout to each APDU exchange
    ///
    /// Confirmation-pending address requests are never subject to this timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Issue a single request, checking the status word against `accepted`
    pub async fn exchange<R: ApduReq + Send + Sync>(
        &self,
        req: R,
        accepted: &[u16],
    ) -> Result<Reply, Error> {
        let t = self.t.lock().await;
        exchange_locked(&*t, req, accepted, self.request_timeout).await
    }

    /// Fetch application version and mode flags
    pub async fn version(&self) -> Result<VersionInfo, Error> {
        debug!("Requesting app version");

        let payload = match self.exchange(VersionReq {}, ACCEPTED).await?.into_payload() {
            Ok(p) => p,
            Err((status, message)) => return Ok(VersionInfo::with_message(status, message)),
        };

        let (v, _) = VersionResp::decode_owned(&payload).map_err(Error::MalformedResponse)?;

        Ok(VersionInfo {
            return_code: StatusWord::SUCCESS.0,
            error_message: StatusWord::SUCCESS.to_string(),
            test_mode: v.test_mode,
            major: v.major,
            minor: v.minor,
            patch: v.patch,
            device_locked: v.device_locked,
        })
    }

    /// Fetch public key and address for the provided account index
    ///
    /// With `require_confirmation` set the device blocks until the user approves,
    /// so no request timeout is applied.
    pub async fn address(
        &self,
        index: u32,
        require_confirmation: bool,
    ) -> Result<AddressInfo, Error> {
        let index = PathIndex::new(index).map_err(Error::InvalidArgument)?;
        let path = Bip32Path::iov(index);

        debug!(
            "Requesting address for path: {} (confirm: {})",
            path, require_confirmation
        );

        let timeout = match require_confirmation {
            true => None,
            false => self.request_timeout,
        };

        let t = self.t.lock().await;
        let req = AddressReq::new(path, require_confirmation);

        let payload = match exchange_locked(&*t, req, ACCEPTED, timeout).await?.into_payload() {
            Ok(p) => p,
            Err((status, message)) => return Ok(AddressInfo::with_message(status, message)),
        };

        let (resp, _) = AddressResp::decode(&payload).map_err(Error::MalformedResponse)?;

        Ok(AddressInfo {
            return_code: StatusWord::SUCCESS.0,
            error_message: StatusWord::SUCCESS.to_string(),
            pub_key: hex::encode(resp.public_key),
            address: resp.address.to_string(),
        })
    }

    /// Sign a message with the key for the provided account index
    ///
    /// Frames are sent strictly in order, the first non-success status ends the
    /// exchange and becomes the result.
    pub async fn sign(&self, index: u32, message: &[u8]) -> Result<SignResult, Error> {
        let index = PathIndex::new(index).map_err(Error::InvalidArgument)?;
        let path = Bip32Path::iov(index);
        let path_bytes = path.to_bytes();

        let plan = ChunkPlan::new(&path_bytes, message).map_err(Error::InvalidArgument)?;

        debug!(
            "Signing {} byte message with path: {} ({} frames)",
            message.len(),
            path,
            plan.count()
        );

        // Hold the transport across frames so commands from other handles can't interleave
        let t = self.t.lock().await;

        let mut signature = vec![];

        for frame in plan.frames() {
            trace!(
                "Sending {} frame {}/{} ({} bytes)",
                frame.role(),
                frame.position,
                frame.count,
                frame.data.len()
            );

            let req = SignChunkReq::from(frame);

            match exchange_locked(&*t, req, ACCEPTED, self.request_timeout)
                .await?
                .into_payload()
            {
                Ok(p) => signature = p,
                Err((status, message)) => {
                    warn!(
                        "Sign aborted at frame {}/{}: {}",
                        frame.position, frame.count, message
                    );

                    return Ok(SignResult::with_message(status, message));
                }
            }
        }

        debug!("Signing complete ({} byte signature)", signature.len());

        Ok(SignResult {
            return_code: StatusWord::SUCCESS.0,
            error_message: StatusWord::SUCCESS.to_string(),
            signature,
        })
    }
}

/// Execute a request against an already locked transport
async fn exchange_locked<T, R>(
    t: &T,
    req: R,
    accepted: &[u16],
    timeout: Option<Duration>,
) -> Result<Reply, Error>
where
    T: Exchange + Send + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
    R: ApduReq + Send + Sync,
{
    let mut buff = [0u8; 256];

    let cmd = req.command(&mut buff).map_err(Error::InvalidArgument)?;

    trace!(
        "TX: {:?} (cla: {:02x} ins: {:02x} p1: {:02x} p2: {:02x})",
        req,
        cmd.cla,
        cmd.ins,
        cmd.p1,
        cmd.p2
    );

    let answer = match timeout {
        Some(d) => tokio::time::timeout(d, t.exchange(&cmd)).await?,
        None => t.exchange(&cmd).await,
    }
    .map_err(Error::from_transport)?;

    let status = StatusWord(answer.retcode());
    let payload = answer.apdu_data();

    trace!("RX: {} ({}), {}", status, hex::encode(status.to_be_bytes()), hex::encode(payload));

    match accepted.contains(&status.0) {
        true => Ok(Reply::Accepted {
            payload: payload.to_vec(),
            status,
        }),
        false => Ok(Reply::Rejected(status)),
    }
}

/// Translate a status word, appending any diagnostic payload
fn status_message(status: StatusWord, payload: &[u8]) -> String {
    let resp = ApduResponse::new(payload, status);

    match (status.has_diagnostic(), resp.diagnostic()) {
        (true, Some(d)) => format!("{}: {}", status, d),
        _ => status.to_string(),
    }
}

// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Simulated IOV app
//!
//! [SimDevice] decodes raw APDUs, tracks the INIT/ADD/LAST sign session and
//! responds with `payload | SW1 SW2` the way the on-device app does.

use std::{
    ops::Deref,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use ed25519_dalek::Signer;
use encdec::{DecodeOwned, Encode};
use ledger_apdu::{APDUAnswer, APDUCommand};
use ledger_transport::Exchange;
use log::{debug, trace, warn};
use strum::Display;

use ledger_iov_apdu::{
    prelude::*, response::STATUS_LEN, Instruction, CHUNK_SIZE, IOV_APDU_CLA,
};

use crate::keys::{self, DEFAULT_SEED};

/// APDU header length (CLA, INS, P1, P2, LC)
const HEADER_LEN: usize = 5;

/// Simulated device errors (channel faults)
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Injected channel fault
    #[error("Device disconnected")]
    Disconnected,

    /// Response could not be framed as an APDU answer
    #[error("Invalid APDU answer: {0}")]
    InvalidAnswer(#[source] ApduError),
}

/// Simulated device configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Seed for per-path key derivation
    pub seed: [u8; 32],
    /// Report locked and refuse key operations
    pub locked: bool,
    /// Report test mode
    pub test_mode: bool,
    /// Reported app version (major, minor, patch)
    pub version: (u8, u8, u8),
    /// Approve on-device confirmation requests
    pub approve: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            locked: false,
            test_mode: false,
            version: (0, 9, 1),
            approve: true,
        }
    }
}

/// Record of an APDU handled by the simulator
#[derive(Clone, Debug, PartialEq)]
pub struct LoggedApdu {
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
    pub status: StatusWord,
}

/// Sign session state
#[derive(Clone, Debug, PartialEq, Display)]
enum Session {
    /// No sign in progress
    Idle,
    /// Awaiting frame `next` of `count` (`next` passes 255 on the final frame)
    Signing {
        path: Bip32Path,
        count: u8,
        next: u16,
        message: Vec<u8>,
    },
}

/// Injected faults
#[derive(Clone, Debug, Default, PartialEq)]
struct Faults {
    /// Respond to the sign frame at this position with the given status
    fail_frame: Option<(u8, StatusWord, Vec<u8>)>,
    /// Fail the channel once this many exchanges have completed
    fault_after: Option<usize>,
}

struct SimState {
    opts: SimOptions,
    session: Session,
    faults: Faults,
    log: Vec<LoggedApdu>,
}

/// Simulated IOV ledger app, cheap to clone (clones share state)
#[derive(Clone)]
pub struct SimDevice {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new(SimOptions::default())
    }
}

impl SimDevice {
    /// Create a new simulated device
    pub fn new(opts: SimOptions) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                opts,
                session: Session::Idle,
                faults: Faults::default(),
                log: vec![],
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        // State is always left consistent, recover from poisoning
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set device lock state
    pub fn set_locked(&self, locked: bool) {
        self.state().opts.locked = locked;
    }

    /// Set whether on-device confirmations are approved
    pub fn set_approve(&self, approve: bool) {
        self.state().opts.approve = approve;
    }

    /// Respond to the sign frame at `position` with `status` and a diagnostic payload
    pub fn fail_frame(&self, position: u8, status: impl Into<StatusWord>, diagnostic: &str) {
        self.state().faults.fail_frame = Some((position, status.into(), diagnostic.into()));
    }

    /// Fail the channel after `n` successful exchanges
    pub fn fault_after(&self, n: usize) {
        self.state().faults.fault_after = Some(n);
    }

    /// Clear injected faults
    pub fn clear_faults(&self) {
        self.state().faults = Faults::default();
    }

    /// Fetch the log of handled APDUs
    pub fn exchanges(&self) -> Vec<LoggedApdu> {
        self.state().log.clone()
    }

    /// Clear the exchange log
    pub fn clear_log(&self) {
        self.state().log.clear();
    }

    /// Fetch the public key for a path
    pub fn public_key(&self, path: &Bip32Path) -> [u8; 32] {
        let s = self.state();
        keys::derive_key(&s.opts.seed, path).verifying_key().to_bytes()
    }

    /// Handle a raw APDU, returning the raw response
    ///
    /// Injected channel faults are returned as errors.
    pub fn try_handle(&self, apdu: &[u8]) -> Result<Vec<u8>, SimError> {
        let mut s = self.state();

        if let Some(n) = s.faults.fault_after {
            if s.log.len() >= n {
                warn!("Injected channel fault after {} exchanges", n);
                return Err(SimError::Disconnected);
            }
        }

        Ok(s.handle(apdu))
    }

    /// Handle a raw APDU, returning the raw response
    pub fn handle(&self, apdu: &[u8]) -> Vec<u8> {
        self.state().handle(apdu)
    }
}

impl SimState {
    fn handle(&mut self, apdu: &[u8]) -> Vec<u8> {
        trace!("RX: {}", hex::encode(apdu));

        if apdu.len() < HEADER_LEN {
            return respond(&[], StatusCode::WrongLength);
        }

        let (cla, ins, p1, p2, lc) = (apdu[0], apdu[1], apdu[2], apdu[3], apdu[4] as usize);
        let data = &apdu[HEADER_LEN..];

        let (payload, status) = if data.len() != lc || lc > CHUNK_SIZE {
            (vec![], StatusCode::WrongLength.into())
        } else if cla != IOV_APDU_CLA {
            (vec![], StatusCode::AppNotOpen.into())
        } else {
            self.dispatch(ins, p1, p2, data)
        };

        self.log.push(LoggedApdu {
            ins,
            p1,
            p2,
            data: data.to_vec(),
            status,
        });

        debug!("ins: {:02x} p1: {} p2: {} -> {}", ins, p1, p2, status);

        let resp = respond(&payload, status);

        trace!("TX: {}", hex::encode(&resp));

        resp
    }

    fn dispatch(&mut self, ins: u8, p1: u8, p2: u8, data: &[u8]) -> (Vec<u8>, StatusWord) {
        match ins {
            i if i == Instruction::GetVersion as u8 => self.version(),
            i if i == Instruction::GetAddrEd25519 as u8 => self.address(p1, p2, data),
            i if i == Instruction::SignEd25519 as u8 => self.sign(p1, p2, data),
            _ => (vec![], StatusCode::InsNotSupported.into()),
        }
    }

    fn version(&self) -> (Vec<u8>, StatusWord) {
        let (major, minor, patch) = self.opts.version;
        let v = VersionResp {
            test_mode: self.opts.test_mode,
            major,
            minor,
            patch,
            device_locked: self.opts.locked,
        };

        let mut buff = [0u8; VersionResp::LEN];
        match v.encode(&mut buff) {
            Ok(n) => (buff[..n].to_vec(), StatusWord::SUCCESS),
            Err(_) => (vec![], StatusCode::ExecutionError.into()),
        }
    }

    fn address(&self, p1: u8, p2: u8, data: &[u8]) -> (Vec<u8>, StatusWord) {
        if p1 > 1 || p2 != 0 {
            return (vec![], StatusCode::InvalidP1P2.into());
        }
        if self.opts.locked {
            return (vec![], StatusCode::ConditionsNotSatisfied.into());
        }

        let path = match decode_path(data) {
            Ok(p) => p,
            Err(e) => return e,
        };

        if p1 == 1 && !self.opts.approve {
            return (vec![], StatusCode::TransactionRejected.into());
        }

        let pk = keys::derive_key(&self.opts.seed, &path).verifying_key();
        let addr = match keys::address(&pk) {
            Ok(a) => a,
            Err(_) => return (vec![], StatusCode::ExecutionError.into()),
        };

        let mut payload = pk.to_bytes().to_vec();
        payload.extend_from_slice(addr.as_bytes());

        (payload, StatusWord::SUCCESS)
    }

    fn sign(&mut self, position: u8, count: u8, data: &[u8]) -> (Vec<u8>, StatusWord) {
        if position == 0 || count == 0 || position > count {
            self.session = Session::Idle;
            return (vec![], StatusCode::InvalidP1P2.into());
        }

        if self.opts.locked {
            self.session = Session::Idle;
            return (vec![], StatusCode::ConditionsNotSatisfied.into());
        }

        if let Some((n, status, diag)) = &self.faults.fail_frame {
            if *n == position {
                warn!("Injected status {} at frame {}/{}", status, position, count);
                self.session = Session::Idle;
                return (diag.clone(), *status);
            }
        }

        let session = core::mem::replace(&mut self.session, Session::Idle);

        let next = match (session, FrameRole::of(position, count)) {
            // Path frame (re)starts the session
            (_, FrameRole::Init) => {
                let path = match decode_path(data) {
                    Ok(p) => p,
                    Err(e) => return e,
                };
                Session::Signing {
                    path,
                    count,
                    next: 2,
                    message: vec![],
                }
            }
            // Message frames must arrive in order for the same frame count
            (
                Session::Signing {
                    path,
                    count: c,
                    next,
                    mut message,
                },
                FrameRole::Add | FrameRole::Last,
            ) if c == count && next == u16::from(position) => {
                message.extend_from_slice(data);
                Session::Signing {
                    path,
                    count,
                    next: next + 1,
                    message,
                }
            }
            (s, r) => {
                warn!("Unexpected {} frame {}/{} in session {}", r, position, count, s);
                return (b"unexpected frame".to_vec(), StatusCode::DataInvalid.into());
            }
        };

        match next {
            Session::Signing { path, message, .. } if position == count => {
                let k = keys::derive_key(&self.opts.seed, &path);
                let sig = k.sign(&message);

                debug!("Signed {} byte message for {}", message.len(), path);

                (sig.to_bytes().to_vec(), StatusWord::SUCCESS)
            }
            s => {
                self.session = s;
                (vec![], StatusWord::SUCCESS)
            }
        }
    }
}

/// Decode an IOV path, mapping failures to a diagnostic response
fn decode_path(data: &[u8]) -> Result<Bip32Path, (Vec<u8>, StatusWord)> {
    match Bip32Path::decode_owned(data) {
        Ok((p, n)) if n == data.len() => Ok(p),
        _ => Err((b"invalid path".to_vec(), StatusCode::BadKeyHandle.into())),
    }
}

/// Build a raw response from payload and status word
fn respond(payload: &[u8], status: impl Into<StatusWord>) -> Vec<u8> {
    let mut r = Vec::with_capacity(payload.len() + STATUS_LEN);
    r.extend_from_slice(payload);
    r.extend_from_slice(&status.into().to_be_bytes());
    r
}

#[async_trait]
impl Exchange for SimDevice {
    type Error = SimError;
    type AnswerType = Vec<u8>;

    async fn exchange<I>(
        &self,
        command: &APDUCommand<I>,
    ) -> Result<APDUAnswer<Self::AnswerType>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync,
    {
        let resp = self.try_handle(&command.serialize())?;

        APDUAnswer::from_answer(resp)
            .map_err(|_| SimError::InvalidAnswer(ApduError::MalformedResponse))
    }
}

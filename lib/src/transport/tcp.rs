// Copyright (c) 2022-2023 The MobileCoin Foundation

//! TCP transport, compatible with the speculos APDU socket
//!
//! Requests are written as a big-endian `u32` length followed by the
//! serialized APDU, responses are read as a big-endian `u32` payload length
//! followed by the payload and the two byte status word.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    ops::Deref,
};

use async_trait::async_trait;
use ledger_transport::{APDUAnswer, APDUCommand, Exchange};
use ledger_iov_apdu::ApduError;
use log::trace;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::Mutex,
};

/// Default speculos APDU port
pub const DEFAULT_TCP_PORT: u16 = 9999;

/// Upper bound on response payload length
const MAX_RESPONSE_LEN: usize = 4096;

/// TCP transport options
#[derive(Clone, Debug, PartialEq, clap::Args)]
pub struct TcpOptions {
    /// Address of the TCP device or simulator
    #[clap(long = "tcp-addr", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub addr: IpAddr,

    /// Port of the TCP device or simulator
    #[clap(long = "tcp-port", default_value_t = DEFAULT_TCP_PORT)]
    pub port: u16,
}

impl Default for TcpOptions {
    fn default() -> Self {
        Self {
            addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_TCP_PORT,
        }
    }
}

impl TcpOptions {
    /// Fetch socket address for these options
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.port)
    }
}

/// TCP transport errors
#[derive(Debug, thiserror::Error)]
pub enum TcpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid response length: {0}")]
    InvalidLength(usize),

    #[error("Invalid APDU answer: {0}")]
    InvalidAnswer(#[source] ApduError),
}

/// TCP transport for simulated (or proxied) devices
pub struct TransportTcp {
    stream: Mutex<TcpStream>,
}

impl TransportTcp {
    /// Connect to a TCP device using the provided options
    pub async fn new(opts: TcpOptions) -> Result<Self, TcpError> {
        let stream = TcpStream::connect(opts.socket_addr()).await?;

        Ok(Self {
            stream: Mutex::new(stream),
        })
    }
}

#[async_trait]
impl Exchange for TransportTcp {
    type Error = TcpError;
    type AnswerType = Vec<u8>;

    async fn exchange<I>(
        &self,
        command: &APDUCommand<I>,
    ) -> Result<APDUAnswer<Self::AnswerType>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync,
    {
        let mut stream = self.stream.lock().await;

        let cmd = command.serialize();
        let mut req = Vec::with_capacity(cmd.len() + 4);
        req.extend_from_slice(&(cmd.len() as u32).to_be_bytes());
        req.extend_from_slice(&cmd);

        trace!("TCP TX: {}", hex::encode(&req));

        stream.write_all(&req).await?;

        let mut len = [0u8; 4];
        stream.read_exact(&mut len).await?;
        let n = u32::from_be_bytes(len) as usize;
        if n > MAX_RESPONSE_LEN {
            return Err(TcpError::InvalidLength(n));
        }

        let mut resp = vec![0u8; n + 2];
        stream.read_exact(&mut resp).await?;

        trace!("TCP RX: {}", hex::encode(&resp));

        APDUAnswer::from_answer(resp)
            .map_err(|_| TcpError::InvalidAnswer(ApduError::MalformedResponse))
    }
}

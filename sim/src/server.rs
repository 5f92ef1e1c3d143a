// Copyright (c) 2022-2023 The MobileCoin Foundation

//! TCP server exposing a [SimDevice] using speculos-style APDU framing

use std::net::SocketAddr;

use log::{debug, info, warn};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use crate::SimDevice;

/// Maximum accepted request length
const MAX_REQUEST_LEN: usize = 512;

/// Serve the simulated device on the provided listener until the task is dropped
pub async fn serve(listener: TcpListener, device: SimDevice) -> anyhow::Result<()> {
    info!("Simulator listening on {}", listener.local_addr()?);

    loop {
        let (stream, addr) = listener.accept().await?;

        debug!("Connection from {}", addr);

        let d = device.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, addr, d).await {
                warn!("Connection {} closed: {}", addr, e);
            }
        });
    }
}

/// Handle framed APDUs for a single connection
async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    device: SimDevice,
) -> anyhow::Result<()> {
    loop {
        let mut len = [0u8; 4];
        match stream.read_exact(&mut len).await {
            Ok(_) => (),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("Connection {} closed", addr);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let n = u32::from_be_bytes(len) as usize;
        if n > MAX_REQUEST_LEN {
            return Err(anyhow::anyhow!("Request too long ({} bytes)", n));
        }

        let mut req = vec![0u8; n];
        stream.read_exact(&mut req).await?;

        // Injected channel faults drop the connection
        let resp = device.try_handle(&req)?;

        // Length prefix excludes the status word
        let payload_len = (resp.len() - 2) as u32;

        stream.write_all(&payload_len.to_be_bytes()).await?;
        stream.write_all(&resp).await?;
    }
}

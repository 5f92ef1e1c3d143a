// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application version tests

use std::error::Error;

use log::info;

use ledger_iov::{DeviceHandle, Exchange, VersionInfo};

/// Fetch application version, checking the device reports success
pub async fn test<T, E>(t: T) -> anyhow::Result<VersionInfo>
where
    T: Exchange<Error = E> + Send + Sync,
    E: Error + Send + Sync + 'static,
{
    let d = DeviceHandle::from(t);

    let v = d.version().await?;

    info!(
        "version: {} (test mode: {}, locked: {})",
        v.version(),
        v.test_mode,
        v.device_locked
    );

    if !v.is_success() {
        return Err(anyhow::anyhow!(
            "version request failed: {} (0x{:04x})",
            v.error_message,
            v.return_code
        ));
    }

    Ok(v)
}

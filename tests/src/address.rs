// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address derivation tests

use std::{collections::HashSet, error::Error};

use log::{debug, info};

use ledger_iov::{apdu::address::PUBLIC_KEY_LEN, AddressInfo, DeviceHandle, Exchange};

/// Expected human readable part for IOV addresses
pub const IOV_HRP: &str = "iov";

/// Fetch and check addresses for the provided account indices
pub async fn test<T, E>(t: T, indices: &[u32]) -> anyhow::Result<Vec<AddressInfo>>
where
    T: Exchange<Error = E> + Send + Sync,
    E: Error + Send + Sync + 'static,
{
    let d = DeviceHandle::from(t);

    let mut addresses = vec![];

    for i in indices {
        debug!("Fetching address for index: {}", i);

        let a = d.address(*i, false).await?;
        check(&a)?;

        info!("index {}: {} ({})", i, a.address, a.pub_key);

        addresses.push(a);
    }

    // Each index must derive a distinct key
    let keys: HashSet<_> = addresses.iter().map(|a| a.pub_key.clone()).collect();
    if keys.len() != addresses.len() {
        return Err(anyhow::anyhow!("duplicate public keys across indices"));
    }

    Ok(addresses)
}

/// Check a successful address result is well formed
pub fn check(a: &AddressInfo) -> anyhow::Result<()> {
    if !a.is_success() {
        return Err(anyhow::anyhow!(
            "address request failed: {} (0x{:04x})",
            a.error_message,
            a.return_code
        ));
    }

    let pk = hex::decode(&a.pub_key)?;
    if pk.len() != PUBLIC_KEY_LEN {
        return Err(anyhow::anyhow!("invalid public key length: {}", pk.len()));
    }

    let (hrp, _) = bech32::decode(&a.address)?;
    if hrp.as_str() != IOV_HRP {
        return Err(anyhow::anyhow!("unexpected address prefix: {}", hrp));
    }

    Ok(())
}

// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Message signing tests

use std::error::Error;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use log::{debug, info};
use rand::RngCore;

use ledger_iov::{apdu::sign::SIGNATURE_LEN, DeviceHandle, Exchange};

/// Sign random messages of each length, verifying signatures against the address key
pub async fn test<T, E>(t: T, index: u32, lengths: &[usize]) -> anyhow::Result<()>
where
    T: Exchange<Error = E> + Send + Sync,
    E: Error + Send + Sync + 'static,
{
    let d = DeviceHandle::from(t);

    // Fetch public key for verification
    let a = d.address(index, false).await?;
    crate::address::check(&a)?;

    let mut pk = [0u8; 32];
    hex::decode_to_slice(&a.pub_key, &mut pk)?;
    let pk = VerifyingKey::from_bytes(&pk)?;

    for n in lengths {
        let mut message = vec![0u8; *n];
        rand::thread_rng().fill_bytes(&mut message);

        debug!("Signing {} byte message with index {}", n, index);

        let r = d.sign(index, &message).await?;

        if !r.is_success() {
            return Err(anyhow::anyhow!(
                "sign failed for {} byte message: {} (0x{:04x})",
                n,
                r.error_message,
                r.return_code
            ));
        }

        verify(&pk, &message, &r.signature)?;

        info!("{} byte message signature OK", n);
    }

    Ok(())
}

/// Verify an ed25519 signature over a message
pub fn verify(pk: &VerifyingKey, message: &[u8], signature: &[u8]) -> anyhow::Result<()> {
    if signature.len() != SIGNATURE_LEN {
        return Err(anyhow::anyhow!(
            "invalid signature length: {}",
            signature.len()
        ));
    }

    let sig = Signature::from_slice(signature)?;
    pk.verify(message, &sig)?;

    Ok(())
}

// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Deterministic per-path key derivation and IOV address rendering

use bech32::{Bech32, Hrp};
use ed25519_dalek::{SigningKey, VerifyingKey};
use sha2::{Digest, Sha256, Sha512};

use ledger_iov_apdu::prelude::Bip32Path;

/// Human readable part for IOV mainnet addresses
pub const IOV_HRP: &str = "iov";

/// Condition prefix hashed with the public key to form an address
const ED25519_CONDITION: &[u8] = b"sigs/ed25519/";

/// Address length in bytes (prior to bech32 encoding)
pub const ADDRESS_LEN: usize = 20;

/// Default simulator seed
pub const DEFAULT_SEED: [u8; 32] = [
    0x9a, 0x2b, 0x4c, 0x11, 0x52, 0xe4, 0x07, 0x3d, 0x86, 0x70, 0x1f, 0xc5, 0x38, 0x0e, 0x64, 0xa1,
    0xd3, 0x5f, 0x22, 0x9b, 0x40, 0x7c, 0xee, 0x13, 0x6a, 0x81, 0x05, 0xbf, 0x97, 0x2d, 0x58, 0xc6,
];

/// Derive the signing key for a path from the provided seed
///
/// `sk = SHA512(seed || path)[..32]`, sufficient for simulation only.
pub fn derive_key(seed: &[u8; 32], path: &Bip32Path) -> SigningKey {
    let mut h = Sha512::new();
    h.update(seed);
    h.update(path.to_bytes());
    let d = h.finalize();

    let mut sk = [0u8; 32];
    sk.copy_from_slice(&d[..32]);

    SigningKey::from_bytes(&sk)
}

/// Render the bech32 IOV address for a public key
pub fn address(public_key: &VerifyingKey) -> Result<String, bech32::EncodeError> {
    let mut h = Sha256::new();
    h.update(ED25519_CONDITION);
    h.update(public_key.as_bytes());
    let d = h.finalize();

    // HRP is a valid constant
    let hrp = Hrp::parse_unchecked(IOV_HRP);

    bech32::encode::<Bech32>(hrp, &d[..ADDRESS_LEN])
}

#[cfg(test)]
mod test {
    use ledger_iov_apdu::prelude::PathIndex;

    use super::*;

    #[test]
    fn keys_per_path() {
        let a = derive_key(&DEFAULT_SEED, &Bip32Path::iov(PathIndex::new(0).unwrap()));
        let b = derive_key(&DEFAULT_SEED, &Bip32Path::iov(PathIndex::new(1).unwrap()));
        let c = derive_key(&DEFAULT_SEED, &Bip32Path::iov(PathIndex::new(0).unwrap()));

        assert_ne!(a.verifying_key(), b.verifying_key());
        assert_eq!(a.verifying_key(), c.verifying_key());
    }

    #[test]
    fn address_format() {
        let k = derive_key(&DEFAULT_SEED, &Bip32Path::iov(PathIndex::new(0).unwrap()));
        let a = address(&k.verifying_key()).unwrap();

        assert!(a.starts_with("iov1"), "unexpected address: {a}");
        assert!(a.is_ascii());

        let (hrp, data) = bech32::decode(&a).unwrap();
        assert_eq!(hrp.as_str(), IOV_HRP);
        assert_eq!(data.len(), ADDRESS_LEN);
    }
}

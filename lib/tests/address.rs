use ledger_iov::{
    apdu::prelude::{ApduError, Bip32Path, PathIndex},
    Error,
};
use ledger_iov_sim::SimOptions;
use ledger_iov_tests::TEST_INDICES;

mod helpers;
use helpers::setup;

#[tokio::test]
async fn iov_addresses() -> anyhow::Result<()> {
    let (d, _h) = setup(SimOptions::default());

    let addresses = ledger_iov_tests::address::test(d.clone(), TEST_INDICES).await?;

    // Public keys match the simulator derivation
    for (i, a) in TEST_INDICES.iter().zip(addresses.iter()) {
        let path = Bip32Path::iov(PathIndex::new(*i)?);
        assert_eq!(a.pub_key, hex::encode(d.public_key(&path)));
        assert!(a.address.starts_with("iov1"));
    }

    // Requests carry the encoded path with no confirmation
    let x = d.exchanges();
    assert_eq!(x.len(), TEST_INDICES.len());
    assert_eq!((x[0].ins, x[0].p1, x[0].p2), (0x01, 0, 0));
    assert_eq!(hex::encode(&x[0].data), "2c000080ea00008000000080");

    Ok(())
}

#[tokio::test]
async fn iov_address_confirm() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());

    let a = h.address(5, true).await?;
    assert!(a.is_success());

    let x = d.exchanges();
    assert_eq!(x[0].p1, 1);

    // User rejection is returned as data
    d.set_approve(false);

    let a = h.address(5, true).await?;
    assert_eq!(a.return_code, 0x6986);
    assert_eq!(a.error_message, "Transaction rejected");
    assert!(a.pub_key.is_empty());
    assert!(a.address.is_empty());

    Ok(())
}

#[tokio::test]
async fn iov_address_locked() -> anyhow::Result<()> {
    let (_d, h) = setup(SimOptions {
        locked: true,
        ..Default::default()
    });

    let a = h.address(0, false).await?;
    assert_eq!(a.return_code, 0x6985);
    assert_eq!(a.error_message, "Conditions not satisfied");
    assert!(a.pub_key.is_empty());

    Ok(())
}

#[tokio::test]
async fn iov_address_invalid_index() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());

    for i in [0x8000_0000, 0xffff_ffff] {
        let r = h.address(i, false).await;
        assert!(
            matches!(r, Err(Error::InvalidArgument(ApduError::IndexOutOfRange))),
            "unexpected result for index {i}: {r:?}"
        );
    }

    // Nothing is sent for invalid input
    assert!(d.exchanges().is_empty());

    Ok(())
}

use ed25519_dalek::VerifyingKey;

use ledger_iov::{
    apdu::{
        chunk::MAX_MESSAGE_LEN,
        prelude::{ApduError, Bip32Path, PathIndex, StatusCode},
    },
    Error,
};
use ledger_iov_sim::{SimError, SimOptions};
use ledger_iov_tests::MESSAGE_LENGTHS;

mod helpers;
use helpers::setup;

/// 1000 byte message, 1 path frame + 4 message frames
const MESSAGE: [u8; 1000] = [0x5a; 1000];

fn public_key(d: &ledger_iov_sim::SimDevice, index: u32) -> VerifyingKey {
    let path = Bip32Path::iov(PathIndex::new(index).unwrap());
    VerifyingKey::from_bytes(&d.public_key(&path)).unwrap()
}

#[tokio::test]
async fn iov_sign_lengths() -> anyhow::Result<()> {
    let (d, _h) = setup(SimOptions::default());

    ledger_iov_tests::sign::test(d.clone(), 0, MESSAGE_LENGTHS).await?;
    ledger_iov_tests::sign::test(d, 0x7fff_ffff, &[1, 500]).await?;

    Ok(())
}

#[tokio::test]
async fn iov_sign_frames() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());

    let r = h.sign(7, &MESSAGE).await?;

    assert_eq!(r.return_code, 0x9000);
    assert_eq!(r.error_message, "No errors");
    ledger_iov_tests::sign::verify(&public_key(&d, 7), &MESSAGE, &r.signature)?;

    // Check frame headers and payloads
    let x = d.exchanges();
    assert_eq!(x.len(), 5);

    for (i, f) in x.iter().enumerate() {
        assert_eq!(f.ins, 0x02);
        assert_eq!(f.p1 as usize, i + 1);
        assert_eq!(f.p2, 5);
    }

    assert_eq!(hex::encode(&x[0].data), "2c000080ea00008007000080");

    let sent: Vec<u8> = x[1..].iter().flat_map(|f| f.data.clone()).collect();
    assert_eq!(&sent[..], &MESSAGE[..]);
    assert_eq!(x[4].data.len(), 250);

    Ok(())
}

#[tokio::test]
async fn iov_sign_empty_message() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());

    let r = h.sign(0, &[]).await?;
    assert!(r.is_success());
    ledger_iov_tests::sign::verify(&public_key(&d, 0), &[], &r.signature)?;

    // Only the path frame is sent
    let x = d.exchanges();
    assert_eq!(x.len(), 1);
    assert_eq!((x[0].p1, x[0].p2), (1, 1));

    Ok(())
}

#[tokio::test]
async fn iov_sign_short_circuit() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());

    // Fail frame 2 of 5 with a diagnostic
    d.fail_frame(2, StatusCode::DataInvalid, "chunk rejected");

    let r = h.sign(0, &MESSAGE).await?;

    assert_eq!(r.return_code, 0x6984);
    assert_eq!(r.error_message, "Data is invalid: chunk rejected");
    assert!(r.signature.is_empty());

    // No frames are sent after the failure
    assert_eq!(d.exchanges().len(), 2);

    Ok(())
}

#[tokio::test]
async fn iov_sign_first_frame_failure() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());

    d.fail_frame(1, StatusCode::BadKeyHandle, "invalid path");

    let r = h.sign(0, &MESSAGE).await?;

    assert_eq!(r.return_code, 0x6a80);
    assert_eq!(r.error_message, "Bad key handle: invalid path");
    assert!(r.signature.is_empty());
    assert_eq!(d.exchanges().len(), 1);

    Ok(())
}

#[tokio::test]
async fn iov_sign_rejected_status() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());

    // Non-accepted statuses drop the payload
    d.fail_frame(3, StatusCode::EmptyBuffer, "dropped");

    let r = h.sign(0, &MESSAGE).await?;

    assert_eq!(r.return_code, 0x6982);
    assert_eq!(r.error_message, "Empty Buffer");
    assert!(r.signature.is_empty());
    assert_eq!(d.exchanges().len(), 3);

    // Unknown status codes render with their numeric value
    d.clear_log();
    d.fail_frame(4, 0x1234u16, "");

    let r = h.sign(0, &MESSAGE).await?;

    assert_eq!(r.return_code, 0x1234);
    assert_eq!(r.error_message, "Unknown Status Code: 4660");
    assert_eq!(d.exchanges().len(), 4);

    Ok(())
}

#[tokio::test]
async fn iov_sign_locked() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions {
        locked: true,
        ..Default::default()
    });

    let r = h.sign(0, b"hello").await?;

    assert_eq!(r.return_code, 0x6985);
    assert!(r.signature.is_empty());
    assert_eq!(d.exchanges().len(), 1);

    Ok(())
}

#[tokio::test]
async fn iov_sign_channel_fault() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());

    d.fault_after(2);

    let r = h.sign(0, &MESSAGE).await;

    match r {
        Err(Error::Transport(e)) => {
            assert_eq!(e.downcast_ref::<SimError>(), Some(&SimError::Disconnected));
        }
        _ => panic!("unexpected result: {r:?}"),
    }

    // Faults are surfaced, not retried
    assert_eq!(d.exchanges().len(), 2);

    Ok(())
}

#[tokio::test]
async fn iov_sign_invalid_args() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());

    let r = h.sign(0x8000_0000, b"hello").await;
    assert!(matches!(
        r,
        Err(Error::InvalidArgument(ApduError::IndexOutOfRange))
    ));

    let long = vec![0u8; MAX_MESSAGE_LEN + 1];
    let r = h.sign(0, &long).await;
    assert!(matches!(
        r,
        Err(Error::InvalidArgument(ApduError::MessageTooLong(n))) if n == MAX_MESSAGE_LEN + 1
    ));

    assert!(d.exchanges().is_empty());

    Ok(())
}

#[tokio::test]
async fn iov_sign_max_frames() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());

    // Largest plannable message uses all 255 frames
    let max = vec![0x11u8; MAX_MESSAGE_LEN];
    let r = h.sign(3, &max).await?;
    assert!(r.is_success(), "{r:?}");
    ledger_iov_tests::sign::verify(&public_key(&d, 3), &max, &r.signature)?;

    let x = d.exchanges();
    assert_eq!(x.len(), 255);
    assert_eq!((x[254].p1, x[254].p2), (255, 255));

    // Device remains usable after the final frame
    let r = h.sign(3, &MESSAGE).await?;
    assert!(r.is_success(), "{r:?}");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn iov_sign_concurrent() -> anyhow::Result<()> {
    let (d, h) = setup(SimOptions::default());
    let h2 = h.clone();

    let m2 = [0xa5u8; 700];

    // Frames from concurrent commands must not interleave
    let (r1, r2) = tokio::join!(h.sign(1, &MESSAGE), h2.sign(2, &m2));

    let (r1, r2) = (r1?, r2?);
    assert!(r1.is_success(), "{r1:?}");
    assert!(r2.is_success(), "{r2:?}");

    ledger_iov_tests::sign::verify(&public_key(&d, 1), &MESSAGE, &r1.signature)?;
    ledger_iov_tests::sign::verify(&public_key(&d, 2), &m2, &r2.signature)?;

    Ok(())
}

// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use log::{debug, info, LevelFilter};
use tokio::net::TcpListener;

use ledger_iov_sim::{keys::DEFAULT_SEED, serve, SimDevice, SimOptions};

/// Simulated IOV ledger app
///
/// Serves a simulated device over TCP using speculos-style APDU framing,
/// for use with `ledger-iov-cli --target tcp`.
#[derive(Clone, Debug, PartialEq, Parser)]
pub struct Args {
    /// Address to listen on
    #[clap(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    addr: IpAddr,

    /// Port to listen on
    #[clap(long, env = "SIM_PORT", default_value_t = 9999)]
    port: u16,

    /// Hex encoded 32-byte key derivation seed
    #[clap(long)]
    seed: Option<String>,

    /// Report the device as locked
    #[clap(long)]
    locked: bool,

    /// Report test mode
    #[clap(long)]
    test_mode: bool,

    /// Log level
    #[clap(long, default_value = "debug")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging
    let _ = simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default());

    let mut seed = DEFAULT_SEED;
    if let Some(s) = &args.seed {
        hex::decode_to_slice(s, &mut seed)?;
    }

    let d = SimDevice::new(SimOptions {
        seed,
        locked: args.locked,
        test_mode: args.test_mode,
        ..Default::default()
    });

    let listener = TcpListener::bind(SocketAddr::new(args.addr, args.port)).await?;

    info!("Launching simulator...");

    // Serve until exit signal
    tokio::select!(
        r = serve(listener, d) => {
            r?;
        }
        _ = tokio::signal::ctrl_c() => {
            debug!("Exit!");
        },
    );

    Ok(())
}

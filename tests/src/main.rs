// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::error::Error;

use clap::{Parser, ValueEnum};
use log::{debug, info, LevelFilter};
use strum::Display;

use ledger_transport::Exchange;

#[cfg(feature = "transport_tcp")]
use ledger_iov::transport::{TcpOptions, TransportTcp};
#[cfg(feature = "transport_hid")]
use ledger_transport_hid::TransportNativeHID;

use ledger_iov_tests::{MESSAGE_LENGTHS, TEST_INDICES};

/// Test CLI arguments
#[derive(Clone, Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub test: Tests,

    /// Target for test execution
    #[clap(long, value_enum, default_value = "tcp", env)]
    pub target: Target,

    /// Log level
    #[clap(long, default_value = "debug", env)]
    pub log_level: LevelFilter,

    /// Enable logging for transports
    #[clap(long)]
    pub log_transports: bool,
}

/// Test modes
#[derive(Clone, PartialEq, Debug, Parser, Display)]
pub enum Tests {
    /// Test application version
    Version,
    /// Test address derivation
    Address,
    /// Test message signing
    Sign {
        /// Account index to sign with
        #[clap(long, default_value = "0")]
        index: u32,
    },
}

/// Test target connection
#[derive(Clone, Copy, PartialEq, Debug, ValueEnum, Display)]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum Target {
    /// USB-HID connection for physical ledger devices
    Hid,
    /// TCP connection for simulators
    Tcp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load command line options
    let opts = Opts::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    if !opts.log_transports {
        c.add_filter_ignore_str("ledger_iov::transport");
    }

    let _ = simplelog::SimpleLogger::init(opts.log_level, c.build());

    debug!("options: {:?}", opts);

    info!("Running test '{}' via {}", opts.test, opts.target);

    // Connect to target and execute test
    match opts.target {
        #[cfg(feature = "transport_tcp")]
        Target::Tcp => {
            let t = TransportTcp::new(TcpOptions::default()).await?;

            execute(t, opts).await?;
        }
        #[cfg(feature = "transport_hid")]
        Target::Hid => {
            let h = hidapi::HidApi::new()?;

            let devices: Vec<_> = TransportNativeHID::list_ledgers(&h).collect();
            debug!("Found devices: {:?}", devices);

            let t = TransportNativeHID::new(&h)?;

            execute(t, opts).await?;
        }
        #[cfg(any(not(feature = "transport_tcp"), not(feature = "transport_hid")))]
        _ => {
            return Err(anyhow::anyhow!(
                "transport: {} feature not enabled",
                opts.target
            ));
        }
    };

    info!("Test OK!");

    Ok(())
}

/// Execute a test with the provided transport
async fn execute<T, E>(target: T, opts: Opts) -> anyhow::Result<()>
where
    T: Exchange<Error = E> + Send + Sync,
    E: Error + Send + Sync + 'static,
{
    use ledger_iov_tests::*;

    match opts.test {
        Tests::Version => {
            version::test(target).await?;
        }
        Tests::Address => {
            address::test(target, TEST_INDICES).await?;
        }
        Tests::Sign { index } => sign::test(target, index, MESSAGE_LENGTHS).await?,
    }

    Ok(())
}

// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for interacting with the Ledger IOV app

use std::{error::Error, path::PathBuf, time::Duration};

use clap::{ArgGroup, Parser};
use ledger_transport::Exchange;
use log::{debug, error, info, warn, LevelFilter};
use serde::Serialize;

use ledger_iov::{
    apdu::prelude::PathIndex, transport::TcpOptions, DeviceHandle, Filter, LedgerProvider,
};

mod helpers;
use helpers::*;

/// Ledger command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Supported transports for ledger discovery
    #[clap(long, value_enum, default_value = "any")]
    target: Filter,

    /// Device index (where more than one device is available)
    #[clap(long, default_value = "0")]
    device_index: usize,

    /// TCP simulator options (probed with `--target any` or `--target tcp`)
    #[clap(flatten)]
    tcp: TcpOptions,

    /// APDU request timeout in seconds
    #[clap(long)]
    timeout_s: Option<u64>,

    /// Print results as JSON
    #[clap(long)]
    json: bool,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// List available devices
    List,

    /// Fetch application version
    Version,

    /// Fetch public key and address for an account index
    Address {
        /// Account index (m/44'/234'/INDEX')
        #[clap(long, default_value = "0")]
        index: PathIndex,

        /// Require on-device confirmation
        #[clap(long)]
        confirm: bool,
    },

    /// Sign a message with the key for an account index
    #[clap(group(ArgGroup::new("message").required(true)))]
    Sign {
        /// Account index (m/44'/234'/INDEX')
        #[clap(long, default_value = "0")]
        index: PathIndex,

        /// Hex encoded message
        #[clap(long, group = "message")]
        hex: Option<HexData>,

        /// Base64 encoded message
        #[clap(long, group = "message")]
        base64: Option<B64Data>,

        /// UTF-8 text message
        #[clap(long, group = "message")]
        text: Option<String>,

        /// File containing the raw message
        #[clap(long, group = "message")]
        file: Option<PathBuf>,

        /// Write the sign result to a JSON file
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    let _ = simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default());

    let p = LedgerProvider::new()?.with_tcp(args.tcp.clone());

    debug!("Using transport: {:?}", args.target);

    let devices = p.list_devices(args.target).await;

    if devices.is_empty() {
        return Err(anyhow::anyhow!("No devices found"));
    }

    // Handle list command
    if args.cmd == Actions::List {
        info!("Devices:");
        for (i, d) in devices.iter().enumerate() {
            info!("  {}: {}", i, d);
        }

        return Ok(());
    }

    // Select device by index
    if args.device_index >= devices.len() {
        return Err(anyhow::anyhow!(
            "Invalid device index: {} (max: {})",
            args.device_index,
            devices.len() - 1
        ));
    }

    debug!(
        "Using device {}: {}",
        args.device_index, devices[args.device_index]
    );

    // Connect to device
    let mut t = match p.connect(&devices[args.device_index]).await {
        Ok(v) => v,
        Err(e) => {
            error!(
                "Failed to connect to device: {}",
                devices[args.device_index]
            );
            return Err(e.into());
        }
    };

    if let Some(s) = args.timeout_s {
        t = t.with_request_timeout(Duration::from_secs(s));
    }

    // Execute command
    execute(t, args.cmd, args.json).await?;

    Ok(())
}

/// Execute a command with the provided transport
async fn execute<T, E>(t: DeviceHandle<T>, cmd: Actions, json: bool) -> anyhow::Result<()>
where
    T: Exchange<Error = E> + Sync + Send,
    E: Error + Sync + Send + 'static,
{
    debug!("Executing command: {:?}", cmd);

    match cmd {
        Actions::Version => {
            let v = t.version().await?;

            if json {
                return print_json(&v);
            }

            info!("status: {} (0x{:04x})", v.error_message, v.return_code);
            if v.is_success() {
                info!("version: {}", v.version());
                info!("test mode: {}", v.test_mode);
                info!("device locked: {}", v.device_locked);
            }
        }
        Actions::Address { index, confirm } => {
            if confirm {
                info!("Confirm address on device");
            }

            let a = t.address(index.value(), confirm).await?;

            if json {
                return print_json(&a);
            }

            info!("status: {} (0x{:04x})", a.error_message, a.return_code);
            if a.is_success() {
                info!("public key: {}", a.pub_key);
                info!("address: {}", a.address);
            }
        }
        Actions::Sign {
            index,
            hex,
            base64,
            text,
            file,
            output,
        } => {
            let message = match (hex, base64, text, file) {
                (Some(h), _, _, _) => h.0,
                (_, Some(b), _, _) => b.0,
                (_, _, Some(s), _) => s.into_bytes(),
                (_, _, _, Some(f)) => std::fs::read(f)?,
                _ => return Err(anyhow::anyhow!("No message provided")),
            };

            info!("Signing {} byte message, confirm on device", message.len());

            let r = t.sign(index.value(), &message).await?;

            if let Some(f) = &output {
                write_output(f, &r)?;
                info!("Wrote sign result to: {}", f.display());
            }

            if json {
                return print_json(&r);
            }

            match r.is_success() {
                true => info!("signature: {}", hex::encode(&r.signature)),
                false => warn!("sign failed: {} (0x{:04x})", r.error_message, r.return_code),
            }
        }
        _ => (),
    }

    Ok(())
}

/// Print a result as JSON to stdout
fn print_json<T: Serialize>(v: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(v)?);
    Ok(())
}

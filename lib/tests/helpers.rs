#![allow(unused)]

use std::{
    net::{Ipv4Addr, SocketAddr},
    str::FromStr,
};

use log::{debug, LevelFilter};
use portpicker::pick_unused_port;
use simplelog::SimpleLogger;
use tokio::{net::TcpListener, task::JoinHandle};

use ledger_iov::{transport::TcpOptions, DeviceHandle};
use ledger_iov_sim::{serve, SimDevice, SimOptions};

/// Setup logging from the `LOG_LEVEL` environment variable
pub fn setup_logging() {
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let _ = SimpleLogger::init(log_level, simplelog::Config::default());
}

/// Setup an in-process simulated device and handle
pub fn setup(opts: SimOptions) -> (SimDevice, DeviceHandle<SimDevice>) {
    setup_logging();

    let d = SimDevice::new(opts);
    let h = DeviceHandle::from(d.clone());

    (d, h)
}

/// Setup a simulated device served over TCP on an unused port
pub async fn setup_tcp(opts: SimOptions) -> (SimDevice, TcpOptions, JoinHandle<anyhow::Result<()>>) {
    setup_logging();

    let port = pick_unused_port().expect("no free ports");
    let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), port);

    let listener = TcpListener::bind(addr).await.expect("bind failed");

    debug!("Simulator bound to {}", addr);

    let d = SimDevice::new(opts);
    let task = tokio::spawn(serve(listener, d.clone()));

    let tcp = TcpOptions {
        addr: addr.ip(),
        port,
    };

    (d, tcp, task)
}

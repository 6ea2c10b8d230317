use tracing::{error, info};
use tracing_subscriber;

use clap::{value_t, App, Arg};

use malabar::address::Address;
use malabar::node;
use malabar::relay::Dispatch;
use malabar::settings::Settings;
use malabar::{Error, Result};

use bytes::Bytes;
use primitive_types::U256;

const DEFAULT_MAX_GAS: u64 = 1_000_000;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_level(false)
        .with_target(false)
        .without_time()
        .compact()
        .with_max_level(tracing::Level::INFO)
        .init();

    let matches = App::new("malabar")
        .version("0.1")
        .about("Runs a malabar relay node")
        .arg(
            Arg::with_name("listener-ip")
                .short("a")
                .long("listener-ip")
                .value_name("LISTENER_IP")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("peer")
                .short("p")
                .long("peer")
                .value_name("ID@IP")
                .multiple(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("keypair")
                .short("k")
                .long("keypair")
                .value_name("KEYPAIR")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("send-to")
                .long("send-to")
                .value_name("ADDRESS")
                .takes_value(true)
                .requires("body"),
        )
        .arg(Arg::with_name("body").long("body").value_name("TEXT").takes_value(true))
        .arg(Arg::with_name("max-gas").long("max-gas").value_name("GAS").takes_value(true))
        .get_matches();

    let mut settings = Settings::load(matches.value_of("config"))?;
    if let Some(listener_ip) = matches.value_of("listener-ip") {
        settings.listener_ip = listener_ip.to_owned();
    }
    if let Some(peers) = matches.values_of("peer") {
        settings.bootstrap_peers = peers.map(String::from).collect();
    }
    if let Some(keypair) = matches.value_of("keypair") {
        settings.keypair = Some(keypair.to_owned());
    }

    let dispatch = match matches.value_of("send-to") {
        Some(to) => {
            let to: Address = to.parse()?;
            let body = value_t!(matches.value_of("body"), String).unwrap_or_else(|e| e.exit());
            let max_gas = match matches.value_of("max-gas") {
                Some(gas) => U256::from_dec_str(gas).map_err(|_| Error::TryFromStringError)?,
                None => U256::from(DEFAULT_MAX_GAS),
            };
            Some(Dispatch { to, body: Bytes::from(body), max_gas })
        }
        None => None,
    };

    let sys = actix::System::new();
    sys.block_on(async move {
        let relay = match node::run(settings) {
            Ok(relay) => relay,
            Err(err) => {
                error!("failed to start: {:?}", err);
                actix::System::current().stop();
                return;
            }
        };
        if let Some(dispatch) = dispatch {
            let relay = relay.clone();
            actix::spawn(async move {
                match node::dispatch_when_ready(relay, dispatch).await {
                    Ok(message_id) => info!("dispatched {}", message_id),
                    Err(err) => error!("dispatch failed: {:?}", err),
                }
            });
        }

        let sig = if cfg!(unix) {
            use futures::future::FutureExt;
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigint = signal(SignalKind::interrupt()).unwrap();
            let mut sigterm = signal(SignalKind::terminate()).unwrap();

            futures::select! {
                _ = sigint.recv().fuse() => "SIGINT",
                _ = sigterm.recv().fuse() => "SIGTERM"
            }
        } else {
            tokio::signal::ctrl_c().await.unwrap();
            "Ctrl+C"
        };
        info!(target: "malabar", "Got {}, stopping...", sig);

        actix::System::current().stop();
    });
    sys.run()?;

    Ok(())
}

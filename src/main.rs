#![deny(clippy::unwrap_used)]

use chrono::Local;
use clap::builder::PossibleValuesParser;
use clap::{arg, command, value_parser};
use std::io::ErrorKind;
use std::process::exit;
use std::{path::PathBuf, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

use prema6000ctrl::proto::command::{Autorange, IntegrationTime, Mode, ReturnMode, Setting};
use prema6000ctrl::proto::conv::pretty_ts;
use prema6000ctrl::proto::{self, Result};
use prema6000ctrl::{Device, DEFAULT_BAUDRATE, DEFAULT_TIMEOUT, DEFAULT_TTY};

#[tokio::main]
async fn main() -> tokio_serial::Result<()> {
    let matches = command!() // requires `cargo` feature
        .arg(
            arg!(
                -p --device <PORT> "Port for USB adapter"
            )
            .env("PREMA_PORT")
            .default_value(DEFAULT_TTY)
            .required(false)
            .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(
            -d --debug ... "Turn debugging information on"
        ))
        .arg(
            arg!(
                -b --baudrate <BAUDRATE> "Baudrate"
            )
            .env("PREMA_BAUDRATE")
            .default_value(DEFAULT_BAUDRATE.to_string())
            .value_parser(value_parser!(u32)),
        )
        .arg(
            arg!(
                -a --address <ADDRESS> "GPIB address, when attached through a GPIB controller"
            )
            .env("PREMA_GPIB_ADDRESS")
            .required(false)
            .value_parser(value_parser!(u8).range(0..=30)),
        )
        .arg(
            arg!(
                -t --timeout <MS> "Time to wait for an answer in milliseconds"
            )
            .env("PREMA_TIMEOUT")
            .default_value(DEFAULT_TIMEOUT.as_millis().to_string())
            .value_parser(value_parser!(u64)),
        )
        .subcommand(clap::Command::new("status").about("Instrument status"))
        .subcommand(clap::Command::new("read").about("Current reading"))
        .subcommand(
            clap::Command::new("poll")
                .about("Print readings continuously")
                .arg(
                    arg!(--count <N> "Stop after N readings")
                        .required(false)
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    arg!(--interval <MS> "Pause between readings in milliseconds")
                        .default_value("1000")
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(
            clap::Command::new("mode").about("Measurement mode").arg(
                arg!([mode] "Set measurement mode")
                    .value_parser(PossibleValuesParser::new(Mode::names())),
            ),
        )
        .subcommand(
            clap::Command::new("return-mode")
                .about("Content of the instrument answer")
                .arg(
                    arg!(<mode> "Set return mode")
                        .value_parser(PossibleValuesParser::new(ReturnMode::names())),
                ),
        )
        .subcommand(
            clap::Command::new("autorange").about("Autorange").arg(
                arg!(<state> "Enable or disable autorange")
                    .value_parser(PossibleValuesParser::new(Autorange::names())),
            ),
        )
        .subcommand(
            clap::Command::new("integration-time")
                .about("Integration time")
                .arg(
                    arg!(<time> "Set integration time")
                        .value_parser(PossibleValuesParser::new(IntegrationTime::names())),
                ),
        )
        .subcommand_required(true)
        .get_matches();

    init_logging(matches.get_count("debug"));

    match handle_args(&matches).await {
        Ok(()) => {}
        Err(e) => {
            let port = matches
                .get_one::<PathBuf>("device")
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            match e {
                proto::ProtoError::Serial(err) => {
                    if err.kind() == tokio_serial::ErrorKind::NoDevice
                        || matches!(err.kind(), tokio_serial::ErrorKind::Io(ErrorKind::NotFound))
                    {
                        eprintln!("{}: File not found", port);
                    } else {
                        eprintln!("I/O Error: {} [device: {}]", err, port,);
                    }
                    exit(-1);
                }
                proto::ProtoError::Io(err) => {
                    if err.kind() == ErrorKind::NotFound {
                        eprintln!("{}: File not found", port);
                    } else {
                        eprintln!("I/O Error: {} [device: {}]", err, port,);
                    }
                    exit(-1);
                }
                proto::ProtoError::Timeout => {
                    eprintln!("Device did not answer, check GPIB address and cabling!");
                    exit(-1);
                }
                proto::ProtoError::Abort => {
                    eprintln!("Failed to communicate with device, aborting!");
                    exit(-1);
                }
                err @ (proto::ProtoError::UnknownCode { .. }
                | proto::ProtoError::Malformed(_)) => {
                    eprintln!("Could not decode device answer: {}", err);
                    exit(-1);
                }
                err @ proto::ProtoError::InvalidChoice { .. } => {
                    eprintln!("{}", err);
                    exit(-1);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn handle_args(matches: &clap::ArgMatches) -> Result<()> {
    let baud_rate = matches
        .get_one::<u32>("baudrate")
        .unwrap_or(&DEFAULT_BAUDRATE);
    let timeout = matches
        .get_one::<u64>("timeout")
        .map(|ms| Duration::from_millis(*ms))
        .unwrap_or(DEFAULT_TIMEOUT);

    if let Some(port_path) = matches.get_one::<PathBuf>("device") {
        let mut device =
            Device::new(port_path.to_string_lossy(), *baud_rate)?.with_timeout(timeout);

        if let Some(address) = matches.get_one::<u8>("address") {
            device.select_gpib_address(*address).await?;
        }

        info!(port = %port_path.display(), "connected");

        match matches.subcommand() {
            Some(("status", _args)) => {
                let status = device.status().await?;
                print!("{}", status);
            }
            Some(("read", _args)) => {
                let mea = device.measurement().await?;
                println!("{}", mea);
            }
            Some(("poll", args)) => {
                let interval =
                    Duration::from_millis(*args.get_one::<u64>("interval").unwrap_or(&1000));
                let count = args.get_one::<u64>("count").copied();
                let mut taken = 0;
                while count.map_or(true, |n| taken < n) {
                    if taken > 0 {
                        tokio::time::sleep(interval).await;
                    }
                    let mea = device.measurement().await?;
                    println!("{}\t{}", pretty_ts(&Local::now()), mea);
                    taken += 1;
                }
            }
            Some(("mode", args)) => {
                if let Some(name) = args.get_one::<String>("mode") {
                    // Write value
                    device.set_mode(name.parse()?).await?;
                    println!("OK");
                } else {
                    // Read value
                    let mode = device.mode().await?;
                    println!("Mode: {}", mode);
                }
            }
            Some(("return-mode", args)) => {
                if let Some(name) = args.get_one::<String>("mode") {
                    device.set_return_mode(name.parse()?).await?;
                    println!("OK");
                }
            }
            Some(("autorange", args)) => {
                if let Some(name) = args.get_one::<String>("state") {
                    device.set_autorange(name.parse::<Autorange>()?).await?;
                    println!("OK");
                }
            }
            Some(("integration-time", args)) => {
                if let Some(name) = args.get_one::<String>("time") {
                    device.set_integration_time(name.parse()?).await?;
                    println!("OK");
                }
            }
            _ => unreachable!("subcommand is required"),
        }
    }

    Ok(())
}

//! Quicklook CLI
//!
//! Renders `outputs/<stem>_h<HH>.png` for WRF 10 m wind speed or gridded
//! emissions at one hour.

use std::process::ExitCode;

use clap::Parser;
use path_registry::Resolver;
use quicklook::{run, Kind};
use quicklook_common::QuicklookError;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "quicklook")]
#[command(about = "Render a quicklook PNG from the NAFA sample datasets")]
struct Args {
    /// Time index to render
    #[arg(long, default_value_t = 0)]
    hour: usize,

    /// Field to render
    #[arg(long, value_enum)]
    kind: Kind,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<QuicklookError>()
                .map(QuicklookError::exit_code)
                .unwrap_or(1);
            error!(code, "{:#}", err);
            ExitCode::from(code)
        }
    }
}

fn execute(args: &Args) -> anyhow::Result<()> {
    info!(kind = %args.kind, hour = args.hour, "Starting quicklook");
    let resolver = Resolver::discover()?;
    let path = run(&resolver, args.kind, args.hour)?;
    println!("Saved: {}", path.display());
    Ok(())
}

//! Dataset sanity checker
//!
//! Prints configured paths, WRF and emissions dimensions, boundary file
//! heads and a FLEXPART run listing. `--checksums` also hashes every
//! manifest sample into `<outputs_dir>/sample_checksums.tsv`.

mod checksums;
mod summary;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use path_registry::Resolver;
use quicklook_common::QuicklookError;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "check-data")]
#[command(about = "Summarize the datasets named in important_paths.yaml")]
struct Args {
    /// Write SHA-256 checksums of the manifest samples
    #[arg(long)]
    checksums: bool,
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
    let resolver = Resolver::discover()?;
    summary::write_summary(&mut io::stdout().lock(), &resolver)?;

    if args.checksums {
        let rows = checksums::checksum_rows(&resolver);
        let missing = rows.iter().filter(|r| r.sha256 == checksums::MISSING).count();
        let path = checksums::write_checksums(&resolver, &rows)?;
        info!(rows = rows.len(), missing, "Checksums written");
        println!("Wrote {}", path.display());
    }
    Ok(())
}

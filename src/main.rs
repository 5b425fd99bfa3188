use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;

use chirp::build::build_site;
use chirp::config::Config;

/// Render a markdown microblog corpus into a static site.
#[derive(Parser)]
#[command(name = "chirp", version)]
struct Args {
    /// Directory from which to search for `chirp.yaml` (walks up parents).
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Override the configured output directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_directory(&args.directory, args.output.as_deref())?;
    build_site(&config)?;
    Ok(())
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("chirp: {:#}", e);
        process::exit(1);
    }
}

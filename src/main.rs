//! CLI entry point for the tiled Game of Life engine

use clap::Parser;
use tiled_life::io::cli::{Cli, Runner};
use tiled_life::io::logging::init_tracing;

fn main() -> tiled_life::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let report = Runner::new(cli).run()?;

    // Allow print for the run summary
    #[allow(clippy::print_stdout)]
    {
        println!("{report}");
    }
    Ok(())
}

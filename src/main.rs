//! # xdi-export
//!
//! Command-line front end for exporting completed runs to XDI files.
//!
//! ## Usage
//!
//! ```bash
//! # Export two runs into a directory
//! xdi-export export 9a1f... 3c2e... --catalog /data/catalog -o ./xdi
//!
//! # Export into the proposal tree
//! xdi-export export 9a1f... --config xdi-export.toml --proposal-root /nsls2/data/sst/proposals
//!
//! # Show the header and columns a run would produce
//! xdi-export inspect 9a1f... --catalog /data/catalog
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use xdi_export::catalog::JsonCatalog;
use xdi_export::export::ExportTarget;
use xdi_export::metadata::TimestampZone;

mod config;
mod export;
mod inspect;
mod validate;

pub use config::Config;

/// xdi-export - End-of-run XDI exporter for NEXAFS scans
#[derive(Parser)]
#[command(name = "xdi-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Time zone for `Scan.start_time`.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TimezoneArg {
    /// Local time of this host
    Local,
    /// UTC
    Utc,
}

impl From<TimezoneArg> for TimestampZone {
    fn from(arg: TimezoneArg) -> Self {
        match arg {
            TimezoneArg::Local => TimestampZone::Local,
            TimezoneArg::Utc => TimestampZone::Utc,
        }
    }
}

/// Options shared by every subcommand that reads runs.
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Directory of run documents (overrides the config file)
    #[arg(long, value_name = "DIR")]
    catalog: Option<PathBuf>,

    /// Beamline acronym selecting a catalog sub-directory
    #[arg(long)]
    beamline: Option<String>,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl CatalogArgs {
    /// Load the config file (if any) and open the catalog it and the flags describe
    fn open(&self) -> Result<(Config, JsonCatalog)> {
        let config = Config::load(self.config.as_deref())?;
        let catalog = open_catalog(
            self.catalog.as_deref().or(config.export.catalog.as_deref()),
            self.beamline.as_deref().or(config.export.beamline.as_deref()),
        )?;
        Ok((config, catalog))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export runs to XDI files
    Export {
        /// Run uids to export
        #[arg(value_name = "UID", required = true)]
        uids: Vec<String>,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Write every file into this directory
        #[arg(short = 'o', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Write into <ROOT>/<cycle>/pass-<proposal>/<YYYYMMDD>_export
        #[arg(long, value_name = "ROOT", conflicts_with = "output_dir")]
        proposal_root: Option<PathBuf>,

        /// Time zone for Scan.start_time
        #[arg(long, value_enum)]
        timezone: Option<TimezoneArg>,
    },

    /// Read every stream of a run and report sizes and timings
    Validate {
        /// Run uid
        #[arg(value_name = "UID")]
        uid: String,

        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Print the header and column layout a run would export to, without writing
    Inspect {
        /// Run uid
        #[arg(value_name = "UID")]
        uid: String,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Time zone for Scan.start_time
        #[arg(long, value_enum)]
        timezone: Option<TimezoneArg>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Export {
            uids,
            catalog,
            output_dir,
            proposal_root,
            timezone,
        } => export::run(
            uids,
            catalog,
            output_dir,
            proposal_root,
            timezone.map(TimestampZone::from),
        ),
        Commands::Validate { uid, catalog } => validate::run(uid, catalog),
        Commands::Inspect {
            uid,
            catalog,
            timezone,
        } => inspect::run(uid, catalog, timezone.map(TimestampZone::from)),
    }
}

fn open_catalog(root: Option<&Path>, beamline: Option<&str>) -> Result<JsonCatalog> {
    let Some(root) = root else {
        bail!("No catalog given; pass --catalog or set [export].catalog in the config file");
    };
    let catalog = match beamline {
        Some(beamline) => JsonCatalog::open_beamline(root, beamline)?,
        None => JsonCatalog::open(root)?,
    };
    Ok(catalog)
}

/// Flags win over the config file; a fixed directory wins over the proposal tree.
fn resolve_target(
    output_dir: Option<PathBuf>,
    proposal_root: Option<PathBuf>,
    config: &Config,
) -> Result<ExportTarget> {
    if let Some(dir) = output_dir {
        return Ok(ExportTarget::Directory(dir));
    }
    if let Some(root) = proposal_root {
        return Ok(ExportTarget::ProposalTree(root));
    }
    if let Some(dir) = &config.export.output_dir {
        return Ok(ExportTarget::Directory(dir.clone()));
    }
    if let Some(root) = &config.export.proposal_root {
        return Ok(ExportTarget::ProposalTree(root.clone()));
    }
    bail!("No output location; pass --output-dir or --proposal-root")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_command() {
        let cli = Cli::try_parse_from([
            "xdi-export",
            "-vv",
            "export",
            "uid-1",
            "uid-2",
            "--catalog",
            "/data/catalog",
            "-o",
            "/tmp/out",
            "--timezone",
            "utc",
        ])
        .unwrap();
        assert_eq!(cli.verbosity(), 2);
        match cli.command {
            Commands::Export {
                uids,
                catalog,
                output_dir,
                proposal_root,
                timezone,
            } => {
                assert_eq!(uids, vec!["uid-1", "uid-2"]);
                assert_eq!(catalog.catalog, Some(PathBuf::from("/data/catalog")));
                assert_eq!(output_dir, Some(PathBuf::from("/tmp/out")));
                assert_eq!(proposal_root, None);
                assert!(matches!(timezone, Some(TimezoneArg::Utc)));
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn test_export_requires_uid() {
        assert!(Cli::try_parse_from(["xdi-export", "export"]).is_err());
    }

    #[test]
    fn test_output_dir_conflicts_with_proposal_root() {
        let result = Cli::try_parse_from([
            "xdi-export",
            "export",
            "uid-1",
            "-o",
            "/a",
            "--proposal-root",
            "/b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_target_precedence() {
        let config = Config::from_str(
            r#"
            [export]
            output_dir = "/config/out"
            proposal_root = "/config/proposals"
        "#,
        )
        .unwrap();

        assert_eq!(
            resolve_target(None, Some(PathBuf::from("/flag")), &config).unwrap(),
            ExportTarget::ProposalTree(PathBuf::from("/flag"))
        );
        assert_eq!(
            resolve_target(None, None, &config).unwrap(),
            ExportTarget::Directory(PathBuf::from("/config/out"))
        );
        assert!(resolve_target(None, None, &Config::default()).is_err());
    }

    #[test]
    fn test_missing_catalog() {
        assert!(open_catalog(None, None).is_err());
    }
}

use anyhow::Result;
use log::info;
use std::path::PathBuf;

use xdi_export::export::Exporter;
use xdi_export::metadata::TimestampZone;

use super::{resolve_target, CatalogArgs};

/// Export runs to XDI files
pub fn run(
    uids: Vec<String>,
    catalog: CatalogArgs,
    output_dir: Option<PathBuf>,
    proposal_root: Option<PathBuf>,
    timezone: Option<TimestampZone>,
) -> Result<()> {
    let (config, catalog) = catalog.open()?;
    let target = resolve_target(output_dir, proposal_root, &config)?;

    let mut export_config = config.export_config();
    if let Some(timezone) = timezone {
        export_config.timezone = timezone;
    }

    info!("XDI Export");
    info!("==========");
    info!("Catalog: {}", catalog.root().display());
    info!("Target:  {:?}", target);
    info!("Runs:    {}", uids.len());

    let exporter = Exporter::new(export_config);
    let report = exporter.export_batch(&catalog, &uids, &target);

    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

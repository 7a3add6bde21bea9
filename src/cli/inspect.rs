use anyhow::{Context, Result};

use xdi_export::catalog::RunCatalog;
use xdi_export::export::Exporter;
use xdi_export::metadata::TimestampZone;
use xdi_export::naming::{sanitize_file_name, xdi_file_name};

use super::CatalogArgs;

/// Print what exporting a run would write, without writing it
pub fn run(uid: String, catalog: CatalogArgs, timezone: Option<TimestampZone>) -> Result<()> {
    let (config, catalog) = catalog.open()?;
    let mut export_config = config.export_config();
    if let Some(timezone) = timezone {
        export_config.timezone = timezone;
    }

    let run = catalog
        .get(&uid)
        .with_context(|| format!("Failed to load run {}", uid))?;
    let prepared = Exporter::new(export_config)
        .prepare(&run)
        .with_context(|| format!("Failed to prepare {}", run.label()))?;

    let Some(prepared) = prepared else {
        println!("{}: no primary stream, nothing to export", run.label());
        return Ok(());
    };

    println!("File: {}", sanitize_file_name(&xdi_file_name(&prepared.metadata)));
    println!();
    println!("Header:");
    for (key, value) in prepared.metadata.iter() {
        println!("  {}: {}", key, value);
    }
    println!();
    println!("Columns ({} rows):", prepared.table.n_rows());
    for (i, (column, format)) in prepared.table.iter().zip(&prepared.formats).enumerate() {
        println!("  {:3}. {} ({})", i + 1, column.name, format);
    }

    Ok(())
}

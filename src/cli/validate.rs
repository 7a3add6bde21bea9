use anyhow::{Context, Result};
use log::info;

use xdi_export::validation::read_all_streams;

use super::CatalogArgs;

/// Read every stream of a run
pub fn run(uid: String, catalog: CatalogArgs) -> Result<()> {
    let (_, catalog) = catalog.open()?;

    info!("Stream Validation");
    info!("=================");
    info!("Catalog: {}", catalog.root().display());

    let summary = read_all_streams(&catalog, &uid)
        .with_context(|| format!("Failed to read run {}", uid))?;

    println!("Run: {}", summary.uid);
    for stream in &summary.streams {
        println!("  {}", stream);
    }
    println!("Total: {} bytes (loaded in {:.3?})", summary.nbytes(), summary.elapsed);

    Ok(())
}

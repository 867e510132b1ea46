//! Inspect command implementation.

use crate::output;
use idp_data_core::DataImporter;
use idp_data_store::{default_registry, MemoryStore};
use std::path::PathBuf;
use std::sync::Arc;

pub fn run(input: Option<PathBuf>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Inspection never touches the store.
    let registry = default_registry(Arc::new(MemoryStore::new()))?;
    let importer = DataImporter::new(Arc::new(registry));

    let source = super::open_input(input.as_deref())?;
    let sections = importer.inspect(source)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output::sections_json(&sections))?);
    } else {
        output::print_table_header();
        for section in &sections {
            println!("{}", output::format_table_row(section));
        }
    }

    Ok(())
}

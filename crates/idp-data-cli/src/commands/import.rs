//! Import command implementation.

use crate::output;
use idp_data_core::DataImporter;
use idp_data_store::{default_registry, MemoryStore, StateStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub fn run(
    input: Option<PathBuf>,
    state: PathBuf,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(
        MemoryStore::load_or_default(&state)
            .map_err(|e| format!("Failed to load state {}: {}", state.display(), e))?,
    );
    debug!(state = %state.display(), "loaded state");
    let shared: Arc<dyn StateStore> = store.clone();
    let importer = DataImporter::new(Arc::new(default_registry(shared)?));

    let source = super::open_input(input.as_deref())?;
    let result = importer.import(source);

    // Entities applied before a failure are kept.
    store
        .save(&state)
        .map_err(|e| format!("Failed to save state {}: {}", state.display(), e))?;
    debug!(state = %state.display(), "saved state");
    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output::report_json(&report))?);
    } else {
        for line in output::report_lines(&report) {
            println!("{}", line);
        }
    }

    Ok(())
}

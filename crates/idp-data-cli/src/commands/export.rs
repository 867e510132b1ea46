//! Export command implementation.

use crate::config::TransferConfig;
use idp_data_core::{ExportComposer, ExportOutcome};
use idp_data_store::{default_registry, MemoryStore};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub fn run(
    config: TransferConfig,
    state: PathBuf,
    output: Option<PathBuf>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let issuer = config.issuer()?;
    let principal = config.principal()?;

    let store = MemoryStore::load(&state)
        .map_err(|e| format!("Failed to load state {}: {}", state.display(), e))?;
    debug!(state = %state.display(), "loaded state");
    let registry = Arc::new(default_registry(Arc::new(store))?);
    let composer = ExportComposer::new(registry, issuer).with_indent(config.indent(compact));

    let outcome = match &output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("Failed to create output {}: {}", path.display(), e))?;
            composer.export(BufWriter::new(file), principal)
        }
        None => composer.export(io::stdout().lock(), principal),
    };

    match outcome {
        ExportOutcome::Completed => {
            if output.is_none() {
                println!();
            }
            Ok(())
        }
        ExportOutcome::Aborted { reason } => Err(format!("Export aborted: {}", reason).into()),
    }
}

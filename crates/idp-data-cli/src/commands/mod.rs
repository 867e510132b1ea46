//! Subcommand implementations.

pub mod export;
pub mod import;
pub mod inspect;

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Opens the input document, or stdin when no path is given.
fn open_input(input: Option<&Path>) -> Result<Box<dyn Read>, Box<dyn std::error::Error>> {
    match input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("Failed to open input {}: {}", path.display(), e))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

//! Classify command implementation
//!
//! Prints the location classification the checks would use for each path.

use crate::cli::args::OutputFormat;
use crate::cli::common::{EXIT_ERROR, EXIT_SUCCESS, config_exit_code, load_config};
use crate::classifier::LocationClassifier;
use crate::types::LocationType;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct ClassificationRecord<'a> {
    path: &'a str,
    location_type: &'static str,
}

/// Run the classify command
pub fn run_classify(paths: &[String], format: OutputFormat, config: Option<&Path>) -> i32 {
    let config = match load_config(config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return config_exit_code(&e);
        }
    };
    let classifier = LocationClassifier::new(&config.locations);

    let mut stdout = io::stdout().lock();
    match write_classifications(&mut stdout, classifier, paths, format) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

fn write_classifications(
    out: &mut impl Write,
    classifier: LocationClassifier<'_>,
    paths: &[String],
    format: OutputFormat,
) -> io::Result<()> {
    for path in paths {
        let location_type: LocationType = classifier.classify_path(path);
        match format {
            OutputFormat::Human => writeln!(out, "{path}: {location_type}")?,
            OutputFormat::Jsonl => {
                let record = ClassificationRecord {
                    path,
                    location_type: location_type.as_str(),
                };
                serde_json::to_writer(&mut *out, &record)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

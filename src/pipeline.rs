//! Per-file conversion pipeline and batch driver.
//!
//! Each input file is processed to completion against a fresh workbook
//! decoded from the shared template bytes; one file's failure never
//! aborts the rest of the batch.

use crate::error::{Result, SheetError};
use crate::filename::{parse_non_track, parse_track, ParsedName};
use crate::payload::load_payload;
use crate::sheet::{build_non_track, build_track, load_template, save_to_bytes};
use crate::text::sanitize_filename_component;
use clap::ValueEnum;
use std::io::Write;
use tracing::{info, warn};

/// Operating mode for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One Task sheet and one Skill sheet, filled in place
    NonTrack,
    /// One Task/Skill sheet pair per track, template sheets removed
    Track,
}

impl Mode {
    fn parse_name(self, file_name: &str) -> ParsedName {
        match self {
            Mode::NonTrack => parse_non_track(file_name),
            Mode::Track => parse_track(file_name),
        }
    }

    fn output_name(self, parsed: &ParsedName) -> String {
        let org = sanitize_filename_component(&parsed.org, "org");
        match self {
            Mode::NonTrack => {
                let role = sanitize_filename_component(&parsed.role, "role");
                format!("Non Track_Paper Interview_{}_{}.xlsx", org, role)
            }
            Mode::Track => {
                let job = sanitize_filename_component(&parsed.role, "job");
                format!("Track_Paper Interview_{}_{}.xlsx", org, job)
            }
        }
    }
}

/// A successfully converted file.
#[derive(Debug, Clone)]
pub struct Converted {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A per-file failure, tagged with the source file.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub file: String,
    pub message: String,
}

/// Outcome of a batch run: outputs and failures collected independently.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub outputs: Vec<Converted>,
    pub failures: Vec<BatchFailure>,
}

/// Convert a single uploaded file into a named workbook.
pub fn process_file(
    file_name: &str,
    file_bytes: &[u8],
    template_bytes: &[u8],
    mode: Mode,
) -> Result<Converted> {
    let parsed = mode.parse_name(file_name);
    let out_name = mode.output_name(&parsed);

    let payload = load_payload(file_bytes)
        .map_err(|e| SheetError::conversion(file_name, format!("JSON parse failed: {}", e)))?;

    let mut book = load_template(template_bytes)?;
    match mode {
        Mode::NonTrack => build_non_track(&mut book, &parsed, &payload)?,
        Mode::Track => build_track(&mut book, &parsed, &payload)?,
    }
    let bytes = save_to_bytes(&book)?;
    info!(file = file_name, output = %out_name, "converted");

    Ok(Converted {
        name: out_name,
        bytes,
    })
}

/// Run a batch of `(file_name, bytes)` inputs against one template.
pub fn process_batch(
    files: &[(String, Vec<u8>)],
    template_bytes: &[u8],
    mode: Mode,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for (name, bytes) in files {
        match process_file(name, bytes, template_bytes, mode) {
            Ok(converted) => outcome.outputs.push(converted),
            Err(e) => {
                warn!(file = name.as_str(), error = %e, "conversion failed");
                outcome.failures.push(BatchFailure {
                    file: name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    outcome
}

/// Bundle batch outputs into a deflate-compressed zip archive.
pub fn zip_outputs(outputs: &[Converted]) -> Result<Vec<u8>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut archive = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for out in outputs {
            archive
                .start_file(out.name.as_str(), options)
                .map_err(|e| SheetError::Other(e.into()))?;
            archive.write_all(&out.bytes)?;
        }
        archive.finish().map_err(|e| SheetError::Other(e.into()))?;
    }
    Ok(cursor.into_inner())
}

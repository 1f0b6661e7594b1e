//! skillsheet - assessment JSON to templated Excel workbooks
//!
//! Converts structured interview-assessment payloads (tasks and skills,
//! supplied as JSON-ish text files) into filled Excel workbooks derived
//! from a styled template whose formatting is preserved exactly.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`text`] - Marker stripping and filename sanitization
//! - [`filename`] - Org/role extraction from upload-name conventions
//! - [`payload`] - Tolerant JSON decoding of raw upload bytes
//! - [`model`] - Normalization of heterogeneous task/skill records
//! - [`track`] - Track resolution and per-track selection rules
//! - [`sheet`] - Template-preserving workbook filling
//! - [`pipeline`] - Per-file conversion and the batch driver
//! - [`error`] - Custom error types and handling
//!
//! # Example
//!
//! ```rust,ignore
//! use skillsheet::pipeline::{process_batch, Mode};
//!
//! let template = std::fs::read("template.xlsx")?;
//! let files = vec![("Acme_Data_Engineer_Skill.txt".to_string(),
//!                   std::fs::read("Acme_Data_Engineer_Skill.txt")?)];
//! let outcome = process_batch(&files, &template, Mode::NonTrack);
//! for converted in &outcome.outputs {
//!     std::fs::write(&converted.name, &converted.bytes)?;
//! }
//! ```

pub mod error;
pub mod filename;
pub mod model;
pub mod payload;
pub mod pipeline;
pub mod sheet;
pub mod text;
pub mod track;

// Re-export commonly used types
pub use error::{Result, SheetError};
pub use pipeline::{process_batch, process_file, BatchOutcome, Converted, Mode};

//! Payload decoding.
//!
//! Input files are "JSON-ish": the JSON record is often wrapped in
//! leading/trailing prose emitted by whatever produced the file. A
//! direct parse is attempted first; failing that, the substring between
//! the first `{` and the last `}` is parsed instead.

use crate::error::{Result, SheetError};
use serde_json::Value;

/// Decode raw upload bytes into a JSON record.
pub fn load_payload(bytes: &[u8]) -> Result<Value> {
    let txt = String::from_utf8_lossy(bytes);
    let txt = txt.strip_prefix('\u{feff}').unwrap_or(&txt);

    match serde_json::from_str::<Value>(txt) {
        Ok(value) => Ok(value),
        Err(direct_err) => {
            let start = txt.find('{');
            let end = txt.rfind('}');
            match (start, end) {
                (Some(s), Some(e)) if s < e => serde_json::from_str::<Value>(&txt[s..=e])
                    .map_err(|e| SheetError::parse(e.to_string())),
                _ => Err(SheetError::parse(direct_err.to_string())),
            }
        }
    }
}

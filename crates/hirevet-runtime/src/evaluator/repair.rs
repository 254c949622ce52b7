//! Response repair: recover a JSON object from raw provider text.
//!
//! Providers are asked for bare JSON but routinely wrap it in Markdown
//! code fences or surround it with prose. Repair strips fences, slices the
//! outermost `{...}` span, and parses. A failure here is treated by the
//! caller exactly like a provider failure: advance the fallback chain, do
//! not retry.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value as JsonValue;
use thiserror::Error;

lazy_static! {
    /// A fenced block, with or without a `json` language tag.
    static ref CODE_FENCE: Regex =
        Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").unwrap();
}

/// Errors recovering JSON from provider text.
#[derive(Error, Debug)]
pub enum RepairError {
    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("JSON parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Extract the first top-level JSON object from raw provider output.
pub fn extract_json(raw: &str) -> Result<JsonValue, RepairError> {
    // Prefer the contents of a code fence when one is present.
    let candidate = CODE_FENCE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);

    // Outermost object span: first '{' through last '}'.
    let start = candidate.find('{').ok_or(RepairError::NoJsonObject)?;
    let end = candidate.rfind('}').ok_or(RepairError::NoJsonObject)?;
    if end < start {
        return Err(RepairError::NoJsonObject);
    }

    let value: JsonValue = serde_json::from_str(&candidate[start..=end])?;
    Ok(value)
}

//! Starred-items payload from a phone automation. The automation can only
//! emit JSON objects separated by newlines, never a proper array.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::output::{JsonStyle, OutputError, write_json};

static OBJECT_BOUNDARY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\}[ \t]*\n\s*\{").expect("valid object boundary regex"));

#[derive(Error, Debug)]
pub enum ReederError {
    #[error("payload is not valid json after cleanup")]
    Parse(#[from] serde_json::Error),

    #[error("reading payload")]
    Input(#[from] std::io::Error),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// One starred item as the automation sent it, usually `title` and `url`.
/// Keys are kept as-is and in their original order.
pub type ReederItem = Map<String, Value>;

/// `{"items": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReederDocument {
    pub items: Vec<ReederItem>,
}

/// Turn newline-separated objects into the body of a JSON array.
pub fn clean_payload(payload: &str) -> String {
    let normalized = payload.trim().replace("\r\n", "\n");
    OBJECT_BOUNDARY_REGEX
        .replace_all(&normalized, "},{")
        .replace('\n', "")
}

pub fn parse_payload(payload: &str) -> Result<Vec<ReederItem>, ReederError> {
    let cleaned = clean_payload(payload);
    debug!(payload = %cleaned, "cleaned payload");
    Ok(serde_json::from_str(&format!("[{cleaned}]"))?)
}

pub async fn run(payload: &str, output_path: &Path) -> Result<ReederDocument, ReederError> {
    let document = ReederDocument {
        items: parse_payload(payload)?,
    };
    write_json(output_path, &document, JsonStyle::FOUR_SPACES).await?;
    Ok(document)
}

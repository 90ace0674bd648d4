//! JSON document writer shared by every binary.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;
use tokio::fs;
use tracing::info;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("writing {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serializing json")]
    Serialize(#[from] serde_json::Error),
}

/// Layout of the written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStyle {
    /// Indented by the given number of spaces.
    Pretty { indent: usize },
    Compact,
}

impl JsonStyle {
    pub const TWO_SPACES: JsonStyle = JsonStyle::Pretty { indent: 2 };
    pub const FOUR_SPACES: JsonStyle = JsonStyle::Pretty { indent: 4 };
}

pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T, style: JsonStyle) -> Result<Vec<u8>, OutputError> {
    let mut buf = Vec::new();
    match style {
        JsonStyle::Compact => serde_json::to_writer(&mut buf, value)?,
        JsonStyle::Pretty { indent } => {
            let indent = " ".repeat(indent);
            let formatter = PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer = Serializer::with_formatter(&mut buf, formatter);
            value.serialize(&mut serializer)?;
        }
    }
    buf.push(b'\n');
    Ok(buf)
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> OutputError + use<> {
    let path = path.to_path_buf();
    move |source| OutputError::Io { path, source }
}

/// Write `value` to `path`, creating parent directories. The document is
/// written to a sibling temp file first and renamed over the target.
pub async fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    style: JsonStyle,
) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_err(parent))?;
    }

    let data = to_json_bytes(value, style)?;
    let tmp_path = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp_path, &data).await.map_err(io_err(&tmp_path))?;
    fs::rename(&tmp_path, path).await.map_err(io_err(path))?;

    info!(path = %path.display(), bytes = data.len(), "wrote json document");
    Ok(())
}

//! Subcommands of the `ghostgrid` binary

pub mod evaluate;
pub mod train;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::grid::Board;

/// The 5x6 reference board: Red in the top-left corner, Yellow beside the
/// right-hand items, agent in the bottom-left corner.
pub const DEFAULT_LAYOUT: &str =
    "20,10,10,10,10,11/10,10,10,10,41,11/10,11,10,10,11,11/10,11,10,10,10,10/70,10,10,10,11,10";

/// Parse the inline `--layout` argument.
pub(crate) fn parse_board(layout: &str) -> Result<Board> {
    layout
        .parse::<Board>()
        .with_context(|| format!("invalid --layout '{layout}'"))
}

/// Normalize an export target: a directory (or trailing separator) gets
/// `default_name`, and a file without a `.json` extension gets one.
pub(crate) fn sanitize_export_path(raw: &Path, default_name: &str) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push(default_name);
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

/// Create parent directories and write `value` as pretty JSON.
pub(crate) fn write_export<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

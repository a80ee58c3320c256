//! Shared helper functions for the CLI.

use std::path::Path;

/// Load a SOQL query from a file.
///
/// Blank lines and lines starting with `--` or `#` are comments; the
/// remaining lines are joined with single spaces into one query string.
pub fn load_soql(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read SOQL file '{}': {}", path.display(), e))?;

    let query = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("--") && !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join(" ");

    if query.is_empty() {
        anyhow::bail!("SOQL file '{}' contains no query", path.display());
    }

    Ok(query)
}

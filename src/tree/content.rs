//! Content resolver: reads or renders every planned file.
use super::{Context, EntryKind, PlannedEntry};
use crate::error::TreeError;

/// Fill in `content` for every file entry.
///
/// Templates are rendered with `vars`; other files are read verbatim.
/// Directories are passed through untouched.
///
/// # Errors
///
/// Returns [`TreeError::ContentUnavailable`] for the first file whose source
/// cannot be read or rendered.
pub fn resolve_contents(
    entries: Vec<PlannedEntry>,
    vars: &serde_json::Value,
    ctx: &Context,
) -> Result<Vec<PlannedEntry>, TreeError> {
    entries
        .into_iter()
        .map(|mut entry| {
            if entry.kind != EntryKind::File {
                return Ok(entry);
            }
            let Some(source) = entry.source.clone() else {
                return Err(TreeError::ContentUnavailable {
                    path: entry.dest.clone(),
                    reason: "file entry has no source".to_string(),
                });
            };
            let resolved = if entry.is_template {
                ctx.log.debug(&format!("TEMPLATE: {}", source.display()));
                ctx.renderer.render(&source, vars).map(String::into_bytes)
            } else {
                ctx.log.debug(&format!("READ: {}", source.display()));
                ctx.reader.read(&source)
            };
            entry.content = Some(resolved.map_err(|e| TreeError::content(&source, &e))?);
            Ok(entry)
        })
        .collect()
}

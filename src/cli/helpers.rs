//! Shared helper functions for CLI commands

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::core::shortid::ShortIdIndex;

/// Open the project from --project or by walking up from the cwd
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Resolve a user-supplied reference (@N alias, full ID, or ID fragment)
/// to a full record ID
pub fn resolve_reference(project: &Project, reference: &str) -> Result<EntityId> {
    let short_ids = ShortIdIndex::load(project);
    let resolved = short_ids
        .resolve(reference)
        .unwrap_or_else(|| reference.to_string());

    // Exact parse first
    if let Ok(id) = resolved.parse::<EntityId>() {
        return Ok(id);
    }

    // Fragment match against the record files on disk
    let needle = resolved.to_uppercase();
    let mut matches: Vec<EntityId> = Vec::new();

    for prefix in EntityPrefix::all() {
        for path in project.iter_entity_files(*prefix) {
            let Some(stem) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            let id_part = stem.trim_end_matches(".mdk.yaml");
            if id_part.to_uppercase().contains(&needle) {
                if let Ok(id) = id_part.parse::<EntityId>() {
                    matches.push(id);
                }
            }
        }
    }

    match matches.len() {
        0 => Err(miette::miette!("no record found matching '{}'", reference)),
        1 => Ok(matches.remove(0)),
        n => Err(miette::miette!(
            "reference '{}' is ambiguous ({} matches); use the full ID",
            reference,
            n
        )),
    }
}

/// Format a record ID for display, truncating if too long
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Escape a string for CSV output (RFC 4180)
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

//! Persistence layer.
//!
//! Saves and loads in-progress slip drafts to/from a JSON file so a
//! half-filled slip survives a service restart. The backend owns all
//! durable betting data; this file only holds unsubmitted selections.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::types::Selection;

/// Default draft file path.
const DEFAULT_DRAFT_FILE: &str = "poolhall_drafts.json";

/// Unsubmitted selections, keyed by tournament id.
pub type SlipDrafts = HashMap<u64, Vec<Selection>>;

/// Save drafts to a JSON file.
pub fn save_drafts(drafts: &SlipDrafts, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_DRAFT_FILE);
    let json = serde_json::to_string_pretty(drafts)
        .context("Failed to serialise slip drafts")?;

    std::fs::write(path, &json)
        .context(format!("Failed to write drafts to {path}"))?;

    debug!(path, tournaments = drafts.len(), "Drafts saved");
    Ok(())
}

/// Load drafts from a JSON file.
/// Returns None if the file doesn't exist or cannot be parsed; a
/// missing or corrupt draft file is a fresh start, not a crash.
pub fn load_drafts(path: Option<&str>) -> Result<Option<SlipDrafts>> {
    let path = path.unwrap_or(DEFAULT_DRAFT_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved drafts found, starting fresh");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read drafts from {path}"))?;

    let drafts: SlipDrafts = match serde_json::from_str(&json) {
        Ok(d) => d,
        Err(e) => {
            warn!(path, error = %e, "Draft file is corrupt, starting fresh");
            return Ok(None);
        }
    };

    info!(path, tournaments = drafts.len(), "Drafts loaded from disk");
    Ok(Some(drafts))
}

/// Delete the draft file (after submission or for reset).
pub fn delete_drafts(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_DRAFT_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .context(format!("Failed to delete draft file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

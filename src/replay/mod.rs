// src/replay/mod.rs
//! Replay persistence and verification
//!
//! A finished match record round-trips through a zstd-compressed JSON file
//! and can be deterministically re-verified: every entry's recorded moves
//! are re-applied through a rules engine and the resulting states must
//! match the record. Divergence means either a non-deterministic rules
//! implementation or a corrupted record, both worth failing loudly over.

use crate::recorder::MatchRecord;
use crate::rules::RulesEngine;
use crate::utils::errors::{EngineError, Result};
use std::path::Path;
use tracing::{debug, info};

/// zstd level; replay files are small, favor speed
const COMPRESSION_LEVEL: i32 = 3;

/// Persist a match record as zstd-compressed JSON
pub fn save(record: &MatchRecord, path: &Path) -> Result<()> {
    let json = serde_json::to_vec(record)?;
    let compressed = zstd::encode_all(json.as_slice(), COMPRESSION_LEVEL)
        .map_err(|e| EngineError::Storage(format!("compression failed: {}", e)))?;
    std::fs::write(path, &compressed)?;
    info!(
        match_id = %record.match_id,
        rounds = record.entries.len(),
        bytes = compressed.len(),
        "Replay saved to {:?}", path
    );
    Ok(())
}

/// Load a match record persisted by [`save`]
pub fn load(path: &Path) -> Result<MatchRecord> {
    let compressed = std::fs::read(path)?;
    let json = zstd::decode_all(compressed.as_slice())
        .map_err(|e| EngineError::Storage(format!("decompression failed: {}", e)))?;
    let record: MatchRecord = serde_json::from_slice(&json)?;
    debug!(match_id = %record.match_id, rounds = record.entries.len(), "Replay loaded");
    Ok(record)
}

/// Re-apply every recorded action through `rules` and confirm the record's
/// states: round numbering, per-entry transitions, and continuity between
/// consecutive entries.
pub fn verify(record: &MatchRecord, rules: &impl RulesEngine) -> Result<()> {
    let mut expected_round = 0;
    let mut previous: Option<&crate::state::GameState> = None;
    for entry in &record.entries {
        expected_round += 1;
        if entry.round != expected_round {
            return Err(EngineError::ReplayDivergence(entry.round));
        }

        // Each round must pick up exactly where the previous one ended;
        // only the round counter advances between entries.
        if let Some(prev) = previous {
            let mut carried = prev.clone();
            carried.round = entry.state_before.round;
            if carried != entry.state_before {
                return Err(EngineError::ReplayDivergence(entry.round));
            }
        }

        let mut state = entry.state_before.clone();
        for action in &entry.actions {
            let outcome = rules.apply(&state, action.team, &action.moves)?;
            state = outcome.state;
        }
        if state != entry.state_after {
            return Err(EngineError::ReplayDivergence(entry.round));
        }
        previous = Some(&entry.state_after);
    }
    Ok(())
}

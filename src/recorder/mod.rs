// src/recorder/mod.rs
//! Match recording
//!
//! An append-only log of every round: state before, actions taken, state
//! after, per-team elapsed time, and failure annotations. Appending never
//! fails the match; persistence problems are downgraded to warnings. A
//! reader handle can consume already-appended entries concurrently while
//! the match is still running, because entries are immutable once written
//! and the log only ever grows.

use crate::rules::MoveDisposition;
use crate::state::{BotMove, GameState, TeamId};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// The agent fault, if any, behind a forfeited turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentFault {
    Timeout,
    ProtocolViolation,
    Crashed,
    AlreadyFailed,
    BudgetExhausted,
}

/// What one team did (or failed to do) within a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAction {
    pub team: TeamId,

    /// Moves actually applied, including substituted no-ops on forfeits
    pub moves: Vec<BotMove>,

    /// One disposition per move
    pub dispositions: Vec<MoveDisposition>,

    /// Wall time the team consumed answering the request
    pub elapsed_ms: u64,

    /// Failure annotation when the turn was forfeited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<AgentFault>,
}

/// One round of the match, immutable once appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundEntry {
    pub round: u32,
    pub state_before: GameState,
    /// Actions in acting order within the round
    pub actions: Vec<TeamAction>,
    pub state_after: GameState,
    pub recorded_at: DateTime<Utc>,
}

/// The finalized, immutable log of a whole match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,
    pub entries: Vec<RoundEntry>,
}

/// Append-only recorder used by the turn coordinator
pub struct MatchRecorder {
    match_id: String,
    entries: Arc<RwLock<Vec<Arc<RoundEntry>>>>,
    sink: Option<Mutex<std::fs::File>>,
}

impl MatchRecorder {
    pub fn new() -> Self {
        Self {
            match_id: ulid::Ulid::new().to_string(),
            entries: Arc::new(RwLock::new(Vec::new())),
            sink: None,
        }
    }

    /// Additionally stream entries to a JSON-lines file as they are
    /// appended. A sink that cannot be opened is reported and skipped;
    /// recording problems never affect the match.
    pub fn with_sink(mut self, path: &Path) -> Self {
        match std::fs::File::create(path) {
            Ok(file) => self.sink = Some(Mutex::new(file)),
            Err(e) => warn!("Could not open record sink {:?}: {}", path, e),
        }
        self
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Append one round. Never fails: sink errors are warnings.
    pub fn append(&self, entry: RoundEntry) {
        debug!(round = entry.round, "Recording round");
        let entry = Arc::new(entry);

        if let Some(sink) = &self.sink {
            let result = serde_json::to_vec(entry.as_ref()).and_then(|mut line| {
                line.push(b'\n');
                let mut file = sink.lock();
                file.write_all(&line).map_err(serde_json::Error::io)
            });
            if let Err(e) = result {
                warn!(round = entry.round, "Record sink write failed: {}", e);
            }
        }

        self.entries.write().push(entry);
    }

    /// A handle for reading already-appended entries concurrently
    pub fn reader(&self) -> RecordReader {
        RecordReader {
            entries: Arc::clone(&self.entries),
        }
    }

    /// Snapshot the full log as an immutable record
    pub fn finalize(&self) -> MatchRecord {
        let entries = self.entries.read();
        MatchRecord {
            match_id: self.match_id.clone(),
            entries: entries.iter().map(|e| e.as_ref().clone()).collect(),
        }
    }
}

impl Default for MatchRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-side handle; sees every entry appended before the read, never a
/// torn or rewritten one
#[derive(Clone)]
pub struct RecordReader {
    entries: Arc<RwLock<Vec<Arc<RoundEntry>>>>,
}

impl RecordReader {
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Arc<RoundEntry>> {
        self.entries.read().get(index).cloned()
    }

    pub fn latest(&self) -> Option<Arc<RoundEntry>> {
        self.entries.read().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Layout;

    fn entry(round: u32) -> RoundEntry {
        let layout = Layout::parse("####\n#01#\n####", 1).unwrap();
        let mut state = GameState::from_layout(&layout);
        state.round = round;
        RoundEntry {
            round,
            state_before: state.clone(),
            actions: vec![TeamAction {
                team: TeamId::Blue,
                moves: vec![BotMove::stop(0)],
                dispositions: vec![MoveDisposition::Forfeited],
                elapsed_ms: 12,
                fault: Some(AgentFault::Timeout),
            }],
            state_after: state,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_append_and_finalize() {
        let recorder = MatchRecorder::new();
        recorder.append(entry(1));
        recorder.append(entry(2));

        let record = recorder.finalize();
        assert_eq!(record.entries.len(), 2);
        assert_eq!(record.entries[0].round, 1);
        assert_eq!(record.entries[1].round, 2);
        assert!(!record.match_id.is_empty());
    }

    #[test]
    fn test_reader_sees_appends() {
        let recorder = MatchRecorder::new();
        let reader = recorder.reader();
        assert!(reader.is_empty());

        recorder.append(entry(1));
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.latest().unwrap().round, 1);
        assert!(reader.get(5).is_none());
    }

    #[test]
    fn test_concurrent_reader_during_appends() {
        let recorder = Arc::new(MatchRecorder::new());
        let reader = recorder.reader();

        let writer = {
            let recorder = Arc::clone(&recorder);
            std::thread::spawn(move || {
                for round in 1..=50 {
                    recorder.append(entry(round));
                }
            })
        };

        // Entries visible to the reader are always complete and in order
        loop {
            let len = reader.len();
            for i in 0..len {
                assert_eq!(reader.get(i).unwrap().round, i as u32 + 1);
            }
            if len == 50 {
                break;
            }
            std::thread::yield_now();
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_sink_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.jsonl");
        let recorder = MatchRecorder::new().with_sink(&path);
        recorder.append(entry(1));
        recorder.append(entry(2));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: RoundEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.round, 1);
    }

    #[test]
    fn test_unwritable_sink_does_not_fail_append() {
        let recorder = MatchRecorder::new().with_sink(Path::new("/no/such/dir/match.jsonl"));
        recorder.append(entry(1));
        assert_eq!(recorder.len(), 1);
    }
}

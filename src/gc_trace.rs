//! GC trace line parsing and aggregation (§4.7).
//!
//! Consumes lines of the form `"key=value key=value ..."` emitted by a worker child
//! running with GC-trace flags enabled. Grounded in the teacher's own line-oriented
//! parsing style in `src/connection.rs` (fixed tokens, explicit `From` conversions)
//! though the wire shape here (free-form `key=value` tokens) is closer to a log line
//! than a framed message.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GcKind {
    Scavenge,
    MarkCompact,
    MinorMs,
    Unknown,
}

impl GcKind {
    fn from_code(code: &str) -> GcKind {
        match code {
            "s" | "scavenge" => GcKind::Scavenge,
            "mc" | "ms" | "mark-compact" => GcKind::MarkCompact,
            "mmc" | "minor-mc" | "minor-ms" => GcKind::MinorMs,
            _ => GcKind::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GcEvent {
    pub kind: GcKind,
    pub pause_ms: f64,
    pub allocated: u64,
    pub promoted: u64,
    pub survived: u64,
    pub collected: u64,
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?P<key>[A-Za-z_][A-Za-z0-9_]*)=(?P<value>\S+)").unwrap())
}

fn tokens(line: &str) -> std::collections::HashMap<String, String> {
    token_regex()
        .captures_iter(line)
        .map(|c| (c["key"].to_string(), c["value"].to_string()))
        .collect()
}

/// Parses a single stdout line. Returns `None` if the line carries no `pause=` field
/// or no recognized `gc=` field, or if `pause=` is not a valid number -- per §4.7 and
/// §7 (`TraceParseMalformed`), this is the *only* error kind that is locally recovered:
/// the caller simply drops the line and continues.
pub fn parse_gc_line(line: &str) -> Option<GcEvent> {
    let map = tokens(line);

    let gc_code = map.get("gc")?;
    let pause_ms: f64 = map.get("pause")?.parse().ok()?;

    let as_u64 = |key: &str| -> u64 {
        map.get(key)
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v as u64)
            .unwrap_or(0)
    };

    let allocated = as_u64("allocated");
    let promoted = as_u64("promoted");
    let survived = map
        .get("new_space_survived")
        .or_else(|| map.get("survived"))
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v as u64)
        .unwrap_or(0);
    let start = as_u64("start_object_size");
    let end = as_u64("end_object_size");
    let collected = start.saturating_sub(end);

    Some(GcEvent {
        kind: GcKind::from_code(gc_code),
        pause_ms,
        allocated,
        promoted,
        survived,
        collected,
    })
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GcStats {
    pub scavenges: u64,
    pub mark_compacts: u64,
    pub total_collected: u64,
    pub gc_pause_time: f64,
    pub total_allocated: Option<u64>,
    pub total_promoted: Option<u64>,
    pub total_survived: Option<u64>,
}

/// Aggregates a batch of parsed GC events. The `{total_allocated, total_promoted,
/// total_survived}` trio is present iff at least one event carried an `allocated`
/// field (checked via a sentinel set during parsing, since a genuine zero allocation
/// is indistinguishable from "field absent" once we're down to a bare `u64`).
pub fn aggregate_gc_stats(events: &[(GcEvent, bool)]) -> GcStats {
    let mut stats = GcStats::default();
    let mut saw_allocated = false;

    for (event, has_allocated) in events {
        match event.kind {
            GcKind::Scavenge => stats.scavenges += 1,
            GcKind::MarkCompact => stats.mark_compacts += 1,
            GcKind::MinorMs | GcKind::Unknown => {}
        }
        stats.total_collected += event.collected;
        stats.gc_pause_time += event.pause_ms;
        if *has_allocated {
            saw_allocated = true;
            *stats.total_allocated.get_or_insert(0) += event.allocated;
            *stats.total_promoted.get_or_insert(0) += event.promoted;
            *stats.total_survived.get_or_insert(0) += event.survived;
        }
    }

    if !saw_allocated {
        stats.total_allocated = None;
        stats.total_promoted = None;
        stats.total_survived = None;
    }

    stats
}

/// Convenience entry point for a raw line stream: parses every line, tagging whether
/// it carried an `allocated=` field, and aggregates. Non-GC lines are simply skipped
/// here; the worker orchestrator is responsible for re-emitting them to its own
/// stdout per §4.5.
pub fn aggregate_lines<'a>(lines: impl Iterator<Item = &'a str>) -> GcStats {
    let events: Vec<(GcEvent, bool)> = lines
        .filter_map(|line| match parse_gc_line(line) {
            Some(event) => Some((event, line.contains("allocated="))),
            None if line.contains("pause=") || line.contains("gc=") => {
                log::debug!("dropping unparseable gc trace line: {}", line);
                None
            }
            None => None,
        })
        .collect();
    aggregate_gc_stats(&events)
}

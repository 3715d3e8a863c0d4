//! The pause injection schedule (§4.3's "pause scheduling precise rule").

use crate::spec::RunnerOptions;

/// Decides, for a given 0-based iteration index, whether a scheduled pause fires.
///
/// Rule: a pause fires at `iteration == pause_first` (if `pause_first` is set), and
/// additionally whenever `(iteration - (pause_first ?? 0)) % pause_interval == 0` with
/// `pause_interval > 0`. When `pause_first` is set but `pause_interval` is `0` (or
/// unset), only the first clause can ever fire -- exactly one pause, never repeating.
/// This is an open question the spec explicitly preserves rather than "fixes"
/// (`SPEC_FULL.md` §E.2).
pub fn should_pause(iteration: u64, options: &RunnerOptions) -> bool {
    let base = options.pause_first.unwrap_or(0);

    let first_clause = options.pause_first == Some(iteration);

    let interval_clause = match options.pause_interval {
        Some(interval) if interval > 0 && iteration >= base => {
            (iteration - base) % interval == 0
        }
        _ => false,
    };

    first_clause || interval_clause
}
